//! Shared fixtures: in-memory GIFs and a loopback HTTP server.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};

/// Well separated colors, one per frame.
pub const PALETTE: [[u8; 3]; 6] = [
    [220, 30, 30],
    [30, 200, 30],
    [30, 30, 220],
    [230, 230, 30],
    [200, 30, 200],
    [30, 210, 210],
];

pub const FRAME_SIZE: u32 = 16;

/// An animated GIF whose frame `i` is filled with `colors[i]`.
pub fn animated_gif(colors: &[[u8; 3]]) -> Vec<u8> {
    let frames = colors
        .iter()
        .map(|&[r, g, b]| {
            let image = RgbaImage::from_pixel(FRAME_SIZE, FRAME_SIZE, Rgba([r, g, b, 255]));
            Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(100, 1))
        })
        .collect::<Vec<_>>();
    encode(frames)
}

/// A GIF with `count` frames drawn from [`PALETTE`].
pub fn gif_with_frames(count: usize) -> Vec<u8> {
    animated_gif(&PALETTE[..count])
}

/// A single-frame GIF where every pixel is fully transparent.
pub fn transparent_gif() -> Vec<u8> {
    let image = RgbaImage::from_pixel(FRAME_SIZE, FRAME_SIZE, Rgba([0, 0, 0, 0]));
    encode(vec![Frame::from_parts(
        image,
        0,
        0,
        Delay::from_numer_denom_ms(100, 1),
    )])
}

fn encode(frames: Vec<Frame>) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder
            .set_repeat(Repeat::Infinite)
            .expect("Failed to set GIF repeat");
        encoder
            .encode_frames(frames)
            .expect("Failed to encode GIF fixture");
    }
    bytes
}

/// Decode a JPEG and return its center pixel.
pub fn center_pixel(jpeg: &[u8]) -> [u8; 3] {
    let image = image::load_from_memory(jpeg)
        .expect("Failed to decode JPEG")
        .to_rgb8();
    image
        .get_pixel(image.width() / 2, image.height() / 2)
        .0
}

/// Index of the [`PALETTE`] entry closest to `pixel`.
pub fn nearest_palette_index(pixel: [u8; 3]) -> usize {
    let distance = |color: &[u8; 3]| -> u32 {
        color
            .iter()
            .zip(pixel.iter())
            .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs().pow(2))
            .sum()
    };
    PALETTE
        .iter()
        .enumerate()
        .min_by_key(|(_, color)| distance(color))
        .map(|(index, _)| index)
        .expect("palette is not empty")
}

/// What the loopback server answers for a path.
#[derive(Clone)]
pub enum Reply {
    Body(Vec<u8>),
    Status(u16),
    Stall(Duration),
}

/// Start a server on 127.0.0.1 and return its base URL.
///
/// Unknown paths answer 404. Each connection is handled on its own thread
/// so a stalled reply does not hold up the next request.
pub fn serve(routes: Vec<(&str, Reply)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
    let address = listener.local_addr().expect("No local address");
    let routes: Arc<HashMap<String, Reply>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, reply)| (path.to_string(), reply))
            .collect(),
    );

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });

    format!("http://{address}")
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Reply>) {
    let mut reader = BufReader::new(match stream.try_clone() {
        Ok(clone) => clone,
        Err(_) => return,
    });

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => {}
        }
    }

    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();

    let (status, body) = match routes.get(&path) {
        Some(Reply::Body(body)) => (200, body.clone()),
        Some(Reply::Status(status)) => (*status, Vec::new()),
        Some(Reply::Stall(duration)) => {
            thread::sleep(*duration);
            return;
        }
        None => (404, Vec::new()),
    };

    let head = format!(
        "HTTP/1.1 {status} X\r\nContent-Type: image/gif\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}
