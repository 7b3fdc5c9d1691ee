//! GIF frame extraction and JPEG encoding.
//!
//! [`convert`] turns the bytes of an animated GIF into the bytes of a JPEG
//! thumbnail: decode the container, pick a frame per the configured
//! [`FramePolicy`], flatten it to RGB, and encode.
//! [`convert_to_file`] does the same and writes the result atomically.
//!
//! # Example
//!
//! ```no_run
//! use stillframe::{ConvertOptions, ThumbnailError};
//!
//! let gif = std::fs::read("plank.gif")?;
//! let thumbnail = stillframe::convert_to_file(&gif, "plank.jpg", &ConvertOptions::local())?;
//! println!("frame {} of {:?}", thumbnail.frame_index, thumbnail.frame_count);
//! # Ok::<(), ThumbnailError>(())
//! ```

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, Frame, Frames, Rgb, RgbImage, RgbaImage};
use jpeg_encoder::{ColorType, Encoder};
use tempfile::NamedTempFile;

use crate::configuration::ConvertOptions;
use crate::error::ThumbnailError;
use crate::policy::FramePolicy;

/// The frame picked out of an animation, already flattened to RGB.
#[derive(Debug, Clone)]
pub struct SelectedFrame {
    /// The frame pixels.
    pub image: RgbImage,
    /// Index of the frame within the animation.
    pub index: usize,
    /// Total frames, when the policy required decoding all of them.
    pub frame_count: Option<usize>,
}

/// A thumbnail written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Where the JPEG was written.
    pub path: PathBuf,
    /// Size of the JPEG in bytes.
    pub bytes: u64,
    /// Index of the frame that was encoded.
    pub frame_index: usize,
    /// Total frames, when known.
    pub frame_count: Option<usize>,
}

/// Decode `source` as a GIF and return the frame chosen by `options`.
///
/// # Errors
///
/// Returns [`ThumbnailError::Decode`] when the bytes are not a readable GIF
/// and [`ThumbnailError::EmptyAnimation`] when it holds no frames.
pub fn extract_frame(
    source: &[u8],
    options: &ConvertOptions,
) -> Result<SelectedFrame, ThumbnailError> {
    if source.is_empty() {
        return Err(ThumbnailError::Decode("source is empty".to_string()));
    }

    let (frame, index, frame_count) = if options.policy.needs_frame_count() {
        // Two passes: count, then decode up to the chosen frame.
        let count = count_frames(source)?;
        let index = options
            .policy
            .select_index(count)
            .ok_or(ThumbnailError::EmptyAnimation)?;
        if let FramePolicy::Fixed(requested) = options.policy {
            if requested != index {
                log::warn!(
                    "Frame {requested} requested but GIF has {count} frames, using frame {index}"
                );
            }
        }
        let frame = decode_frames(source)?
            .nth(index)
            .ok_or(ThumbnailError::EmptyAnimation)??;
        (frame, index, Some(count))
    } else {
        let frame = decode_frames(source)?
            .next()
            .ok_or(ThumbnailError::EmptyAnimation)??;
        (frame, 0, None)
    };

    log::debug!(
        "Selected frame {} of {:?} (policy={})",
        index,
        frame_count,
        options.policy
    );

    Ok(SelectedFrame {
        image: normalize_frame(frame, options.background),
        index,
        frame_count,
    })
}

/// Convert GIF bytes into JPEG bytes.
///
/// # Errors
///
/// Decoding errors as in [`extract_frame`], or [`ThumbnailError::Encode`]
/// if the JPEG encoder fails.
pub fn convert(source: &[u8], options: &ConvertOptions) -> Result<Vec<u8>, ThumbnailError> {
    let selected = extract_frame(source, options)?;
    encode_jpeg(&selected.image, options.quality)
}

/// Convert GIF bytes and write the JPEG to `path`.
///
/// The JPEG is encoded fully in memory, written to a temporary file next to
/// `path`, and renamed into place. A failure leaves no file at `path` (or
/// leaves the previous thumbnail untouched).
///
/// # Errors
///
/// Same as [`convert`], plus [`ThumbnailError::Io`] if writing fails.
pub fn convert_to_file<P: AsRef<Path>>(
    source: &[u8],
    path: P,
    options: &ConvertOptions,
) -> Result<Thumbnail, ThumbnailError> {
    let path = path.as_ref();
    let selected = extract_frame(source, options)?;
    let jpeg = encode_jpeg(&selected.image, options.quality)?;
    write_atomically(path, &jpeg)?;

    Ok(Thumbnail {
        path: path.to_path_buf(),
        bytes: jpeg.len() as u64,
        frame_index: selected.index,
        frame_count: selected.frame_count,
    })
}

/// Encode an RGB image as JPEG with optimized Huffman tables.
///
/// # Errors
///
/// Returns [`ThumbnailError::Encode`] if either side exceeds 65535 pixels
/// or the encoder fails.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ThumbnailError> {
    let width = jpeg_dimension(image.width())?;
    let height = jpeg_dimension(image.height())?;

    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer, quality.clamp(1, 100));
    encoder.set_optimized_huffman_tables(true);
    encoder.encode(image.as_raw(), width, height, ColorType::Rgb)?;
    Ok(buffer)
}

fn jpeg_dimension(value: u32) -> Result<u16, ThumbnailError> {
    u16::try_from(value)
        .map_err(|_| ThumbnailError::Encode(format!("dimension {value} exceeds 65535")))
}

fn decode_frames(source: &[u8]) -> Result<Frames<'_>, ThumbnailError> {
    Ok(GifDecoder::new(Cursor::new(source))?.into_frames())
}

fn count_frames(source: &[u8]) -> Result<usize, ThumbnailError> {
    let mut count = 0;
    for frame in decode_frames(source)? {
        frame?;
        count += 1;
    }
    Ok(count)
}

/// Flatten a decoded frame to three channels.
///
/// GIF frames come out of the decoder as RGBA; partially or fully
/// transparent pixels are blended over `background`.
fn normalize_frame(frame: Frame, background: Rgb<u8>) -> RgbImage {
    normalize_color(DynamicImage::ImageRgba8(frame.into_buffer()), background)
}

/// Bring any color model to RGB8. RGB8 input passes through unchanged.
pub(crate) fn normalize_color(image: DynamicImage, background: Rgb<u8>) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        DynamicImage::ImageRgba8(rgba) => flatten(&rgba, background),
        other if other.color().has_alpha() => flatten(&other.to_rgba8(), background),
        other => other.to_rgb8(),
    }
}

fn flatten(rgba: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u16;
        let blend = |channel: u8, under: u8| {
            ((channel as u16 * alpha + under as u16 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ThumbnailError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temporary = NamedTempFile::new_in(directory)?;
    temporary.write_all(bytes)?;
    temporary.flush()?;
    temporary
        .persist(path)
        .map_err(|error| ThumbnailError::Io(error.error))?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
