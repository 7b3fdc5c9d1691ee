//! Batch driver tests against local directories.

mod common;

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use stillframe::{
    AssetReference, BatchOptions, ConvertOptions, FailureKind, LocalSource, OutputNaming,
    ProgressCallback, ProgressInfo,
};

fn write(directory: &Path, name: &str, bytes: &[u8]) {
    fs::write(directory.join(name), bytes).expect("Failed to write fixture");
}

fn jpeg_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .expect("Failed to list output")
        .map(|entry| entry.expect("bad entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn local_options(output: &Path) -> BatchOptions {
    BatchOptions::new(output)
        .with_convert(ConvertOptions::local())
        .with_naming(OutputNaming::Plain)
}

// ── Discovery ──────────────────────────────────────────────────────

#[test]
fn discovery_lists_only_top_level_gifs() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    write(input.path(), "crunch.gif", &common::gif_with_frames(2));
    write(input.path(), "PLANK.GIF", &common::gif_with_frames(2));
    write(input.path(), "notes.txt", b"not an asset");
    fs::create_dir(input.path().join("nested.gif")).expect("Failed to create dir");
    fs::create_dir(input.path().join("sub")).expect("Failed to create dir");
    write(&input.path().join("sub"), "hidden.gif", &common::gif_with_frames(2));

    let mut ids: Vec<String> = stillframe::discover_gifs(input.path())
        .expect("Failed to discover")
        .into_iter()
        .map(|asset| asset.id)
        .collect();
    ids.sort();
    assert_eq!(ids, ["PLANK", "crunch"]);
}

#[test]
fn discovery_of_missing_directory_fails() {
    let result = stillframe::discover_gifs("this_directory_does_not_exist");
    assert_eq!(result.unwrap_err().kind(), FailureKind::Fetch);
}

// ── Failure isolation ──────────────────────────────────────────────

#[test]
fn corrupt_items_are_counted_and_skipped() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    write(input.path(), "crunch.gif", &common::gif_with_frames(5));
    write(input.path(), "broken.gif", b"definitely not a gif");
    write(input.path(), "plank.gif", &common::gif_with_frames(4));

    let assets = stillframe::discover_gifs(input.path()).expect("Failed to discover");
    let report = stillframe::run_batch(&LocalSource::new(), &assets, &local_options(output.path()))
        .expect("Batch aborted");

    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failed_with(FailureKind::Decode), 1);
    assert_eq!(jpeg_names(output.path()), ["crunch.jpg", "plank.jpg"]);

    let failure = report.failures().next().expect("one failure");
    assert_eq!(failure.asset.id, "broken");
    assert!(!failure.output_path.exists());
}

#[test]
fn zero_byte_item_adds_exactly_one_error() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    write(input.path(), "crunch.gif", &common::gif_with_frames(3));
    let assets = stillframe::discover_gifs(input.path()).expect("Failed to discover");

    let clean = stillframe::run_batch(&LocalSource::new(), &assets, &local_options(output.path()))
        .expect("Batch aborted");

    write(input.path(), "empty.gif", &[]);
    let assets = stillframe::discover_gifs(input.path()).expect("Failed to discover");
    let dirty = stillframe::run_batch(&LocalSource::new(), &assets, &local_options(output.path()))
        .expect("Batch aborted");

    assert_eq!(dirty.succeeded(), clean.succeeded());
    assert_eq!(dirty.failed(), clean.failed() + 1);
    assert_eq!(dirty.failed_with(FailureKind::Decode), 1);
}

#[test]
fn missing_source_is_a_fetch_failure() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let assets = vec![AssetReference::new("7", "no/such/file.gif")];

    let report = stillframe::run_batch(&LocalSource::new(), &assets, &BatchOptions::new(output.path()))
        .expect("Batch aborted");

    assert_eq!(report.failed_with(FailureKind::Fetch), 1);
    assert!(jpeg_names(output.path()).is_empty());
}

// ── Output layout ──────────────────────────────────────────────────

#[test]
fn prefixed_naming_and_output_dir_creation() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let nested = output.path().join("mobile").join("static-thumbnails");
    write(input.path(), "push-up.gif", &common::gif_with_frames(2));

    let assets = vec![AssetReference::new("364", "push-up.gif")];
    let source = LocalSource::with_root(input.path());
    let report = stillframe::run_batch(&source, &assets, &BatchOptions::new(&nested))
        .expect("Batch aborted");

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.output_dir, nested);
    assert!(nested.join("364-push-up.jpg").is_file());
}

#[test]
fn uncreatable_output_dir_aborts_before_processing() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    let blocker = input.path().join("occupied");
    write(input.path(), "occupied", b"a file, not a directory");

    let assets = vec![AssetReference::new("1", "whatever.gif")];
    let result = stillframe::run_batch(&LocalSource::new(), &assets, &BatchOptions::new(&blocker));
    assert!(result.is_err());
}

#[test]
fn identifier_cannot_escape_output_dir() {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let output = root.path().join("out");
    write(root.path(), "plank.gif", &common::gif_with_frames(2));

    let assets = vec![
        AssetReference::new("../escaped", "plank.gif"),
        AssetReference::new("365", "plank.gif"),
    ];
    let source = LocalSource::with_root(root.path());
    let report = stillframe::run_batch(&source, &assets, &BatchOptions::new(&output))
        .expect("Batch aborted");

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed_with(FailureKind::Configuration), 1);
    assert!(!root.path().join("escaped-plank.jpg").exists());
    assert_eq!(jpeg_names(&output), ["365-plank.jpg"]);
}

#[test]
fn outcomes_follow_input_order() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    for name in ["c.gif", "a.gif", "b.gif"] {
        write(input.path(), name, &common::gif_with_frames(2));
    }
    let assets: Vec<AssetReference> = ["c", "a", "b"]
        .iter()
        .map(|id| AssetReference::new(*id, format!("{id}.gif")))
        .collect();

    let report = stillframe::run_batch(
        &LocalSource::with_root(input.path()),
        &assets,
        &BatchOptions::new(output.path()),
    )
    .expect("Batch aborted");

    let ids: Vec<&str> = report.outcomes.iter().map(|o| o.asset.id.as_str()).collect();
    assert_eq!(ids, ["c", "a", "b"]);
}

// ── Idempotence ────────────────────────────────────────────────────

#[test]
fn rerun_produces_identical_outputs_and_tally() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    write(input.path(), "crunch.gif", &common::gif_with_frames(5));
    write(input.path(), "plank.gif", &common::gif_with_frames(3));
    write(input.path(), "broken.gif", b"nope");
    let assets = stillframe::discover_gifs(input.path()).expect("Failed to discover");
    let options = local_options(output.path());

    let first = stillframe::run_batch(&LocalSource::new(), &assets, &options).expect("Batch aborted");
    let first_bytes = fs::read(output.path().join("crunch.jpg")).expect("missing output");
    let first_files = jpeg_names(output.path());

    let second = stillframe::run_batch(&LocalSource::new(), &assets, &options).expect("Batch aborted");
    let second_bytes = fs::read(output.path().join("crunch.jpg")).expect("missing output");

    assert_eq!(first.succeeded(), second.succeeded());
    assert_eq!(first.failed(), second.failed());
    assert_eq!(first_files, jpeg_names(output.path()));
    assert_eq!(first_bytes, second_bytes);
}

// ── Progress ───────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingProgress {
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<(u64, u64, bool)>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_start(&self, asset: &AssetReference) {
        self.started.lock().unwrap().push(asset.id.clone());
    }

    fn on_progress(&self, info: &ProgressInfo<'_>) {
        self.finished
            .lock()
            .unwrap()
            .push((info.current, info.total, info.outcome.is_success()));
    }
}

#[test]
fn progress_sees_every_item() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    write(input.path(), "ok.gif", &common::gif_with_frames(2));
    write(input.path(), "bad.gif", b"bad");
    let assets = vec![
        AssetReference::new("ok", "ok.gif"),
        AssetReference::new("bad", "bad.gif"),
    ];

    let recorder = Arc::new(RecordingProgress::default());
    let options = BatchOptions::new(output.path()).with_progress(recorder.clone());
    stillframe::run_batch(&LocalSource::with_root(input.path()), &assets, &options)
        .expect("Batch aborted");

    assert_eq!(*recorder.started.lock().unwrap(), ["ok", "bad"]);
    assert_eq!(
        *recorder.finished.lock().unwrap(),
        [(1, 2, true), (2, 2, false)]
    );
}

#[test]
fn report_json_has_counts_and_items() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    write(input.path(), "ok.gif", &common::gif_with_frames(2));
    let assets = vec![
        AssetReference::new("1", "ok.gif"),
        AssetReference::new("2", "gone.gif"),
    ];

    let report = stillframe::run_batch(
        &LocalSource::with_root(input.path()),
        &assets,
        &BatchOptions::new(output.path()),
    )
    .expect("Batch aborted");

    let json = report.to_json();
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["items"][0]["status"], "ok");
    assert_eq!(json["items"][1]["kind"], "fetch");
}
