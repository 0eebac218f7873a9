//! Cassette replay integration tests. No network I/O.
//!
//! All tests set `PHOTOSTUDIO_REPLAY` to a cassette file path so that the
//! binary never contacts a live API endpoint.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use base64::Engine;
use predicates::prelude::*;

fn cmd(cassette: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("photostudio");
    cmd.env("PHOTOSTUDIO_REPLAY", cassette)
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env_remove("PHOTOSTUDIO_REC")
        .args(["--config", "/nonexistent/photostudio.toml"]);
    cmd
}

/// Absolute path to the `test_fixtures` directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

/// A scratch directory holding a source image named `cat.png`.
fn workspace(name: &str) -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let source = dir.join("cat.png");
    std::fs::write(&source, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();
    (dir, source)
}

#[test]
fn edited_image_is_saved_and_text_printed() {
    let (dir, source) = workspace("photostudio_test_happy");
    let out = dir.join("edited.png");

    cmd(&fixtures_dir().join("edit_hat.cassette.yaml"))
        .args(["--output", out.to_str().unwrap(), source.to_str().unwrap(), "add a wizard hat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("I added a purple wizard hat."))
        .stderr(predicate::str::contains("Saved:"));

    let data = std::fs::read(&out).unwrap();
    assert_eq!(&data[..4], &[0x89, 0x50, 0x4E, 0x47], "Output should be the returned PNG");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn auto_filename_uses_source_stem() {
    let (dir, source) = workspace("photostudio_test_autofile");

    cmd(&fixtures_dir().join("edit_hat.cassette.yaml"))
        .args([source.to_str().unwrap(), "add a wizard hat"])
        .current_dir(&dir)
        .assert()
        .success();

    let names: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n != "cat.png")
        .collect();
    assert_eq!(names.len(), 1, "Exactly one file should be created, got {names:?}");
    assert!(names[0].starts_with("cat-edited-"), "got {}", names[0]);
    assert!(names[0].ends_with(".png"), "got {}", names[0]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn text_only_reply_prints_text_without_saving() {
    let (dir, source) = workspace("photostudio_test_text_only");

    cmd(&fixtures_dir().join("text_only.cassette.yaml"))
        .args([source.to_str().unwrap(), "what is in this picture?"])
        .current_dir(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("A cat sitting on a windowsill."))
        .stderr(predicate::str::contains("Saved:").not());

    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1, "Only the source should remain");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn blocked_prompt_suggests_a_different_prompt() {
    let (dir, source) = workspace("photostudio_test_blocked");

    cmd(&fixtures_dir().join("blocked.cassette.yaml"))
        .args([source.to_str().unwrap(), "something the filter rejects"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please try a different prompt"))
        .stderr(predicate::str::contains("SAFETY"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn service_error_is_reported_with_prefix() {
    let (dir, source) = workspace("photostudio_test_server_error");

    cmd(&fixtures_dir().join("server_error.cassette.yaml"))
        .args([source.to_str().unwrap(), "add a wizard hat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("An error occurred: Gemini API error: (503)"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn blank_instruction_is_rejected() {
    let (dir, source) = workspace("photostudio_test_blank");

    cmd(&fixtures_dir().join("edit_hat.cassette.yaml"))
        .args([source.to_str().unwrap(), "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please provide an editing instruction"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn format_jpeg_converts_png_output() {
    // Encode a real 2×2 PNG, embed it in a temporary cassette, and verify
    // that --format jpeg produces a JPEG file.
    let png_bytes = {
        let img = image::DynamicImage::new_rgba8(2, 2);
        let mut buf = std::io::Cursor::new(Vec::<u8>::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    };
    let b64 = base64::engine::general_purpose::STANDARD.encode(&png_bytes);

    let cassette_content = format!(
        "name: convert-test\nrecorded_at: \"2026-10-16T00:00:00Z\"\ncommit: test\ninteractions:\n  - seq: 0\n    port: image_editor\n    method: edit\n    input: {{}}\n    output:\n      Ok:\n        image:\n          data: {b64}\n          mime_type: image/png\n        text: null\n"
    );

    let (dir, source) = workspace("photostudio_test_convert");
    let cassette_path = dir.join("convert.cassette.yaml");
    std::fs::write(&cassette_path, &cassette_content).unwrap();
    let out = dir.join("edited.jpg");

    cmd(&cassette_path)
        .args([
            "--format",
            "jpeg",
            "--output",
            out.to_str().unwrap(),
            source.to_str().unwrap(),
            "add a wizard hat",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved:"));

    let data = std::fs::read(&out).unwrap();
    assert_eq!(&data[..3], &[0xFF, 0xD8, 0xFF], "Output should be a valid JPEG file");

    let _ = std::fs::remove_dir_all(&dir);
}
