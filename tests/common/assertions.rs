//! Assertion helpers for tests.

use aniniscale::models::Image;
use pretty_assertions::assert_eq;
use std::process::Output;

/// Assert image geometry
pub fn assert_dimensions(image: &Image, width: u32, height: u32) {
    assert_eq!(
        (image.width(), image.height()),
        (width, height),
        "Expected a {}x{} image",
        width,
        height
    );
}

/// Assert that the file at `bytes` is a PNG
pub fn assert_png(bytes: &[u8]) {
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
}

/// Assert the process succeeded
pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "Expected success, got {:?}. stdout: {} stderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Assert the process exited with status -1 (255 as seen by the shell)
pub fn assert_failed(output: &Output) {
    assert_eq!(
        output.status.code(),
        Some(255),
        "Expected exit status 255. stdout: {} stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}
