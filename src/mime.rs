// MIME type detection from file content. Detection only runs when no
// `--mime` override was given.

use std::io;
use std::path::Path;

const FALLBACK_MIME: &str = "application/octet-stream";

pub trait MimeDetector {
    fn detect(&self, path: &Path) -> io::Result<String>;
}

/// Sniffs the leading bytes of the file for a known signature. Formats
/// without one (plain text, CSV, ...) fall back to the extension, then to
/// `application/octet-stream`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentSniffer;

impl MimeDetector for ContentSniffer {
    fn detect(&self, path: &Path) -> io::Result<String> {
        if let Some(kind) = infer::get_from_path(path)? {
            return Ok(kind.mime_type().to_string());
        }
        let guess = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MIME);
        log::debug!("no signature in {}, guessed {}", path.display(), guess);
        Ok(guess.to_string())
    }
}
