// UI layer: the per-file report printed to stdout and a byte progress
// bar drawn on stderr while a request body is being sent. The bar hides
// itself when stderr is not a terminal, so piped runs only see the report.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

const PROGRESS_TEMPLATE: &str =
    "  {spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({eta})";

/// Progress bar sized to the upload body.
pub fn upload_progress(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}

/// Writes the human-readable run report. Field layout is stable so the
/// output can be grepped by scripts.
pub struct Report<'w, W: Write> {
    out: &'w mut W,
}

impl<'w, W: Write> Report<'w, W> {
    pub fn new(out: &'w mut W) -> Self {
        Report { out }
    }

    pub fn endpoint(&mut self, url: &str) -> io::Result<()> {
        writeln!(self.out, "url = {}", url)
    }

    pub fn file_header(&mut self, index: usize, total: usize, name: &str) -> io::Result<()> {
        writeln!(self.out, "File {} of {}:", index + 1, total)?;
        writeln!(self.out, "  name: {}", name)
    }

    pub fn detected_mime(&mut self, mime: &str) -> io::Result<()> {
        writeln!(self.out, "  Detected MIME type: {}", mime)
    }

    pub fn line(&mut self, msg: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "  {}", msg)
    }

    pub fn elapsed(&mut self, elapsed: Duration) -> io::Result<()> {
        writeln!(self.out, "  time elapsed: {:.2} s", elapsed.as_secs_f64())
    }

    pub fn status(&mut self, status: u16) -> io::Result<()> {
        writeln!(self.out, "  status code: {}", status)
    }

    pub fn checksum(&mut self, checksum: &str) -> io::Result<()> {
        writeln!(self.out, "  checksum: {}", checksum)
    }

    /// Dumps the server's reply body verbatim, then the error itself.
    pub fn failure(&mut self, body: Option<&str>, err: &dyn std::fmt::Display) -> io::Result<()> {
        if let Some(body) = body {
            writeln!(self.out, "{}", body)?;
        }
        writeln!(self.out, "{}", err)
    }

    pub fn summary(&mut self, uploaded: usize, failed: usize, total: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "Uploaded {} of {} file(s), {} failed.",
            uploaded, total, failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_file_report() {
        let mut buf = Vec::new();
        {
            let mut report = Report::new(&mut buf);
            report.file_header(0, 2, "a.txt").unwrap();
            report.detected_mime("text/plain").unwrap();
            report.elapsed(Duration::from_millis(1234)).unwrap();
            report.status(201).unwrap();
            report.checksum("abc").unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "File 1 of 2:\n  name: a.txt\n  Detected MIME type: text/plain\n  time elapsed: 1.23 s\n  status code: 201\n  checksum: abc\n"
        );
    }

    #[test]
    fn failure_prints_body_before_error() {
        let mut buf = Vec::new();
        Report::new(&mut buf)
            .failure(Some("{\"status\":\"ERROR\"}"), &"500 Internal Server Error")
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "{\"status\":\"ERROR\"}\n500 Internal Server Error\n");
    }
}
