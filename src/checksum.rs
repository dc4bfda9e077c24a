// Append-only checksum log, one `<checksum>  <name>` line per uploaded
// file. Same layout as `md5sum` output so the log can be checked later.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ChecksumLog {
    path: PathBuf,
}

impl ChecksumLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ChecksumLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the log, appends one line and closes it again.
    pub fn append(&self, checksum: &str, name: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{}  {}\n", checksum, name).as_bytes())
    }
}
