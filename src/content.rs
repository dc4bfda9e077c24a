// File content handed to the upload request. Either an open handle that
// is read while the request body is sent, or a buffer read up front
// (`--preload`). Both give the request the same thing: a reader and a
// known length.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub enum FileContent {
    /// `file` is `None` once the handle has been moved into a request.
    Streamed {
        path: PathBuf,
        file: Option<File>,
        len: u64,
    },
    Buffered(Arc<[u8]>),
}

/// One request's worth of body.
pub struct FileBody {
    pub reader: Box<dyn Read + Send>,
    pub len: u64,
}

impl FileContent {
    pub fn open(path: &Path, preload: bool) -> io::Result<Self> {
        if preload {
            let bytes = std::fs::read(path)?;
            return Ok(FileContent::Buffered(bytes.into()));
        }
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(FileContent::Streamed {
            path: path.to_path_buf(),
            file: Some(file),
            len,
        })
    }

    /// Body for the next request. A streamed handle moves into the body and
    /// is closed when the request drops it; call `reset` before asking again.
    pub fn body(&mut self) -> io::Result<FileBody> {
        match self {
            FileContent::Streamed { path, file, len } => {
                let file = file.take().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::Other,
                        format!("{} was already sent, reset it first", path.display()),
                    )
                })?;
                Ok(FileBody {
                    reader: Box::new(file),
                    len: *len,
                })
            }
            FileContent::Buffered(bytes) => Ok(FileBody {
                reader: Box::new(Cursor::new(Arc::clone(bytes))),
                len: bytes.len() as u64,
            }),
        }
    }

    /// Rewind to the start of the content. Streamed files are reopened; a
    /// buffer is already complete and needs nothing.
    pub fn reset(&mut self) -> io::Result<()> {
        if let FileContent::Streamed { path, file, len } = self {
            // Drop any handle still held before opening a new one.
            *file = None;
            let reopened = File::open(&*path)?;
            *len = reopened.metadata()?.len();
            *file = Some(reopened);
        }
        Ok(())
    }
}
