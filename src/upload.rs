// The upload procedure. Files go up one at a time in command line order;
// each gets one attempt, plus a single retry when the connection itself
// failed. Failures the server or network caused can be skipped with
// `--ignore-failure`; anything else stops the run.

use crate::api::{AddFileResponse, ApiReply, DatasetApi, FileUpload, TransportError};
use crate::checksum::ChecksumLog;
use crate::config::{ConfigError, UploadConfig};
use crate::content::{FileBody, FileContent};
use crate::mime::{ContentSniffer, MimeDetector};
use crate::ui::{self, Report};
use reqwest::StatusCode;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{name}: gave up after retry: {source}")]
    Connection {
        name: String,
        #[source]
        source: TransportError,
    },
    #[error("{name}: {source}")]
    Timeout {
        name: String,
        #[source]
        source: TransportError,
    },
    #[error("{name}: server answered {status}")]
    Status {
        name: String,
        status: StatusCode,
        body: String,
    },
    #[error("{name}: unexpected response from server: {reason}")]
    MalformedResponse { name: String, reason: String },
    #[error("could not detect MIME type of {}: {source}", path.display())]
    Mime {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{name}: {source}")]
    Transport {
        name: String,
        #[source]
        source: TransportError,
    },
    #[error("could not write checksum log {}: {source}", path.display())]
    ChecksumLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write report: {0}")]
    Report(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl UploadError {
    /// Failures `--ignore-failure` may skip: the server was unreachable,
    /// too slow, or said no. Everything else aborts the run regardless.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            UploadError::Connection { .. } | UploadError::Timeout { .. } | UploadError::Status { .. }
        )
    }

    /// Response body the server sent with the failure, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            UploadError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    fn from_transport(name: &str, source: TransportError) -> Self {
        let name = name.to_string();
        match source {
            TransportError::Connection(_) => UploadError::Connection { name, source },
            TransportError::Timeout(_) => UploadError::Timeout { name, source },
            TransportError::Other(_) => UploadError::Transport { name, source },
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub uploaded: usize,
    /// Files skipped under `--ignore-failure`.
    pub failed: usize,
}

pub struct Uploader<A, D = ContentSniffer> {
    api: A,
    config: UploadConfig,
    detector: D,
    checksum_log: Option<ChecksumLog>,
}

impl<A: DatasetApi> Uploader<A> {
    pub fn new(api: A, config: UploadConfig) -> Self {
        Uploader::with_detector(api, config, ContentSniffer)
    }
}

impl<A: DatasetApi, D: MimeDetector> Uploader<A, D> {
    pub fn with_detector(api: A, config: UploadConfig, detector: D) -> Self {
        let checksum_log = config.checksum.as_ref().map(ChecksumLog::new);
        Uploader {
            api,
            config,
            detector,
            checksum_log,
        }
    }

    /// Uploads every input file, writing the report to `out`.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<RunSummary, UploadError> {
        let mut report = Report::new(out);
        let url = self.config.redacted_endpoint()?;
        report.endpoint(url.as_str())?;

        let total = self.config.inputs.len();
        let mut summary = RunSummary::default();
        for (index, path) in self.config.inputs.iter().enumerate() {
            match self.upload_file(&mut report, index, total, path) {
                Ok(()) => summary.uploaded += 1,
                Err(err) if err.is_recoverable() => {
                    report.failure(err.body(), &err)?;
                    if !self.config.ignore_failure {
                        return Err(err);
                    }
                    log::warn!("skipping {}: {}", path.display(), err);
                    summary.failed += 1;
                }
                Err(err) => return Err(err),
            }
        }

        report.summary(summary.uploaded, summary.failed, total)?;
        Ok(summary)
    }

    fn upload_file<W: Write>(
        &self,
        report: &mut Report<'_, W>,
        index: usize,
        total: usize,
        path: &Path,
    ) -> Result<(), UploadError> {
        let name = display_name(path);
        report.file_header(index, total, &name)?;

        let mime = match &self.config.mime {
            Some(mime) => mime.clone(),
            None => {
                let mime = self.detector.detect(path).map_err(|source| UploadError::Mime {
                    path: path.to_path_buf(),
                    source,
                })?;
                report.detected_mime(&mime)?;
                mime
            }
        };

        let read_err = |source: io::Error| UploadError::Io {
            path: path.to_path_buf(),
            source,
        };
        if self.config.preload {
            report.line("Reading file ...")?;
        }
        let mut content = FileContent::open(path, self.config.preload).map_err(read_err)?;

        report.line("Uploading file ...")?;
        let body = content.body().map_err(read_err)?;
        let (mut result, mut elapsed) = self.send(&name, &mime, body);

        if let Err(TransportError::Connection(cause)) = &result {
            report.line(cause)?;
            report.line("Retrying upload ...")?;
            log::warn!("retrying {} after connection failure: {}", name, cause);
            content.reset().map_err(read_err)?;
            let body = content.body().map_err(read_err)?;
            (result, elapsed) = self.send(&name, &mime, body);
        }
        drop(content);

        report.elapsed(elapsed)?;
        let reply = result.map_err(|source| UploadError::from_transport(&name, source))?;
        report.status(reply.status.as_u16())?;

        if !reply.status.is_success() {
            return Err(UploadError::Status {
                name,
                status: reply.status,
                body: reply.body,
            });
        }

        let checksum = extract_checksum(&name, &reply)?;
        report.checksum(&checksum)?;
        match &self.checksum_log {
            Some(sums) => sums
                .append(&checksum, &name)
                .map_err(|source| UploadError::ChecksumLog {
                    path: sums.path().to_path_buf(),
                    source,
                })?,
            None => log::warn!("no --checksum file given, checksum of {} not recorded", name),
        }
        Ok(())
    }

    /// One POST, timed.
    fn send(
        &self,
        name: &str,
        mime: &str,
        body: FileBody,
    ) -> (Result<ApiReply, TransportError>, Duration) {
        let bar = ui::upload_progress(body.len);
        let body = FileBody {
            reader: Box::new(bar.wrap_read(body.reader)),
            len: body.len,
        };
        let started = Instant::now();
        let result = self.api.add_file(FileUpload {
            name,
            mime: Some(mime),
            body,
        });
        let elapsed = started.elapsed();
        bar.finish_and_clear();
        (result, elapsed)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn extract_checksum(name: &str, reply: &ApiReply) -> Result<String, UploadError> {
    let malformed = |reason: String| UploadError::MalformedResponse {
        name: name.to_string(),
        reason,
    };
    let parsed = AddFileResponse::parse(&reply.body).map_err(|e| malformed(e.to_string()))?;
    let checksum = parsed
        .checksum()
        .ok_or_else(|| malformed("no files in response".to_string()))?;
    log::debug!(
        "{} checksum ({}): {}",
        name,
        checksum.kind.as_deref().unwrap_or("unknown"),
        checksum.value
    );
    Ok(checksum.value.clone())
}
