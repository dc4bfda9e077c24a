// API client module: a blocking HTTP client for the Dataverse native API
// "add file to dataset" call. The uploader talks to it through the
// `DatasetApi` trait so the upload policy can be exercised without a
// server.

use crate::config::UploadConfig;
use crate::content::FileBody;
use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::error::Error as StdError;
use std::io;

type BoxError = Box<dyn StdError + Send + Sync>;

/// One file as it goes on the wire: a single multipart part named `file`.
pub struct FileUpload<'a> {
    pub name: &'a str,
    pub mime: Option<&'a str>,
    pub body: FileBody,
}

/// Whatever the server answered, success or not.
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: String,
}

/// Failures below the HTTP layer, split the way the retry policy needs them.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(#[source] BoxError),
    #[error("request timed out: {0}")]
    Timeout(#[source] BoxError),
    #[error("request failed: {0}")]
    Other(#[source] BoxError),
}

pub trait DatasetApi {
    fn add_file(&self, upload: FileUpload<'_>) -> Result<ApiReply, TransportError>;
}

impl<T: DatasetApi + ?Sized> DatasetApi for &T {
    fn add_file(&self, upload: FileUpload<'_>) -> Result<ApiReply, TransportError> {
        (**self).add_file(upload)
    }
}

/// Success payload of the add call. Only the fields we read are modelled.
#[derive(Debug, Deserialize)]
pub struct AddFileResponse {
    pub data: AddFileData,
}

#[derive(Debug, Deserialize)]
pub struct AddFileData {
    pub files: Vec<AddedFile>,
}

#[derive(Debug, Deserialize)]
pub struct AddedFile {
    #[serde(rename = "dataFile")]
    pub data_file: DataFile,
}

#[derive(Debug, Deserialize)]
pub struct DataFile {
    pub checksum: Checksum,
}

#[derive(Debug, Deserialize)]
pub struct Checksum {
    /// Algorithm name as reported by the server, e.g. `MD5`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub value: String,
}

impl AddFileResponse {
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Checksum of the first file in the reply, if there is one.
    pub fn checksum(&self) -> Option<&Checksum> {
        self.data.files.first().map(|f| &f.data_file.checksum)
    }
}

/// Blocking client bound to one dataset endpoint.
pub struct DataverseClient {
    client: Client,
    url: Url,
}

impl DataverseClient {
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let url = config.endpoint()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(DataverseClient { client, url })
    }
}

impl DatasetApi for DataverseClient {
    fn add_file(&self, upload: FileUpload<'_>) -> Result<ApiReply, TransportError> {
        let FileBody { reader, len } = upload.body;
        let mut part = multipart::Part::reader_with_length(reader, len)
            .file_name(upload.name.to_string());
        if let Some(mime) = upload.mime {
            part = part
                .mime_str(mime)
                .map_err(|e| TransportError::Other(Box::new(e)))?;
        }
        let form = multipart::Form::new().part("file", part);

        log::debug!("POST {} ({}, {} bytes)", self.url.path(), upload.name, len);
        let res = self
            .client
            .post(self.url.clone())
            .multipart(form)
            .send()
            .map_err(classify)?;

        let status = res.status();
        let body = res.text().map_err(classify)?;
        Ok(ApiReply { status, body })
    }
}

/// Sorts a reqwest error into the buckets the retry policy cares about.
/// A peer that resets, aborts or hangs up mid-request counts as a
/// connection failure, same as one that can't be reached at all.
///
/// The URL is stripped first: it carries the API key in its query.
fn classify(err: reqwest::Error) -> TransportError {
    let err = err.without_url();
    if err.is_timeout() {
        TransportError::Timeout(Box::new(err))
    } else if err.is_connect() || is_dropped_connection(&err) || is_send_failure(&err) {
        TransportError::Connection(Box::new(err))
    } else {
        TransportError::Other(Box::new(err))
    }
}

/// The request was built fine but the exchange broke off before a response
/// arrived, e.g. hyper's "connection closed before message completed".
fn is_send_failure(err: &reqwest::Error) -> bool {
    err.is_request() && !err.is_builder() && !err.is_body() && !err.is_decode()
}

fn is_dropped_connection(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<io::Error>() {
            if matches!(
                io.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::BrokenPipe
            ) {
                return true;
            }
        }
        source = e.source();
    }
    false
}
