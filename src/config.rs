// Run configuration: built once from the command line and passed by
// reference to the client and the uploader. Nothing in here changes
// after construction.

use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

/// Public Harvard Dataverse installation, used when no server is given.
pub const DEFAULT_SERVER: &str = "https://dataverse.harvard.edu";

/// Default response timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 999.0;

/// Path of the native API call that adds a file to a dataset.
const ADD_FILE_PATH: &str = "/api/datasets/:persistentId/add";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server URL {server}: {reason}")]
    InvalidServer { server: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Files to upload, in command line order. Never empty.
    pub inputs: Vec<PathBuf>,
    pub api_key: String,
    /// Persistent identifier of the target dataset, e.g. `doi:10.7910/DVN/ABCDEF`.
    pub doi: String,
    pub server: String,
    /// When set, sent for every file and detection is skipped.
    pub mime: Option<String>,
    pub timeout: Duration,
    pub checksum: Option<PathBuf>,
    pub preload: bool,
    pub ignore_failure: bool,
}

impl UploadConfig {
    /// The URL every file is POSTed to, with the dataset and key in the query.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let base = format!("{}{}", self.server.trim_end_matches('/'), ADD_FILE_PATH);
        let mut url = Url::parse(&base).map_err(|e| ConfigError::InvalidServer {
            server: self.server.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("persistentId", &self.doi)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Same as `endpoint` but with the API key masked, for printing.
    pub fn redacted_endpoint(&self) -> Result<Url, ConfigError> {
        let mut url = self.endpoint()?;
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "key" { "***".to_string() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        Ok(url)
    }
}

#[cfg(test)]
pub(crate) fn test_config(inputs: Vec<PathBuf>) -> UploadConfig {
    UploadConfig {
        inputs,
        api_key: "secret-key".into(),
        doi: "doi:10.5072/FK2/ABCDEF".into(),
        server: "http://localhost:8080".into(),
        mime: None,
        timeout: Duration::from_secs(5),
        checksum: None,
        preload: false,
        ignore_failure: false,
    }
}
