// Command line surface. Parsing is left to clap; `into_config` does the
// little validation clap can't express and produces the immutable
// `UploadConfig` used for the rest of the run.

use crate::config::{UploadConfig, DEFAULT_SERVER, DEFAULT_TIMEOUT_SECS};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Upload a file to a Dataverse.
#[derive(Parser, Debug)]
#[command(name = "dataverse-upload", version)]
pub struct Args {
    /// File(s) to upload.
    #[arg(required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// API key (used for authentication).
    #[arg(long, env = "DATAVERSE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// DOI of dataset.
    #[arg(long)]
    pub doi: String,

    /// URL of dataverse server.
    #[arg(long, env = "DATAVERSE_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// MIME type (default: guess type).
    #[arg(long)]
    pub mime: Option<String>,

    /// Timeout (in seconds) for server response.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: f64,

    /// File to write checksums to.
    #[arg(long)]
    pub checksum: Option<PathBuf>,

    /// Load the file in its entirety before uploading.
    #[arg(long)]
    pub preload: bool,

    /// Proceed to next file on failure.
    #[arg(long)]
    pub ignore_failure: bool,
}

impl Args {
    pub fn into_config(self) -> Result<UploadConfig> {
        if self.timeout <= 0.0 {
            anyhow::bail!("Timeout must be positive, got {}", self.timeout);
        }
        let timeout = Duration::try_from_secs_f64(self.timeout)
            .with_context(|| format!("Invalid timeout: {}", self.timeout))?;
        if let Some(mime) = &self.mime {
            mime.parse::<mime_guess::Mime>()
                .with_context(|| format!("Invalid MIME type: {}", mime))?;
        }

        Ok(UploadConfig {
            inputs: self.input,
            api_key: self.api_key,
            doi: self.doi,
            server: self.server,
            mime: self.mime,
            timeout,
            checksum: self.checksum,
            preload: self.preload,
            ignore_failure: self.ignore_failure,
        })
    }
}
