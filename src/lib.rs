// Library root
// -----------
// The binary (`main.rs`) parses the command line and hands an
// `UploadConfig` to the `Uploader`. Everything else lives here so the
// upload procedure can be driven from tests with a fake HTTP backend.
//
// Module responsibilities:
// - `cli`: command line surface (clap) and validation into a config.
// - `config`: immutable run configuration and the target endpoint URL.
// - `api`: the Dataverse "add file" call over blocking reqwest.
// - `content`: file bytes, either streamed from disk or preloaded.
// - `mime`: content-based MIME type detection.
// - `checksum`: append-only checksum log.
// - `upload`: the per-file procedure, retry and failure policy.
// - `ui`: report lines and the upload progress bar.
pub mod api;
pub mod checksum;
pub mod cli;
pub mod config;
pub mod content;
pub mod mime;
pub mod ui;
pub mod upload;
