// Entrypoint for the uploader.
// - Keeps `main` small: parse arguments, build the API client and hand
//   both to the `Uploader`.
// - Returns `anyhow::Result` so any unsuppressed failure exits non-zero.

use clap::Parser;
use dataverse_upload::{api::DataverseClient, cli::Args, upload::Uploader};
use env_logger::Env;

fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr; the upload report itself is printed to stdout.
    env_logger::init_from_env(Env::default().default_filter_or("warn"));

    let config = Args::parse().into_config()?;
    let api = DataverseClient::new(&config)?;

    let stdout = std::io::stdout();
    let summary = Uploader::new(api, config).run(&mut stdout.lock())?;
    log::debug!(
        "finished: {} uploaded, {} failed",
        summary.uploaded,
        summary.failed
    );
    Ok(())
}
