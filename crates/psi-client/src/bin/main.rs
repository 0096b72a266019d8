//! PSI upload client CLI
//!
//! Uploads a digest file and either waits for nothing (first party) or
//! writes the intersection to the output file (second party).

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use psi_client::{PsiClient, UploadOutcome, DEFAULT_UPLOAD_URL};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "psi-client")]
#[command(about = "Upload a sorted digest file to a PSI rendezvous server")]
struct Args {
    /// Upload endpoint of the server
    #[arg(long, default_value = DEFAULT_UPLOAD_URL)]
    remote_url: String,

    /// Digest file to upload
    #[arg(long, default_value = "data.csv")]
    file: PathBuf,

    /// Where to write the intersection
    #[arg(long, default_value = "result.txt")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let client = PsiClient::new(args.remote_url);

    tracing::info!(file = %args.file.display(), url = %client.upload_url(), "Uploading");
    let start = Instant::now();
    let outcome = client.upload_file(&args.file).await?;
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        UploadOutcome::Waiting { message } => {
            tracing::info!(duration_ms, "{}", message);
        }
        UploadOutcome::Intersection(result) => {
            std::fs::write(&args.output, result.to_text())?;
            tracing::info!(
                duration_ms,
                matches = result.len(),
                output = %args.output.display(),
                "Intersection received"
            );
        }
        UploadOutcome::Busy => {
            bail!("server is busy with another round, try again later");
        }
    }

    Ok(())
}
