//! Digest Fixture Generator
//!
//! Writes a sorted file of SHA-256 digests for use as a PSI upload.
//!
//! Usage:
//!   cargo run --bin digest-gen -- --count 1000 --even-only --out-dir fixtures

use std::path::PathBuf;

use clap::Parser;
use digest_gen::{file_name, generate_with_progress, write_digests, Profile, MAX_COUNT};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser, Debug)]
#[command(name = "digest-gen")]
#[command(about = "Generate a sorted SHA-256 digest file")]
struct Args {
    /// Number of digests to generate
    #[arg(
        long,
        default_value_t = 100,
        value_parser = clap::value_parser!(u64).range(0..=MAX_COUNT)
    )]
    count: u64,

    /// Hash only even numbers, starting at 0
    #[arg(long)]
    even_only: bool,

    /// Directory for the output file
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let profile = if args.even_only {
        Profile::EvenOnly
    } else {
        Profile::All
    };

    tracing::info!(count = args.count, profile = %profile, "Generating digests");

    let pb = ProgressBar::new(args.count);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40}] {pos}/{len} ({per_sec})")?,
    );

    let digests = generate_with_progress(args.count, profile, |done| pb.set_position(done));
    pb.finish_with_message("Done hashing");

    std::fs::create_dir_all(&args.out_dir)?;
    let path = args.out_dir.join(file_name(args.count, profile));
    write_digests(&path, &digests)?;

    tracing::info!(output = %path.display(), count = digests.len(), "Wrote digest file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_is_bounded() {
        let args = Args::try_parse_from(["digest-gen", "--count", "1000"]).unwrap();
        assert_eq!(args.count, 1000);

        let max = MAX_COUNT.to_string();
        assert!(Args::try_parse_from(["digest-gen", "--count", max.as_str()]).is_ok());

        let over = (MAX_COUNT + 1).to_string();
        assert!(Args::try_parse_from(["digest-gen", "--count", over.as_str()]).is_err());
        assert!(Args::try_parse_from(["digest-gen", "--count", "18446744073709551615"]).is_err());
    }
}
