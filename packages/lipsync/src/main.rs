// ─────────────────────────────────────────────────────────────────────────────
// avatar-lipsync reference CLI
//
//  ❯ cargo run --release --bin avatar-lipsync -- sync --audio voice.wav \
//        --video reference.mp4 --out talking.mp4
//  ❯ cargo run --release --bin avatar-lipsync -- status
// ─────────────────────────────────────────────────────────────────────────────

use anyhow::{Context, Result};
use avatar_domain::ServiceHealth;
use avatar_lipsync::{CompositorConfig, LipSyncCompositor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Optional JSON config; the canonical geometry is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite an audio file with a reference video.
    Sync {
        /// Audio input (generated speech or an upload).
        #[arg(long)]
        audio: PathBuf,

        /// Reference video with the speaker's face.
        #[arg(long)]
        video: PathBuf,

        /// Output video file.
        #[arg(long, default_value = "out.mp4")]
        out: PathBuf,
    },
    /// Print the service status snapshot as JSON.
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => CompositorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CompositorConfig::default(),
    };
    let mut compositor = LipSyncCompositor::new(config);

    match args.command {
        Command::Sync { audio, video, out } => {
            let artifact = compositor.composite(&audio, &video, &out)?;
            match artifact.duration {
                Some(duration) => {
                    println!("{} ({:.2}s)", artifact.path.display(), duration.as_secs_f64())
                }
                None => println!("{}", artifact.path.display()),
            }
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&compositor.status())?);
        }
    }
    Ok(())
}
