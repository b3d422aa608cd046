// ─────────────────────────────────────────────────────────────────────────────
// avatar-voice reference CLI
//
//  ❯ cargo run --release --bin avatar-voice -- speak --text "Hello there!" --out hello.wav
//  ❯ cargo run --release --bin avatar-voice -- status
// ─────────────────────────────────────────────────────────────────────────────

use anyhow::{Context, Result, bail};
use avatar_domain::ServiceHealth;
use avatar_voice::{GenerationRequest, SpeechService, VoiceConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Optional JSON config; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Force CPU execution (otherwise CUDA/Metal if available).
    #[arg(long)]
    cpu: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate speech for a text and write it to a WAV file.
    Speak {
        /// Text to speak.
        #[arg(long)]
        text: String,

        /// Speaker identity (0 or 1).
        #[arg(long, default_value_t = 0)]
        speaker: u32,

        /// Output WAV file.
        #[arg(long, default_value = "out.wav")]
        out: PathBuf,

        /// Hard ceiling on generated length, in milliseconds.
        #[arg(long, default_value_t = 10_000.0)]
        max_duration_ms: f64,

        /// Sampling temperature (0.1-1.0).
        #[arg(long, default_value_t = 0.9)]
        temperature: f64,

        /// Optional voice-prompt audio establishing the target voice.
        #[arg(long)]
        prompt_audio: Option<PathBuf>,

        /// Transcript of the voice-prompt audio.
        #[arg(long, default_value = "")]
        prompt_text: String,
    },
    /// Print the service status snapshot as JSON.
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => VoiceConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => VoiceConfig::default(),
    };
    config.cpu |= args.cpu;

    match args.command {
        Command::Speak {
            text,
            speaker,
            out,
            max_duration_ms,
            temperature,
            prompt_audio,
            prompt_text,
        } => {
            let mut service = SpeechService::new(&config);
            if !service.is_available() {
                let status = service.status();
                bail!(
                    "speech service unavailable: {}",
                    status.error.unwrap_or_else(|| "unknown cause".into())
                );
            }

            let mut request = GenerationRequest::new(text, speaker)
                .with_max_duration_ms(max_duration_ms)
                .with_temperature(temperature);
            if let Some(prompt) = prompt_audio {
                let segment = service.load_voice_prompt(&prompt_text, &prompt, speaker)?;
                request = request.with_context(vec![segment]);
            }

            let segment = service.generate(&request)?;
            let artifact = service.save_audio(&segment.audio, &out)?;
            println!(
                "{} ({:.2}s)",
                artifact.path.display(),
                segment.duration_ms() / 1000.0
            );
        }
        Command::Status => {
            let service = SpeechService::new(&config);
            println!("{}", serde_json::to_string_pretty(&service.status())?);
        }
    }
    Ok(())
}
