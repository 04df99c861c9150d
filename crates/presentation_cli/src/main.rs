//! Journal Voice CLI
//!
//! Voice-enabled journaling chat from the terminal.

#![allow(clippy::print_stdout)]

mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use ai_core::{CompletionGateway, Provider};
use ai_speech::{AudioPayload, PcmSpec, TtsProvider, transcoder};
use application::{ApplicationError, SpeechOutputPort, VoiceChatService};
use clap::{Parser, Subcommand};
use domain::Conversation;
use infrastructure::{AppConfig, build_gateway, build_speech};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Journal Voice CLI
#[derive(Parser)]
#[command(name = "journal-voice")]
#[command(author, version, about = "Voice journaling companion", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./journal-voice.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    ///
    /// With a message, sends it once and prints the reply. Without one,
    /// starts an interactive session (/clear, /stop, /quit).
    Chat {
        /// Message to send
        message: Option<String>,

        /// Text provider (openai, gemini, anthropic)
        #[arg(short, long)]
        provider: Option<Provider>,

        /// Model name
        #[arg(short, long)]
        model: Option<String>,

        /// Read replies aloud
        #[arg(short, long)]
        speak: bool,
    },

    /// Speak text with the configured speech provider
    Speak {
        /// Text to speak
        text: String,

        /// Speech provider (local, openai, gemini, azure)
        #[arg(short, long)]
        provider: Option<TtsProvider>,

        /// Voice name
        #[arg(long)]
        voice: Option<String>,
    },

    /// Wrap raw PCM samples in a WAV container
    Transcode {
        /// Raw PCM input file
        input: PathBuf,

        /// WAV output file
        output: PathBuf,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 24_000)]
        sample_rate: u32,

        /// Channel count
        #[arg(long, default_value_t = 1)]
        channels: u16,

        /// Bits per sample
        #[arg(long, default_value_t = 16)]
        bits: u16,
    },

    /// List text and speech providers
    Providers,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// One-line explanation of a failed chat turn
fn describe_error(err: &ApplicationError) -> String {
    if err.needs_configuration() {
        format!("{err}\n   Set chat.api_key in journal-voice.toml or JOURNAL_VOICE__CHAT__API_KEY.")
    } else if err.is_retryable() {
        format!("{err}\n   The provider may be busy or unreachable, try again shortly.")
    } else {
        err.to_string()
    }
}

fn build_service(config: &AppConfig, speak: bool) -> anyhow::Result<VoiceChatService> {
    let gateway: Arc<dyn CompletionGateway> = Arc::new(build_gateway(config)?);
    let mut settings = config.chat.to_settings();
    settings.speak_replies |= speak;

    let speech: Option<Arc<dyn SpeechOutputPort>> = if settings.speak_replies {
        Some(Arc::new(build_speech(config)?))
    } else {
        None
    };

    Ok(VoiceChatService::new(gateway, speech, settings))
}

fn print_providers() {
    println!("💬 Text providers:");
    for provider in Provider::ALL {
        println!("   {:<10} default model: {}", provider.as_str(), provider.default_model());
    }

    println!();
    println!("🔊 Speech providers:");
    for provider in TtsProvider::ALL {
        let chain = provider
            .fallback_chain()
            .iter()
            .map(|step| match step {
                ai_speech::SynthesisStep::Remote(backend) => backend.to_string(),
                ai_speech::SynthesisStep::Local => "local".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" → ");
        println!("   {:<10} {chain}", provider.as_str());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(cli.verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Chat {
            message,
            provider,
            model,
            speak,
        } => {
            let mut config = AppConfig::load_from(cli.config.as_deref())?;
            if let Some(provider) = provider {
                config.chat.provider = provider;
            }
            if let Some(model) = model {
                config.chat.model = model;
            }

            debug!(provider = %config.chat.provider, speak, "Starting chat");
            let service = build_service(&config, speak)?;
            let mut conversation = Conversation::new();

            match message {
                Some(message) => match service.send(&mut conversation, &message).await {
                    Ok(reply) => {
                        println!("🤖 {}", reply.content());
                        service.finish_speaking().await;
                    },
                    Err(e) => anyhow::bail!(describe_error(&e)),
                },
                None => repl::run(&service, &mut conversation).await?,
            }
        },

        Commands::Speak {
            text,
            provider,
            voice,
        } => {
            let mut config = AppConfig::load_from(cli.config.as_deref())?;
            if let Some(provider) = provider {
                config.speech.provider = provider;
            }
            if let Some(voice) = voice {
                config.speech.voice = voice;
            }

            let speech = build_speech(&config)?;
            let outcome = speech.dispatcher().speak(&text, speech.config()).await;
            println!("🔊 {outcome:?}");
        },

        Commands::Transcode {
            input,
            output,
            sample_rate,
            channels,
            bits,
        } => {
            let spec = PcmSpec::try_new(sample_rate, channels, bits)
                .map_err(|e| anyhow::anyhow!("Unusable PCM layout: {e}"))?;
            let samples = tokio::fs::read(&input).await?;
            let payload = AudioPayload::raw_pcm(samples, spec);
            let wav = transcoder::to_playable(&payload);
            tokio::fs::write(&output, &wav).await?;
            println!(
                "✅ Wrote {} ({} bytes, {} Hz, {} ch, {} bit)",
                output.display(),
                wav.len(),
                sample_rate,
                channels,
                bits
            );
        },

        Commands::Providers => print_providers(),
    }

    Ok(())
}
