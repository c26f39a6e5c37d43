mod cli;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use statuswatch_core::{BotConfig, Cursor, WatchEngine};
use statuswatch_integrations::{PracticumSource, TelegramNotifier};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cmd = cli.command.unwrap_or(Commands::Run {
        log_file: PathBuf::from(cli::DEFAULT_LOG_FILE),
        retry_period: None,
    });

    match cmd {
        Commands::Run {
            log_file,
            retry_period,
        } => {
            logging::init(&log_file)?;

            let cfg = match BotConfig::from_env() {
                Ok(cfg) => cfg,
                Err(err) => {
                    // Missing credentials are the one fatal condition: report
                    // and terminate before the loop ever starts.
                    tracing::error!(error = %err, "refusing to start without required credentials");
                    std::process::exit(2);
                }
            };

            let retry_period = retry_period
                .map(Duration::from_secs)
                .unwrap_or(cfg.retry_period);

            let mut source = PracticumSource::new(&cfg.practicum_token);
            if let Some(endpoint) = &cfg.endpoint {
                source = source.with_endpoint(endpoint);
            }
            let notifier = TelegramNotifier::new(&cfg.telegram_token, &cfg.telegram_chat_id);

            let mut engine = WatchEngine::new(
                Arc::new(source),
                Arc::new(notifier),
                Cursor::now(),
                retry_period,
            )?;
            engine.run_loop().await?;
        }
        Commands::Config => {
            let cfg = serde_json::json!({
                "PRACTICUM_TOKEN": std::env::var("PRACTICUM_TOKEN").ok().map(|v| redact(&v)),
                "TELEGRAM_TOKEN": std::env::var("TELEGRAM_TOKEN").ok().map(|v| redact(&v)),
                "TELEGRAM_CHAT_ID": std::env::var("TELEGRAM_CHAT_ID").ok(),
                "STATUSWATCH_ENDPOINT": std::env::var("STATUSWATCH_ENDPOINT").ok(),
                "STATUSWATCH_RETRY_PERIOD_SECS": std::env::var("STATUSWATCH_RETRY_PERIOD_SECS").ok(),
            });
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        Commands::Check => {
            let mut missing = false;
            for name in ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"] {
                match std::env::var(name) {
                    Ok(v) if !v.trim().is_empty() => println!("{name}: ok"),
                    _ => {
                        println!("{name}: missing");
                        missing = true;
                    }
                }
            }
            if missing {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn redact(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}***{tail}")
}
