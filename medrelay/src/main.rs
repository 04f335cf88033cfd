mod config;
mod telemetry;

use clap::Parser;
use config::{Config, ConfigError, LoggingConfig};
use relay::client::{Client, ClientError};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use telemetry::TelemetryError;
use url::Url;

#[derive(Parser)]
#[command(version, about = "Relays medicine lookups to a webhook")]
enum CliCommand {
    /// Run the relay API
    Serve {
        /// YAML config file. PORT and N8N_WEBHOOK_URL override it.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Submit a lookup to a running relay and print the answer
    Submit {
        #[arg(long)]
        medicine: String,
        #[arg(long)]
        disease: String,
        #[arg(long, default_value = "http://localhost:5000")]
        api: Url,
        /// Print the webhook payload as JSON instead of formatting it, also
        /// when the relay rejects the submission
        #[arg(long)]
        raw: bool,
    },
    /// Format a webhook payload read from a file or stdin
    Format { file: Option<PathBuf> },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("relay error: {0}")]
    Server(#[from] relay::ServerError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode payload: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = CliCommand::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: CliCommand) -> Result<(), CliError> {
    match cli {
        CliCommand::Serve { config } => {
            let config = Config::load(config.as_deref())?;
            let _sentry = telemetry::init_logging(&config.logging)?;
            telemetry::init_metrics(config.metrics.as_ref())?;

            tracing::info!("Starting relay");
            runtime()?.block_on(relay::run(config.relay))?;
        }
        CliCommand::Submit {
            medicine,
            disease,
            api,
            raw,
        } => {
            let _sentry = telemetry::init_logging(&LoggingConfig {
                level: "warn".into(),
                sentry_dsn: None,
            })?;

            let result = runtime()?.block_on(async {
                Client::new(&api)?.submit(&medicine, &disease).await
            });
            let submission = match result {
                Ok(submission) => submission,
                Err(e) => {
                    if let (true, ClientError::Rejected { data: Some(data), .. }) = (raw, &e) {
                        println!("{}", serde_json::to_string_pretty(data)?);
                    }
                    return Err(e.into());
                }
            };

            if raw {
                println!("{}", serde_json::to_string_pretty(&submission.data)?);
            } else {
                println!("{}", submission.display());
            }
        }
        CliCommand::Format { file } => {
            let bytes = match file {
                Some(path) => std::fs::read(path)?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };
            println!("{}", formatter::format_raw(&bytes));
        }
    }

    Ok(())
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}
