use anyhow::Result;
use clap::{Parser, Subcommand};
use historical_doc_analyzer::ai::anthropic::AnthropicHttpClient;
use historical_doc_analyzer::app::App;
use historical_doc_analyzer::models::Config;
use historical_doc_analyzer::proxy::{ProxyHandler, ProxyServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "historical-doc-analyzer")]
#[command(about = "Analyze historical documents with an AI model")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze an image or PDF, then ask follow-up questions interactively.
    Analyze {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Run the proxy endpoint.
    Serve {
        /// Listen address; defaults to PROXY_LISTEN_ADDR.
        #[arg(long)]
        addr: Option<String>,
    },
    /// Store or clear the Anthropic API key.
    Key {
        #[arg(value_name = "KEY", required_unless_present = "clear")]
        key: Option<String>,
        #[arg(long, conflicts_with = "key")]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "historical_doc_analyzer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = match args.command {
        Command::Analyze { file } => analyze(&config, file).await,
        Command::Serve { addr } => serve(&config, addr).await,
        Command::Key { key, clear } => update_key(&config, key, clear),
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn analyze(config: &Config, file: PathBuf) -> Result<()> {
    let mut app = App::new(config)?;
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    app.run(&file, input, &mut std::io::stdout()).await?;
    Ok(())
}

async fn serve(config: &Config, addr: Option<String>) -> Result<()> {
    let addr = addr.unwrap_or_else(|| config.listen_addr.clone());
    let upstream = AnthropicHttpClient::new(
        config.model.clone(),
        config.max_tokens,
        config.request_timeout,
    )
    .with_base_url(config.anthropic_base_url.clone());

    let server = ProxyServer::bind(&addr)?;
    let shutdown = server.shutdown_handle();

    tokio::select! {
        result = server.run(Arc::new(ProxyHandler::new(upstream))) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down proxy");
            shutdown.shutdown();
        }
    }
    Ok(())
}

fn update_key(config: &Config, key: Option<String>, clear: bool) -> Result<()> {
    let mut app = App::new(config)?;
    let client = app.client_mut();

    match key {
        Some(key) if !clear => {
            if client.update_credential(&key)?.is_set() {
                info!("API key saved");
            } else {
                anyhow::bail!("API key must not be blank");
            }
        }
        _ => {
            client.clear_credential()?;
            info!("API key cleared");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let args = CliArgs::try_parse_from(["historical-doc-analyzer", "analyze", "deed.pdf"]).unwrap();
        assert!(matches!(args.command, Command::Analyze { file } if file == PathBuf::from("deed.pdf")));

        let args = CliArgs::try_parse_from(["historical-doc-analyzer", "serve", "--addr", "0.0.0.0:9000"])
            .unwrap();
        assert!(matches!(args.command, Command::Serve { addr: Some(a) } if a == "0.0.0.0:9000"));

        let args = CliArgs::try_parse_from(["historical-doc-analyzer", "key", "--clear"]).unwrap();
        assert!(matches!(args.command, Command::Key { key: None, clear: true }));
    }

    #[test]
    fn test_key_requires_value_or_clear() {
        assert!(CliArgs::try_parse_from(["historical-doc-analyzer", "key"]).is_err());
        assert!(CliArgs::try_parse_from(["historical-doc-analyzer", "key", "sk", "--clear"]).is_err());
    }
}
