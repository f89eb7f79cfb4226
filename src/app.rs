//! Application wiring and the interactive terminal shell.

use crate::ai::anthropic::AnthropicHttpClient;
use crate::ai::{DirectTransport, GatewayClient, ProxyTransport, Transport};
use crate::credential::{CredentialPrompt, CredentialStore, FileCredentialStore, TerminalPrompt};
use crate::document::Document;
use crate::models::{Config, ConversationTurn, Role, TransportMode};
use crate::session::Session;
use crate::Result;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

const FOLLOW_UP_HINT: &str =
    "Ask a follow-up question about this document (:key [KEY] to change the API key, :reset to start over, :quit to exit)";

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub transport: Box<dyn Transport>,
    pub store: Box<dyn CredentialStore>,
    pub prompt: Box<dyn CredentialPrompt>,
}

/// One interactive session over one gateway client.
pub struct App {
    client: GatewayClient,
    session: Session,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices) -> Result<Self> {
        Ok(Self {
            client: GatewayClient::new(services.transport, services.store, services.prompt)?,
            session: Session::new(),
        })
    }

    /// Construct an app from configuration, prompting on the terminal for a missing key.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = Self::build_transport(config, reqwest::Client::new());
        Self::with_services(AppServices {
            transport,
            store: Box::new(FileCredentialStore::new(&config.credential_dir)),
            prompt: Box::new(TerminalPrompt),
        })
    }

    pub fn build_transport(config: &Config, http_client: reqwest::Client) -> Box<dyn Transport> {
        match config.transport {
            TransportMode::Proxy => {
                info!("Transport: proxy ({})", config.proxy_url);
                Box::new(ProxyTransport::new_with_client(
                    config.proxy_url.clone(),
                    config.request_timeout,
                    http_client,
                ))
            }
            TransportMode::Direct => {
                info!("Transport: direct (model: {})", config.model);
                Box::new(DirectTransport::new(
                    AnthropicHttpClient::new_with_client(
                        config.model.clone(),
                        config.max_tokens,
                        config.request_timeout,
                        http_client,
                    )
                    .with_base_url(config.anthropic_base_url.clone()),
                ))
            }
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client_mut(&mut self) -> &mut GatewayClient {
        &mut self.client
    }

    /// Analyze `path`, then answer follow-up questions read from `input` until EOF or `:quit`.
    pub async fn run<R, W>(&mut self, path: &Path, input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let document = Document::open(path).await?;
        writeln!(
            output,
            "{} ({}, {})",
            document.name(),
            document.media_type(),
            document.display_size()
        )?;

        self.session.select_document(document).await?;
        self.analyze_and_print(output).await?;
        writeln!(output, "{}", FOLLOW_UP_HINT)?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            match line {
                "" => continue,
                ":quit" | ":q" => break,
                ":reset" => {
                    if let Some(document) = self.session.document().cloned() {
                        self.session.reset();
                        self.session.select_document(document).await?;
                        self.analyze_and_print(output).await?;
                    }
                }
                command if command.starts_with(":key") => {
                    self.change_key(command.trim_start_matches(":key").trim(), output)?;
                }
                question => match self.session.ask_question(&mut self.client, question).await {
                    Ok(turn) => writeln!(output, "{}", render_turn(turn))?,
                    Err(e) => writeln!(output, "{}", e)?,
                },
            }
        }

        info!("Session ended after {} turn(s)", self.session.history().len());
        Ok(())
    }

    async fn analyze_and_print<W: Write>(&mut self, output: &mut W) -> Result<()> {
        writeln!(output, "Analyzing...")?;
        let turn = self.session.analyze(&mut self.client).await?;
        writeln!(output, "{}", render_turn(turn))?;
        Ok(())
    }

    fn change_key<W: Write>(&mut self, key: &str, output: &mut W) -> Result<()> {
        if key.is_empty() {
            self.client.clear_credential()?;
            writeln!(output, "API key cleared. You will be asked for a new one.")?;
        } else if self.client.update_credential(key)?.is_set() {
            writeln!(output, "API key updated successfully!")?;
        }
        Ok(())
    }
}

/// Label a turn the way the conversation view shows it.
pub fn render_turn(turn: &ConversationTurn) -> String {
    let label = match turn.role {
        Role::Assistant => "Analysis:",
        Role::User => "Question:",
    };
    format!("{}\n{}\n", label, turn.text().unwrap_or_default())
}
