//! Chat command handler.

use clap::Args;
use refdesk_core::{config::AppConfig, AppError, AppResult};
use refdesk_engine::Assistant;
use std::io::{BufRead, Write};

/// Answer a query against the configured document
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// The query to answer; reads queries from stdin when omitted
    pub query: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let assistant = Assistant::new(config)?;

        let stats = assistant.initialize().await?;
        tracing::info!(
            chunks = stats.chunk_count,
            build_id = %stats.build_id,
            "Document index ready"
        );

        match &self.query {
            Some(query) => {
                let reply = self.answer_one(&assistant, query).await?;
                self.print_reply(query, &reply)?;
            }
            None => {
                self.run_interactive(&assistant).await?;
            }
        }

        Ok(())
    }

    /// Answer a single query, masking raw provider errors.
    ///
    /// Model failures are logged with their cause and reported to the
    /// caller as a generic processing error.
    async fn answer_one(&self, assistant: &Assistant, query: &str) -> AppResult<String> {
        match assistant.chat(query).await {
            Ok(reply) => Ok(reply),
            Err(e) if e.is_model_error() => {
                tracing::error!("Model call failed while processing query: {}", e);
                Err(AppError::Other(
                    "An error occurred while processing your request".to_string(),
                ))
            }
            Err(e) => Err(e),
        }
    }

    /// Read queries line-by-line from stdin until EOF.
    async fn run_interactive(&self, assistant: &Assistant) -> AppResult<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        loop {
            write!(stdout, "> ")?;
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }

            let query = line.trim();
            if query.is_empty() {
                continue;
            }

            match self.answer_one(assistant, query).await {
                Ok(reply) => self.print_reply(query, &reply)?,
                Err(e) => {
                    // Keep the session alive; the cause is already logged
                    writeln!(stdout, "{}", e)?;
                }
            }
        }

        Ok(())
    }

    fn print_reply(&self, query: &str, reply: &str) -> AppResult<()> {
        if self.json {
            let output = serde_json::json!({
                "query": query,
                "response": reply,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", reply);
        }
        Ok(())
    }
}
