//! Index command handler.

use clap::Args;
use refdesk_core::{config::AppConfig, AppResult};
use refdesk_engine::Assistant;

/// Build the document index and print its stats
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Rebuild even if an index was already built in this run
    #[arg(long)]
    pub rebuild: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    /// Execute the index command.
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command");

        let document = config.assistant.document.clone();
        let assistant = Assistant::new(config)?;

        let stats = if self.rebuild {
            assistant.rebuild().await?
        } else {
            assistant.initialize().await?
        };

        if self.json {
            let output = serde_json::json!({
                "document": document,
                "buildId": stats.build_id,
                "builtAt": stats.built_at.to_rfc3339(),
                "chunkCount": stats.chunk_count,
                "dimension": stats.dimension,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Indexed {}", document);
            println!("  chunks:    {}", stats.chunk_count);
            println!("  dimension: {}", stats.dimension);
            println!("  build id:  {}", stats.build_id);
        }

        Ok(())
    }
}
