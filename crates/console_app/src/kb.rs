use std::path::PathBuf;

use anyhow::Context;
use console_engine::{ApiSettings, KnowledgeBaseClient};
use console_logging::console_info;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, clap::Subcommand)]
pub enum KbAction {
    /// Show knowledge-base status.
    Status,
    /// Upload a document.
    Upload { path: PathBuf },
    /// Delete a document by file name.
    Delete { filename: String },
    /// Rebuild the index from the stored documents.
    Reindex,
}

/// Runs one knowledge-base request and returns the backend's JSON reply.
pub fn run(action: KbAction, settings: &ApiSettings) -> anyhow::Result<Value> {
    let client = KnowledgeBaseClient::new(settings)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    console_info!("Knowledge base request: {:?}", action);

    let response = runtime.block_on(async {
        match &action {
            KbAction::Status => client.status().await,
            KbAction::Upload { path } => client.upload(path).await,
            KbAction::Delete { filename } => client.delete(filename).await,
            KbAction::Reindex => client.reindex().await,
        }
    });
    response.with_context(|| format!("knowledge base {} failed", action_name(&action)))
}

fn action_name(action: &KbAction) -> &'static str {
    match action {
        KbAction::Status => "status",
        KbAction::Upload { .. } => "upload",
        KbAction::Delete { .. } => "delete",
        KbAction::Reindex => "reindex",
    }
}
