//! Ask command handler.
//!
//! Answers one question and prints the answer with its sources.

use clap::Args;
use courseqa_chat::QueryResponse;
use courseqa_core::{AppConfig, AppResult};
use std::path::PathBuf;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Directory of course document records (JSON)
    #[arg(short, long, default_value = "course_docs")]
    pub docs: PathBuf,

    /// Continue an existing session by identifier
    #[arg(short, long)]
    pub session: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let engine = super::build_engine(config, &self.docs).await?;
        let response = engine
            .query(&self.question, self.session.as_deref())
            .await?;

        if self.json {
            print_json(&response)?;
        } else {
            print_plain(&response);
        }

        Ok(())
    }
}

fn print_plain(response: &QueryResponse) {
    println!("{}", response.answer);

    if !response.sources.is_empty() {
        println!("\nSources:");
        for source in &response.sources {
            match &source.link {
                Some(link) => println!("  - {} ({})", source.label, link),
                None => println!("  - {}", source.label),
            }
        }
    }

    println!("\nSession: {}", response.session_id);
}

fn print_json(response: &QueryResponse) -> AppResult<()> {
    let value = serde_json::json!({
        "answer": response.answer,
        "sources": response.sources,
        "session_id": response.session_id,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
