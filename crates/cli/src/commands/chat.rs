//! Chat command handler.
//!
//! Interactive loop over a single session, so follow-up questions see the
//! conversation so far.

use clap::Args;
use courseqa_core::{AppConfig, AppResult};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Interactive question-answering session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Directory of course document records (JSON)
    #[arg(short, long, default_value = "course_docs")]
    pub docs: PathBuf,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let engine = super::build_engine(config, &self.docs).await?;
        let stats = engine.index().stats();

        println!(
            "Loaded {} courses ({} chunks). Ask about them, or 'exit' to quit.",
            stats.courses, stats.chunks
        );

        let stdin = std::io::stdin();
        let mut session_id: Option<String> = None;

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break; // EOF
            }

            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if question == "exit" || question == "quit" {
                break;
            }

            match engine.query(question, session_id.as_deref()).await {
                Ok(response) => {
                    println!("{}", response.answer);
                    for source in &response.sources {
                        println!("  [{}]", source.label);
                    }
                    session_id = Some(response.session_id);
                }
                Err(err) => {
                    eprintln!("error: {}", err);
                }
            }
        }

        Ok(())
    }
}
