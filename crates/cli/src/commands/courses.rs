//! Courses command handler.
//!
//! Loads the corpus and prints what got indexed, without touching the
//! generative model.

use clap::Args;
use courseqa_core::{AppConfig, AppResult};
use std::path::PathBuf;

/// Inspect the loaded course corpus
#[derive(Args, Debug)]
pub struct CoursesCommand {
    /// Directory of course document records (JSON)
    #[arg(short, long, default_value = "course_docs")]
    pub docs: PathBuf,

    /// Show the lesson list for one course (tolerant name matching)
    #[arg(long)]
    pub outline: Option<String>,
}

impl CoursesCommand {
    /// Execute the courses command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing courses command");

        let index = super::build_index(config, &self.docs).await?;
        let stats = index.stats();

        println!("{} courses, {} chunks", stats.courses, stats.chunks);
        for title in index.course_titles() {
            println!("  - {}", title);
        }

        if let Some(name) = &self.outline {
            match index.resolve_course_name(name).await? {
                Some(title) => {
                    if let Some(course) = index.outline(&title) {
                        println!("\n{}", course.title);
                        if let Some(link) = &course.course_link {
                            println!("{}", link);
                        }
                        for lesson in &course.lessons {
                            println!("  {}. {}", lesson.number, lesson.title);
                        }
                    }
                }
                None => println!("\nNo course found matching '{}'", name),
            }
        }

        Ok(())
    }
}
