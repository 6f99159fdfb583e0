//! Course content search tool.
//!
//! Adapts the semantic index to the tool-calling protocol: formats raw
//! matches into model-consumable text and records one source citation per
//! match in the per-query collector.

use crate::sources::{SourceCollector, SourceReference};
use crate::tools::{optional_str, optional_u32, required_str, Tool};
use courseqa_core::AppResult;
use courseqa_knowledge::{SearchFilter, SearchResults, SemanticIndex};
use courseqa_llm::ToolSchema;
use std::sync::Arc;

/// Tool for searching course content with tolerant course-name matching.
pub struct SearchContentTool {
    index: Arc<SemanticIndex>,
}

impl SearchContentTool {
    pub fn new(index: Arc<SemanticIndex>) -> Self {
        Self { index }
    }

    /// Render hits as "[Course - Lesson N]" blocks and record citations.
    fn format_results(&self, results: &SearchResults, sources: &mut SourceCollector) -> String {
        let mut blocks = Vec::with_capacity(results.len());

        for hit in &results.hits {
            let header = match hit.lesson_number {
                Some(number) => format!("[{} - Lesson {}]", hit.course_title, number),
                None => format!("[{}]", hit.course_title),
            };
            blocks.push(format!("{}\n{}", header, hit.text));

            let link = hit
                .lesson_number
                .and_then(|number| self.index.lesson_link(&hit.course_title, number));
            sources.push(SourceReference::for_chunk(
                &hit.course_title,
                hit.lesson_number,
                link,
            ));
        }

        blocks.join("\n\n")
    }
}

/// The explicit empty-result text, so the model can react rather than
/// seeing an empty string.
fn no_content_message(course_name: Option<&str>, lesson_number: Option<u32>) -> String {
    let mut message = String::from("No relevant content found");
    if let Some(course) = course_name {
        message.push_str(&format!(" in course '{}'", course));
    }
    if let Some(lesson) = lesson_number {
        message.push_str(&format!(" in lesson {}", lesson));
    }
    message.push('.');
    message
}

#[async_trait::async_trait]
impl Tool for SearchContentTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_course_content".to_string(),
            description:
                "Search course materials with smart course name matching and lesson filtering"
                    .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(
        &self,
        args: &serde_json::Value,
        sources: &mut SourceCollector,
    ) -> AppResult<String> {
        let query = required_str(args, "query")?;
        let course_name = optional_str(args, "course_name");
        let lesson_number = optional_u32(args, "lesson_number")?;

        let filter = SearchFilter {
            course_name: course_name.map(str::to_string),
            lesson_number,
        };

        tracing::debug!(
            query,
            course = ?course_name,
            lesson = ?lesson_number,
            "Executing content search"
        );

        let results = self.index.search(query, &filter).await?;

        if results.is_empty() {
            return Ok(no_content_message(course_name, lesson_number));
        }

        Ok(self.format_results(&results, sources))
    }
}
