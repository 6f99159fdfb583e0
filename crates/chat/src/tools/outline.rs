//! Course outline tool.
//!
//! Gives the model course structure: title, link, and the full lesson list.
//! Reads metadata only, so it contributes no source citations.

use crate::sources::SourceCollector;
use crate::tools::{required_str, Tool};
use courseqa_core::AppResult;
use courseqa_knowledge::{CourseMetadata, SemanticIndex};
use courseqa_llm::ToolSchema;
use std::sync::Arc;

/// Tool for getting course outlines with lesson information.
pub struct CourseOutlineTool {
    index: Arc<SemanticIndex>,
}

impl CourseOutlineTool {
    pub fn new(index: Arc<SemanticIndex>) -> Self {
        Self { index }
    }
}

/// Format course metadata into a readable outline.
fn format_outline(course: &CourseMetadata) -> String {
    let mut lines = Vec::new();

    lines.push(format!("**{}**", course.title));
    if let Some(link) = &course.course_link {
        lines.push(format!("Course link: {}", link));
    }
    if let Some(instructor) = &course.instructor {
        lines.push(format!("Instructor: {}", instructor));
    }
    lines.push(String::new());

    if course.lessons.is_empty() {
        lines.push("No lessons found for this course.".to_string());
    } else {
        lines.push("Lessons:".to_string());
        for lesson in &course.lessons {
            lines.push(format!("{}. {}", lesson.number, lesson.title));
        }
    }

    lines.join("\n")
}

#[async_trait::async_trait]
impl Tool for CourseOutlineTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_course_outline".to_string(),
            description:
                "Get a complete course outline including course title, course link, and all lessons"
                    .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "course_name": {
                        "type": "string",
                        "description": "Course title to get the outline for (partial matches work)"
                    }
                },
                "required": ["course_name"]
            }),
        }
    }

    async fn execute(
        &self,
        args: &serde_json::Value,
        _sources: &mut SourceCollector,
    ) -> AppResult<String> {
        let course_name = required_str(args, "course_name")?;

        let resolved = match self.index.resolve_course_name(course_name).await? {
            Some(title) => title,
            None => return Ok(format!("No course found matching '{}'", course_name)),
        };

        match self.index.outline(&resolved) {
            Some(course) => Ok(format_outline(&course)),
            None => Ok(format!("No course found matching '{}'", course_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseqa_knowledge::embeddings::providers::TrigramProvider;
    use courseqa_knowledge::Lesson;

    async fn indexed_tool() -> CourseOutlineTool {
        let index = Arc::new(SemanticIndex::new(Arc::new(TrigramProvider::new(384))));
        index
            .add_course(
                CourseMetadata {
                    title: "Introduction to Machine Learning".to_string(),
                    course_link: Some("https://example.com/ml".to_string()),
                    instructor: Some("Ada Lovelace".to_string()),
                    lessons: vec![
                        Lesson {
                            number: 1,
                            title: "Supervised learning".to_string(),
                            lesson_link: None,
                        },
                        Lesson {
                            number: 2,
                            title: "Gradient descent".to_string(),
                            lesson_link: None,
                        },
                    ],
                },
                Vec::new(),
            )
            .await
            .unwrap();

        CourseOutlineTool::new(index)
    }

    #[test]
    fn test_schema_shape() {
        let index = Arc::new(SemanticIndex::new(Arc::new(TrigramProvider::new(64))));
        let tool = CourseOutlineTool::new(index);
        let schema = tool.schema();

        assert_eq!(schema.name, "get_course_outline");
        assert_eq!(schema.parameters["required"][0], "course_name");
    }

    #[tokio::test]
    async fn test_outline_with_fuzzy_name() {
        let tool = indexed_tool().await;
        let mut sources = SourceCollector::new();

        let args = serde_json::json!({"course_name": "Intro to ML"});
        let output = tool.execute(&args, &mut sources).await.unwrap();

        assert!(output.contains("**Introduction to Machine Learning**"));
        assert!(output.contains("Course link: https://example.com/ml"));
        assert!(output.contains("1. Supervised learning"));
        assert!(output.contains("2. Gradient descent"));

        // Outline reads metadata, never chunks, so no citations
        assert!(sources.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_course() {
        let index = Arc::new(SemanticIndex::new(Arc::new(TrigramProvider::new(384))));
        let tool = CourseOutlineTool::new(index);
        let mut sources = SourceCollector::new();

        let args = serde_json::json!({"course_name": "Nothing Indexed"});
        let output = tool.execute(&args, &mut sources).await.unwrap();
        assert_eq!(output, "No course found matching 'Nothing Indexed'");
    }

    #[test]
    fn test_format_outline_without_lessons() {
        let course = CourseMetadata {
            title: "Empty Course".to_string(),
            course_link: None,
            instructor: None,
            lessons: Vec::new(),
        };
        let output = format_outline(&course);
        assert!(output.contains("No lessons found"));
    }
}
