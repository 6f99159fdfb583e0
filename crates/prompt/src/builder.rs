//! System instruction builder.

use courseqa_core::{AppError, AppResult};
use handlebars::Handlebars;

/// Template for the system instruction.
///
/// The rules steer the model toward tool use for course-specific questions
/// and direct answers for general knowledge, and keep answers free of
/// meta-commentary about the tools themselves.
const SYSTEM_TEMPLATE: &str = "\
You are a teaching assistant for a library of course materials, with search tools for locating course information.

Tools:
- search_course_content: finds material inside course lessons. Use it for questions about specific topics, concepts, or details covered in a course.
- get_course_outline: returns a course's title, link, and full lesson list. Use it for questions about course structure or what a course covers.

Guidelines:
- Answer general-knowledge questions directly, without tools.
- You may call tools sequentially across a small number of rounds to build a complete answer, for example an outline lookup followed by a targeted content search.
- If a tool returns no relevant content, say so plainly instead of guessing.
- Give only the direct answer. Never describe which tools you used or how you searched.
- Keep answers brief, clear, and educational, with examples where they help.
{{#if history}}

Previous conversation:
{{history}}
{{/if}}";

/// Build the system instruction for one query.
///
/// # Arguments
/// * `history` - Formatted prior conversation, or `None` for a fresh session
pub fn build_system_instruction(history: Option<&str>) -> AppResult<String> {
    let data = serde_json::json!({ "history": history });
    let rendered = render_template(SYSTEM_TEMPLATE, &data)?;

    tracing::debug!(
        with_history = history.is_some(),
        chars = rendered.len(),
        "Built system instruction"
    );

    Ok(rendered)
}

/// Render a Handlebars template with the given data.
pub fn render_template(template: &str, data: &serde_json::Value) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Other(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", data)
        .map_err(|e| AppError::Other(format!("Failed to render template: {}", e)))
}
