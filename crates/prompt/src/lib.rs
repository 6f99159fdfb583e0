//! Prompt assembly crate for CourseQA.
//!
//! Builds the system instruction handed to the generative model on every
//! query: behavior rules, tool guidance, and the previous conversation when
//! one exists. Templates are rendered with Handlebars so the history section
//! only appears when history is present.

pub mod builder;

pub use builder::{build_system_instruction, render_template};
