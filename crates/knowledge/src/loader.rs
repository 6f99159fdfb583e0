//! Course document loading.
//!
//! Reads pre-chunked course records produced by the external ingestion
//! pipeline (one JSON file per course) and feeds them into the semantic
//! index. Parsing and chunking the underlying documents is not done here.

use crate::index::SemanticIndex;
use crate::types::{CourseDocument, LoadStats};
use chrono::Utc;
use courseqa_core::{AppError, AppResult};
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

/// Read a single course document record from disk.
pub fn read_course_document(path: &Path) -> AppResult<CourseDocument> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Io(std::io::Error::new(e.kind(), format!("{:?}: {}", path, e))))?;

    let document: CourseDocument = serde_json::from_str(&contents).map_err(|e| {
        AppError::Serialization(format!("Failed to parse course document {:?}: {}", path, e))
    })?;

    Ok(document)
}

/// Load every course document under a directory into the index.
///
/// Scans recursively for `.json` files; courses whose title is already
/// indexed are skipped, so reloading the same directory is harmless.
/// A malformed file fails the load rather than being silently dropped.
pub async fn load_directory(index: &SemanticIndex, dir: &Path) -> AppResult<LoadStats> {
    let start = Instant::now();

    if !dir.is_dir() {
        return Err(AppError::Config(format!(
            "Course document directory does not exist: {:?}",
            dir
        )));
    }

    tracing::info!(dir = ?dir, "Loading course documents");

    let mut courses_loaded = 0;
    let mut chunks_indexed = 0;
    let mut courses_skipped = 0;

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let document = read_course_document(path)?;
        let chunk_count = document.chunks.len();

        if index.add_course(document.course, document.chunks).await? {
            courses_loaded += 1;
            chunks_indexed += chunk_count;
        } else {
            courses_skipped += 1;
        }
    }

    let stats = LoadStats {
        courses_loaded,
        chunks_indexed,
        courses_skipped,
        duration_secs: start.elapsed().as_secs_f64(),
        finished_at: Utc::now(),
    };

    tracing::info!(
        courses = stats.courses_loaded,
        chunks = stats.chunks_indexed,
        skipped = stats.courses_skipped,
        "Course load completed in {:.2}s",
        stats.duration_secs
    );

    Ok(stats)
}
