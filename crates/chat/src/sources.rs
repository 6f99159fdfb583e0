//! Per-query source citation accumulation.
//!
//! A fresh `SourceCollector` is created for every query and threaded through
//! tool execution, so concurrent queries can never observe each other's
//! citations and a query can never report stale ones. Draining the collector
//! empties it, which keeps source reporting exactly-once.

use serde::{Deserialize, Serialize};

/// A citation attributing part of an answer to retrieved course content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceReference {
    /// Human-readable label, e.g. "Introduction to Machine Learning - Lesson 2"
    pub label: String,

    /// Link to the cited lesson, when the course material has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl SourceReference {
    /// Build the label for a chunk's course and lesson.
    pub fn for_chunk(
        course_title: &str,
        lesson_number: Option<u32>,
        link: Option<String>,
    ) -> Self {
        let label = match lesson_number {
            Some(number) => format!("{} - Lesson {}", course_title, number),
            None => course_title.to_string(),
        };

        Self { label, link }
    }
}

/// Ordered accumulator for one query's citations.
#[derive(Debug, Default)]
pub struct SourceCollector {
    refs: Vec<SourceReference>,
}

impl SourceCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one citation. Order of recording is the order reported.
    pub fn push(&mut self, source: SourceReference) {
        self.refs.push(source);
    }

    /// Take every accumulated citation, leaving the collector empty.
    ///
    /// A second drain without an intervening tool execution returns an
    /// empty list.
    pub fn drain(&mut self) -> Vec<SourceReference> {
        std::mem::take(&mut self.refs)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_with_lesson() {
        let source = SourceReference::for_chunk("Compilers", Some(3), None);
        assert_eq!(source.label, "Compilers - Lesson 3");
    }

    #[test]
    fn test_label_without_lesson() {
        let source = SourceReference::for_chunk("Compilers", None, None);
        assert_eq!(source.label, "Compilers");
    }

    #[test]
    fn test_drain_is_exactly_once() {
        let mut collector = SourceCollector::new();
        collector.push(SourceReference::for_chunk("Compilers", Some(1), None));
        collector.push(SourceReference::for_chunk("Compilers", Some(2), None));

        let first = collector.drain();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].label, "Compilers - Lesson 1");

        let second = collector.drain();
        assert!(second.is_empty());
        assert!(collector.is_empty());
    }

    #[test]
    fn test_push_preserves_order() {
        let mut collector = SourceCollector::new();
        for lesson in 1..=4 {
            collector.push(SourceReference::for_chunk("Course", Some(lesson), None));
        }

        let drained = collector.drain();
        let labels: Vec<_> = drained.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Course - Lesson 1",
                "Course - Lesson 2",
                "Course - Lesson 3",
                "Course - Lesson 4"
            ]
        );
    }
}
