//! End-to-end tests for the query flow.
