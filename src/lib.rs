#![deny(missing_docs)]

//! Core library for the ragsum retrieval-and-summarization service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Generative chat backend abstraction and adapters.
pub mod generation;
/// Structured logging and tracing setup.
pub mod logging;
/// Request counters for observability.
pub mod metrics;
/// Chunk ranking and representative selection.
pub mod ranking;
/// Dense-vector similarity primitives.
pub mod similarity;
/// Summarization pipeline orchestration.
pub mod summary;
