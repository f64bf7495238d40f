//! Integration Tests Module
//!
//! End-to-end tests for the analysis engine using scripted backends.

// Scripted backends and engine builders
mod support;

// Classification, caching, retry, fallback, ordering and cancellation
mod engine_test;

// Config loading and session export
mod storage_test;
