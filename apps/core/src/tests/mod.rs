//! Test Module
//!
//! Cross-module tests for the Promptodactyl backend.
//!
//! ## Test Categories
//! - `support`: scripted generative service and pipeline fixtures
//! - `pipeline_tests`: refinement and enhancement orchestration
//! - `ratings_tests`: rating aggregation under concurrency
//! - `http_tests`: the HTTP surface end to end

mod support;

pub mod pipeline_tests;
