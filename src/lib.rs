//! Praxis text quality engine
//!
//! Scores free-form descriptions and uploaded text bundles against a rule
//! vocabulary (language, length, toxicity, keywords) and fuses the rule
//! score with zero-shot classifier scores into one explainable verdict.

pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod evaluation;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod oracles;
pub mod rules;

pub use error::{EvaluationError, OracleError};
pub use evaluation::engine::QualityEngine;
