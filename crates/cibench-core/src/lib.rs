//! Contextual-integrity acceptability benchmark for emotionally intelligent
//! chatbots.
//!
//! The pipeline: parse tiered scenario and evaluation-task definitions,
//! expand them into an ordered prompt sequence under an enhancement method,
//! walk the sequence through a chatbot backend one prompt at a time, reduce
//! every evaluative reply to a numeric score (with a language-model judge as
//! fallback), and reassemble the flat response stream into per-scenario CSV
//! rows carrying the Contextual Integrity Acceptability Score.

pub mod config;
pub mod engine;
pub mod errors;
pub mod judge;
pub mod model;
pub mod prompt;
pub mod providers;
pub mod scenario;
pub mod scoring;
pub mod storage;
