//! The recognition orchestration layer.
//!
//! This module contains the engine that ties preprocessing, generation,
//! and decoding together, its configuration, and the debug sink for
//! failed samples.

pub mod config;
pub mod debug_sink;
pub mod engine;

pub use config::{OcrEngineConfig, RetryPolicy};
pub use debug_sink::DebugSampleSink;
pub use engine::{EngineKind, OcrEngine, OcrOutcome};
