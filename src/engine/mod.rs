// * Engine
// * Field normalization, cleaning/dedupe, and cycle orchestration.

pub mod cleaner;
pub mod normalization;
pub mod pipeline;

// * Re-exports for convenient access
pub use cleaner::{CleanError, Cleaner};
pub use pipeline::{CycleGate, Pipeline, PipelineError, RunReport};
