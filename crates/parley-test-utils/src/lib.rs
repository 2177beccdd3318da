//! Test helpers shared across Parley crates.

pub mod llm;

pub use llm::{FailingLLM, FixedLLM, PacedLLM, RecordingLLM, ScriptedLLM, mock_info};
