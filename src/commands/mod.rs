//! Top-level command orchestration.
pub mod obfuscate;
