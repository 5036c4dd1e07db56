//! Per-file policy: content classification and the option patches and
//! output rewrites it selects.

pub mod classifier;
pub mod resolver;

pub use classifier::{Classification, RiskProfile, classify};
pub use resolver::{FilePolicy, PolicyResolver};
