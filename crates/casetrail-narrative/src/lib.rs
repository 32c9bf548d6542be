//! casetrail-narrative — SAR narrative generation.
//!
//! Composes a case's profile, transaction summary, alert reason, and
//! retrieved grounding context into a fixed two-role prompt and sends it
//! to a configuration-selected model backend (Ollama or any
//! OpenAI-compatible endpoint). Output structure is validated against the
//! mandated SAR sections before it is accepted.
//!
//! Generation is side-effect free with respect to persistence: writing
//! cases, traces, and audit entries is the workflow's responsibility.

pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod prompt;

pub use client::{CompletionRequest, ModelClient, NarrativeModel};
pub use config::{ModelBackend, ModelConfig};
pub use error::GenerationError;
pub use generator::SarGenerator;
pub use prompt::PromptVariant;
