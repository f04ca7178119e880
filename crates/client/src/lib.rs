//! Remote provider clients for dirasa.
//!
//! This crate implements the core pipeline's `Classify` and `Generate`
//! traits against real chat-completions and generateContent endpoints.

pub mod classify;
pub mod error;
pub mod generate;

pub use classify::{ClassifierClient, ClassifierConfig};
pub use error::ProviderError;
pub use generate::{GeneratorClient, GeneratorConfig, strip_fences};
