//! LLM Provider implementations for atomchat.
//!
//! All providers implement the `atomchat_core::Provider` trait.
//! The router picks the adapter named in the configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_from_config, default_base_url};
