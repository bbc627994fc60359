//! # Tensive Core
//!
//! Domain types, traits, and error definitions for the Tensive repair
//! assistant. This crate has **no framework dependencies**: it defines the
//! model every other crate implements against.
//!
//! ## Design Philosophy
//!
//! The seams to the outside world are traits defined here:
//! - [`Provider`] is the hosted language-model transport
//! - [`Tool`] is a deterministic capability the model may invoke
//!
//! Implementations live in their own crates, which keeps the orchestrator
//! testable with scripted providers and lets the transport be swapped via
//! configuration.

pub mod error;
pub mod knowledge;
pub mod manifest;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use knowledge::{Assets, KnowledgeEntry};
pub use manifest::{MaterialLine, MaterialManifest};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use tool::{Tool, ToolCall, ToolOutput, ToolRegistry};
