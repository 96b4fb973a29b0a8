//! Shared types for the Smalltalk compiler crates.
//!
//! - [`Span`]: source positions for diagnostics and debug info
//! - [`CompilationError`]: every error the definition pass and the code
//!   generator can raise

mod error;
mod span;

pub use error::{CompilationError, Result};
pub use span::Span;
