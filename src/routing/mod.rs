//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path)
//!     → matcher.rs (evaluate each handler block's conditions)
//!     → first matching block handles the response, or none does
//! ```
//!
//! # Design Decisions
//! - Matchers compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - First match wins, in configuration order

pub mod matcher;

pub use matcher::{build_matcher, Matcher};
