//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Provision markdown blocks → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → server stops accepting → drains → exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
