//! # Sunphases Library
//!
//! Internal library for the sunphases binary.
//!
//! This library exists to enable testing of the engine internals and to
//! provide clean separation between CLI dispatch (main.rs) and application
//! logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Sunphases` struct provides the application API
//! - **Engine**: `engine` module owns the recompute/trigger logic — the
//!   boundary expression grammar, the event-table cache and the per-rule
//!   hysteresis state machines
//! - **Collaborators**: `solar` (astronomical calculator), `source`
//!   (position sampling), `sink` (delta publication) — all behind traits so
//!   the engine stays pure
//! - **Configuration**: `config` module for TOML settings with validation
//!   and default-file generation
//! - **Infrastructure**: signal handling and logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod args;
pub mod config;
pub mod constants;
pub mod engine;
pub mod phases;
pub mod signals;
pub mod sink;
pub mod solar;
pub mod source;

// Internal modules
mod sunphases;

// Re-export for binary
pub use sunphases::Sunphases;
