//! Bookshelf application library.
//!
//! Wires the books module onto the kernel, database, and HTTP crates.

pub mod app;
pub mod modules;

pub use app::Application;
