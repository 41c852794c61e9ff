//! Shared process plumbing for the bridge binaries.

pub mod logging;
