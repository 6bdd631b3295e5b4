/// State management module
///
/// This module holds all session state:
/// - Shared data structures (data.rs)
/// - The circular navigation ring (ring.rs)
/// - The session coordinator driven by the UI (session.rs)
/// - User configuration (config.rs)

pub mod config;
pub mod data;
pub mod ring;
pub mod session;
