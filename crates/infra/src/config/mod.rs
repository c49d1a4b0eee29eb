//! Configuration loading
//!
//! This module provides utilities for loading application configuration
//! from environment variables and files.

pub mod loader;

// Re-export commonly used items
pub use loader::{find_config_paths, load, load_from_env, load_from_file, load_if_present};
