//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and 2D geometry helpers
//! - Handle-based collections for collidables and listeners
//! - Per-frame timing context
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
