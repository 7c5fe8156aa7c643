//! Utility modules.

pub mod timeout;
