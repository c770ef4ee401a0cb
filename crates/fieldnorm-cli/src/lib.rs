//! CLI library components for fieldnorm.

pub mod logging;
pub mod overrides;
pub mod summary;
