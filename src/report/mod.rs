//! Report module - run summaries and experiment tracking

pub mod summary;
pub mod tracker;

pub use summary::*;
pub use tracker::*;
