//! Pipeline module - loading, cleaning, training and scoring

pub mod cleaning;
pub mod evaluation;
pub mod loader;
pub mod metrics;
pub mod runner;
pub mod training;

pub use cleaning::*;
pub use evaluation::*;
pub use loader::*;
pub use metrics::*;
pub use runner::*;
pub use training::*;
