//! csat: Review-Score Regression Library
//!
//! Cleans the Olist order-level customer-satisfaction export, fits a linear
//! regression on the review score and scores it with R², RMSE and MSE.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;
