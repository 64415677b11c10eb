//! Entry-ladder calculation: bid construction and aggregate metrics.

mod calculator;
mod config;

pub use calculator::LadderCalculator;
pub use config::LadderConfig;
