//! Data models for trade parameters, bid ladders, and signals.

mod params;
mod plan;
mod signal;

pub use params::{Direction, TradeParameters};
pub use plan::{Bid, LadderResult};
pub use signal::{Signal, SignalStatus};
