//! Stored trade-signal records that seed the calculator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Direction, TradeParameters};

/// Lifecycle status of a published signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Open,
    Filled,
    Closed,
    Cancelled,
}

impl SignalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Open => "open",
            SignalStatus::Filled => "filled",
            SignalStatus::Closed => "closed",
            SignalStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "filled" => Some(Self::Filled),
            "closed" => Some(Self::Closed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A published trading signal.
///
/// `direction` is the author's stated side and is display metadata
/// only: ladder construction always re-derives direction from the
/// stop's side of the entry band, so a mislabeled record yields the
/// empty ladder instead of a nonsense one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: i64,

    /// Ticker symbol, e.g. "BTCUSDT"
    pub ticker: String,

    /// Stated trade side
    pub direction: Direction,

    /// Primary entry price
    pub entry1: Decimal,

    /// Optional second entry bounding the band; absent for
    /// single-price entries
    pub entry2: Option<Decimal>,

    pub stop_loss: Decimal,

    pub target: Decimal,

    /// Free-form trade profile, e.g. "SCALP" or "SWING"
    pub profile: Option<String>,

    /// Suggested bid count; falls back to the configured default
    pub bids: Option<u32>,

    pub status: SignalStatus,

    pub created_at: DateTime<Utc>,
}

impl Signal {
    /// Build calculator inputs from this record and a resolved risk
    /// budget.
    pub fn trade_parameters(&self, risk_budget: Decimal, default_bid_count: u32) -> TradeParameters {
        let entry2 = self.entry2.unwrap_or(self.entry1);
        TradeParameters {
            risk_budget,
            entry_high: self.entry1.max(entry2),
            entry_low: self.entry1.min(entry2),
            stop_loss: self.stop_loss,
            target: self.target,
            bid_count: self.bids.unwrap_or(default_bid_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn signal() -> Signal {
        Signal {
            id: 1,
            ticker: "BTCUSDT".to_string(),
            direction: Direction::Long,
            entry1: dec!(50000),
            entry2: Some(dec!(49000)),
            stop_loss: dec!(48500),
            target: dec!(52000),
            profile: Some("SCALP".to_string()),
            bids: Some(4),
            status: SignalStatus::Open,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_trade_parameters_from_signal() {
        let params = signal().trade_parameters(dec!(40), 4);

        assert_eq!(params.risk_budget, dec!(40));
        assert_eq!(params.entry_high, dec!(50000));
        assert_eq!(params.entry_low, dec!(49000));
        assert_eq!(params.stop_loss, dec!(48500));
        assert_eq!(params.target, dec!(52000));
        assert_eq!(params.bid_count, 4);
    }

    #[test]
    fn test_single_entry_signal_collapses_band() {
        let mut s = signal();
        s.entry2 = None;
        s.bids = None;

        let params = s.trade_parameters(dec!(40), 4);

        assert_eq!(params.entry_high, dec!(50000));
        assert_eq!(params.entry_low, dec!(50000));
        assert_eq!(params.bid_count, 4);
    }

    #[test]
    fn test_entries_in_either_order() {
        let mut s = signal();
        s.entry1 = dec!(49000);
        s.entry2 = Some(dec!(50000));

        let params = s.trade_parameters(dec!(40), 4);

        assert_eq!(params.entry_high, dec!(50000));
        assert_eq!(params.entry_low, dec!(49000));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            SignalStatus::Open,
            SignalStatus::Filled,
            SignalStatus::Closed,
            SignalStatus::Cancelled,
        ] {
            assert_eq!(SignalStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(SignalStatus::from_str("bogus"), None);
    }
}
