//! Calculator output: the bid ladder and its aggregate metrics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One limit order in the entry ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Limit price for this order
    pub price: Decimal,

    /// Position size in units of the traded asset
    pub size: Decimal,

    /// Dollar exposure of this order (price * size)
    pub notional_value: Decimal,

    /// Share of the total risk budget carried by this bid, in (0, 100]
    pub risk_share_pct: Decimal,
}

/// A complete entry plan: ordered bids plus aggregates.
///
/// This is a derived value, recomputed in full on any input change.
/// The zero value (empty bids, zeroed aggregates) is the defined
/// result for degenerate input and renders as "waiting for valid
/// parameters" rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderResult {
    /// Bids ordered from the band edge nearest the market toward the
    /// far edge
    pub bids: Vec<Bid>,

    /// Notional-weighted average entry price across all bids
    pub average_entry_price: Decimal,

    /// Sum of all bid notional values
    pub total_notional_value: Decimal,

    /// Profit at the target assuming every bid fills at its price
    pub projected_profit: Decimal,

    /// Safety-derated maximum leverage such that the stop triggers
    /// before maintenance-margin liquidation
    pub recommended_leverage: Decimal,
}

impl LadderResult {
    /// The defined empty result for degenerate input.
    pub fn zero() -> Self {
        Self {
            bids: Vec::new(),
            average_entry_price: Decimal::ZERO,
            total_notional_value: Decimal::ZERO,
            projected_profit: Decimal::ZERO,
            recommended_leverage: Decimal::ZERO,
        }
    }

    /// True when no valid ladder could be built from the inputs.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    /// Total position size across all bids.
    pub fn total_size(&self) -> Decimal {
        self.bids.iter().map(|b| b.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_result() {
        let result = LadderResult::zero();

        assert!(result.is_empty());
        assert_eq!(result.total_size(), Decimal::ZERO);
        assert_eq!(result.average_entry_price, Decimal::ZERO);
        assert_eq!(result.total_notional_value, Decimal::ZERO);
        assert_eq!(result.projected_profit, Decimal::ZERO);
        assert_eq!(result.recommended_leverage, Decimal::ZERO);
    }

    #[test]
    fn test_total_size_sums_bids() {
        let result = LadderResult {
            bids: vec![
                Bid {
                    price: dec!(100),
                    size: dec!(2),
                    notional_value: dec!(200),
                    risk_share_pct: dec!(50),
                },
                Bid {
                    price: dec!(99),
                    size: dec!(3),
                    notional_value: dec!(297),
                    risk_share_pct: dec!(50),
                },
            ],
            average_entry_price: dec!(99.4),
            total_notional_value: dec!(497),
            projected_profit: dec!(0),
            recommended_leverage: dec!(0),
        };

        assert_eq!(result.total_size(), dec!(5));
        assert!(!result.is_empty());
    }
}
