//! Calculator input: trade parameters and direction resolution.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a planned trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "long" => Some(Self::Long),
            "short" => Some(Self::Short),
            _ => None,
        }
    }
}

/// One complete set of inputs for a ladder calculation.
///
/// `entry_high` and `entry_low` bound the entry band and may be equal
/// for a single-price entry. `target` only affects the projected-profit
/// aggregate, never ladder construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeParameters {
    /// Total capital at risk if the stop is hit, in account currency
    pub risk_budget: Decimal,

    /// Upper bound of the entry band
    pub entry_high: Decimal,

    /// Lower bound of the entry band
    pub entry_low: Decimal,

    /// Stop-loss price; must sit strictly outside the band
    pub stop_loss: Decimal,

    /// Take-profit price, used for the projected-profit figure
    pub target: Decimal,

    /// Number of limit orders to split the band into
    pub bid_count: u32,
}

impl TradeParameters {
    /// Upper edge of the entry band regardless of input order.
    pub fn band_top(&self) -> Decimal {
        self.entry_high.max(self.entry_low)
    }

    /// Lower edge of the entry band regardless of input order.
    pub fn band_bottom(&self) -> Decimal {
        self.entry_high.min(self.entry_low)
    }

    /// Derive the trade direction from the stop's side of the band.
    ///
    /// Returns `None` while the stop sits inside or touches the band,
    /// which is a normal mid-edit state, not an error.
    pub fn direction(&self) -> Option<Direction> {
        if self.stop_loss < self.band_bottom() {
            Some(Direction::Long)
        } else if self.stop_loss > self.band_top() {
            Some(Direction::Short)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params(high: Decimal, low: Decimal, stop: Decimal) -> TradeParameters {
        TradeParameters {
            risk_budget: dec!(100),
            entry_high: high,
            entry_low: low,
            stop_loss: stop,
            target: dec!(120),
            bid_count: 3,
        }
    }

    #[test]
    fn test_direction_long_short() {
        assert_eq!(
            params(dec!(110), dec!(100), dec!(95)).direction(),
            Some(Direction::Long)
        );
        assert_eq!(
            params(dec!(110), dec!(100), dec!(115)).direction(),
            Some(Direction::Short)
        );
    }

    #[test]
    fn test_stop_inside_band_is_invalid() {
        assert_eq!(params(dec!(110), dec!(100), dec!(105)).direction(), None);
        // Touching either edge is also invalid
        assert_eq!(params(dec!(110), dec!(100), dec!(100)).direction(), None);
        assert_eq!(params(dec!(110), dec!(100), dec!(110)).direction(), None);
    }

    #[test]
    fn test_band_edges_ignore_input_order() {
        let p = params(dec!(100), dec!(110), dec!(95));
        assert_eq!(p.band_top(), dec!(110));
        assert_eq!(p.band_bottom(), dec!(100));
    }

    #[test]
    fn test_single_price_band() {
        let p = params(dec!(100), dec!(100), dec!(90));
        assert_eq!(p.band_top(), dec!(100));
        assert_eq!(p.band_bottom(), dec!(100));
        assert_eq!(p.direction(), Some(Direction::Long));
    }
}
