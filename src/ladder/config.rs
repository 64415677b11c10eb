//! Ladder calculation constants.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Configuration for ladder construction and leverage sizing.
///
/// Every constant here is overridable; the defaults encode the
/// production fee/leverage policy (fee-buffered sizing, safety-derated
/// leverage). Setting `fee_rate` to zero recovers fee-less sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderConfig {
    /// Round-trip trading fee as a fraction of price, added to each
    /// bid's distance-to-stop when sizing (0.0004 = 0.04%)
    pub fee_rate: Decimal,

    /// Exchange maintenance-margin rate used in the leverage formula
    /// (0.005 = 0.5%)
    pub maintenance_margin_rate: Decimal,

    /// Extra buffer applied to the stop price before computing
    /// leverage, so the stop triggers ahead of liquidation (0.005 = 0.5%)
    pub safety_buffer: Decimal,

    /// Final multiplier applied to the computed leverage
    pub leverage_derating: Decimal,

    /// Hard cap on recommended leverage
    pub max_leverage: Decimal,

    /// Bid count used when a signal record does not specify one
    pub default_bid_count: u32,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            fee_rate: dec!(0.0004),              // 0.04% round trip
            maintenance_margin_rate: dec!(0.005), // 0.5% MMR
            safety_buffer: dec!(0.005),           // 0.5% stop buffer
            leverage_derating: dec!(0.95),
            max_leverage: dec!(100),
            default_bid_count: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = LadderConfig::default();

        assert!(config.fee_rate >= Decimal::ZERO);
        assert!(config.maintenance_margin_rate > Decimal::ZERO);
        assert!(config.safety_buffer > Decimal::ZERO);
        assert!(config.leverage_derating > Decimal::ZERO);
        assert!(config.leverage_derating <= Decimal::ONE);
        assert_eq!(config.max_leverage, dec!(100));
        assert_eq!(config.default_bid_count, 4);
    }
}
