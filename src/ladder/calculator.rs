//! DCA entry-ladder construction and aggregate metrics.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{Bid, Direction, LadderResult, TradeParameters};

use super::LadderConfig;

/// Calculator for multi-bid entry ladders.
///
/// A pure function of its inputs: no I/O, no shared state, identical
/// inputs always produce identical output. Degenerate input (zero
/// risk, no bids, stop inside the band) collapses to
/// [`LadderResult::zero`] instead of panicking, since emptiness is a
/// normal state while a caller is mid-edit.
pub struct LadderCalculator {
    config: LadderConfig,
}

impl LadderCalculator {
    /// Create a calculator with the given constants.
    pub fn new(config: LadderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LadderConfig {
        &self.config
    }

    /// Compute the full entry plan for one set of trade parameters.
    pub fn compute(&self, params: &TradeParameters) -> LadderResult {
        if params.bid_count < 1 || params.risk_budget <= Decimal::ZERO {
            return LadderResult::zero();
        }

        let Some(direction) = params.direction() else {
            return LadderResult::zero();
        };

        let bids = self.build_ladder(params, direction);
        if bids.is_empty() {
            return LadderResult::zero();
        }

        self.aggregate(params, direction, bids)
    }

    /// Construct the bid ladder: prices, risk shares, and sizes.
    fn build_ladder(&self, params: &TradeParameters, direction: Direction) -> Vec<Bid> {
        let prices = Self::bid_prices(params, direction);
        let shares = Self::risk_shares(params.bid_count);

        let mut bids = Vec::with_capacity(prices.len());

        for (price, share) in prices.into_iter().zip(shares) {
            let risk_for_bid = params.risk_budget * share / dec!(100);

            // Distance to stop, widened by the round-trip fee so the
            // realized loss at the stop stays within budget
            let risk_per_unit =
                (price - params.stop_loss).abs() + price * self.config.fee_rate;

            if risk_per_unit <= Decimal::ZERO {
                // Unreachable given a valid direction; drop the bid
                // rather than divide by zero
                continue;
            }

            let size = risk_for_bid / risk_per_unit;

            bids.push(Bid {
                price,
                size,
                notional_value: size * price,
                risk_share_pct: share,
            });
        }

        bids
    }

    /// Bid prices spaced linearly across the band, ordered from the
    /// edge nearest the market toward the far edge.
    ///
    /// A long ladder descends from the top (averaging in as price
    /// falls); a short ladder ascends from the bottom. A single bid
    /// sits at the near edge.
    fn bid_prices(params: &TradeParameters, direction: Direction) -> Vec<Decimal> {
        let top = params.band_top();
        let bottom = params.band_bottom();
        let count = params.bid_count;

        if count == 1 {
            return match direction {
                Direction::Long => vec![top],
                Direction::Short => vec![bottom],
            };
        }

        let step = (top - bottom) / Decimal::from(count - 1);

        (0..count)
            .map(|i| {
                let offset = step * Decimal::from(i);
                match direction {
                    Direction::Long => top - offset,
                    Direction::Short => bottom + offset,
                }
            })
            .collect()
    }

    /// Risk share per bid, in percent.
    ///
    /// Two bids or fewer split evenly; beyond that the first bid
    /// carries 50% and the rest split the remainder, front-loading
    /// size at the entry nearest the market.
    fn risk_shares(count: u32) -> Vec<Decimal> {
        if count <= 2 {
            let share = dec!(100) / Decimal::from(count);
            return vec![share; count as usize];
        }

        let tail_share = dec!(50) / Decimal::from(count - 1);
        let mut shares = vec![dec!(50)];
        shares.extend(std::iter::repeat(tail_share).take(count as usize - 1));
        shares
    }

    /// Fold the ladder into aggregate metrics.
    fn aggregate(
        &self,
        params: &TradeParameters,
        direction: Direction,
        bids: Vec<Bid>,
    ) -> LadderResult {
        let total_notional: Decimal = bids.iter().map(|b| b.notional_value).sum();
        let total_size: Decimal = bids.iter().map(|b| b.size).sum();

        let average_entry = if total_size > Decimal::ZERO {
            total_notional / total_size
        } else {
            Decimal::ZERO
        };

        let projected_profit = total_size * (params.target - average_entry).abs();

        LadderResult {
            bids,
            average_entry_price: average_entry,
            total_notional_value: total_notional,
            projected_profit,
            recommended_leverage: self.recommended_leverage(params, direction),
        }
    }

    /// Safety-bounded maximum leverage.
    ///
    /// Uses the least favorable fill (the far band edge for the
    /// direction), shrinks the stop distance by a safety buffer, and
    /// reserves maintenance-margin headroom, so the stated stop fires
    /// before exchange liquidation would. Derated and capped.
    fn recommended_leverage(&self, params: &TradeParameters, direction: Direction) -> Decimal {
        let safe_entry = match direction {
            Direction::Long => params.band_top(),
            Direction::Short => params.band_bottom(),
        };

        if safe_entry <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let margin_reserve = safe_entry * self.config.maintenance_margin_rate;

        let denominator = match direction {
            Direction::Long => {
                let effective_stop = params.stop_loss * (Decimal::ONE - self.config.safety_buffer);
                safe_entry - effective_stop + margin_reserve
            }
            Direction::Short => {
                let effective_stop = params.stop_loss * (Decimal::ONE + self.config.safety_buffer);
                effective_stop - safe_entry + margin_reserve
            }
        };

        if denominator <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let leverage = safe_entry / denominator * self.config.leverage_derating;

        leverage.min(self.config.max_leverage).max(Decimal::ZERO)
    }
}

impl Default for LadderCalculator {
    fn default() -> Self {
        Self::new(LadderConfig::default())
    }
}
