use std::fmt;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::state::Cart;

// ============================================================================
// Cart Pricing
// ============================================================================
//
// Totals are a pure function of the cart and the pricing policy. They are
// recomputed on demand and never stored alongside the cart.
//
// ============================================================================

const CURRENCY_SCALE: u32 = 2;

/// Fee rules applied on top of the line subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Flat delivery fee charged once a restaurant is selected
    pub delivery_fee: Decimal,
    /// Platform fee as a fraction of the subtotal (0.05 = 5%)
    pub platform_fee_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            delivery_fee: Decimal::new(50, 0),
            platform_fee_rate: Decimal::new(5, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub platform_fee: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Every amount rounded to currency precision, half away from zero
    pub fn rounded(&self) -> Self {
        let round = |d: Decimal| {
            d.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
        };
        Self {
            subtotal: round(self.subtotal),
            delivery_fee: round(self.delivery_fee),
            platform_fee: round(self.platform_fee),
            total: round(self.total),
        }
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.rounded();
        write!(
            f,
            "subtotal {:.2}, delivery {:.2}, platform {:.2}, total {:.2}",
            r.subtotal, r.delivery_fee, r.platform_fee, r.total
        )
    }
}

pub fn compute_totals(cart: &Cart, policy: &PricingPolicy) -> Totals {
    let subtotal: Decimal = cart.lines().map(|line| line.line_total()).sum();

    let delivery_fee = if cart.restaurant().is_some() {
        policy.delivery_fee
    } else {
        Decimal::ZERO
    };

    let platform_fee = subtotal * policy.platform_fee_rate;

    Totals {
        subtotal,
        delivery_fee,
        platform_fee,
        total: subtotal + delivery_fee + platform_fee,
    }
}
