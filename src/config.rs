use std::env;
use std::str::FromStr;
use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;

use crate::domain::cart::PricingPolicy;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read from the environment, optionally seeded by a `.env` file.
//
//   CART_DELIVERY_FEE        flat delivery fee          (default 50)
//   CART_PLATFORM_FEE_RATE   platform fee fraction      (default 0.05)
//   CART_CURRENCY            currency code for display  (default INR)
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub pricing: PricingPolicy,
    pub currency: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup, missing keys take their default
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PricingPolicy::default();

        let delivery_fee = parse_amount(&lookup, "CART_DELIVERY_FEE", defaults.delivery_fee)?;
        let platform_fee_rate = parse_amount(&lookup, "CART_PLATFORM_FEE_RATE", defaults.platform_fee_rate)?;
        if platform_fee_rate > Decimal::ONE {
            bail!("CART_PLATFORM_FEE_RATE must be a fraction, got {}", platform_fee_rate);
        }

        let currency = lookup("CART_CURRENCY")
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "INR".to_string());

        let config = Self {
            pricing: PricingPolicy {
                delivery_fee,
                platform_fee_rate,
            },
            currency,
        };

        tracing::info!(
            delivery_fee = %config.pricing.delivery_fee,
            platform_fee_rate = %config.pricing.platform_fee_rate,
            currency = %config.currency,
            "Configuration loaded"
        );

        Ok(config)
    }
}

fn parse_amount<F>(lookup: &F, key: &str, default: Decimal) -> Result<Decimal>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    let value = Decimal::from_str(raw.trim())
        .with_context(|| format!("Invalid {}: {:?}", key, raw))?;
    if value.is_sign_negative() {
        bail!("{} cannot be negative, got {}", key, value);
    }
    Ok(value)
}
