//! Day-count (pro-rata) adjustment of the net premium due.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::MONEY_DECIMAL_PLACES;
use crate::errors::{CalculatorError, Result, ValidationError};
use crate::proposals::proposal_model::ProRataResult;

/// Applies `cover_days / standard_days` to the net premium due.
///
/// `net_premium_due` must be the authoritative figure from the most recent
/// adjustment run (or aggregate, when adjustments never ran); a zero or
/// negative figure is a usage error, never computed as a zero premium.
/// `cover_days` is the user-confirmed integer, independent of the policy's
/// effective/expiry dates. The final premium is rounded to two decimal
/// places, half away from zero.
pub fn apply_pro_rata(
    net_premium_due: Decimal,
    cover_days: i64,
    standard_days: i64,
) -> Result<ProRataResult> {
    if cover_days <= 0 {
        return Err(ValidationError::NonPositiveCoverDays(cover_days).into());
    }
    if standard_days <= 0 {
        return Err(ValidationError::InvalidInput(format!(
            "Standard cover days must be positive, got {}",
            standard_days
        ))
        .into());
    }
    if net_premium_due <= Decimal::ZERO {
        return Err(CalculatorError::NonPositiveNetPremium(net_premium_due).into());
    }

    let pro_rata_factor = Decimal::from(cover_days) / Decimal::from(standard_days);
    let pro_rata_premium = (net_premium_due * pro_rata_factor).round_dp_with_strategy(
        MONEY_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    );

    Ok(ProRataResult {
        pro_rata_factor,
        pro_rata_premium,
        is_pro_rated: cover_days != standard_days,
        cover_days,
        standard_days,
    })
}
