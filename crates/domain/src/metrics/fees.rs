use crate::error::{DomainError, DomainResult};
use rust_decimal::Decimal;

const DAYS_PER_YEAR: u32 = 365;
const HOURS_PER_YEAR: u32 = 365 * 24;

/// Annualized fee yield for a position from fees actually earned:
///
/// `apr = 100 * (fees / days * 365) / initial_value`
///
/// A linear extrapolation of the observed window, not a forecast.
pub fn position_fee_apr(
    fees_earned: Decimal,
    days_held: Decimal,
    initial_value_usd: Decimal,
) -> DomainResult<Decimal> {
    if days_held <= Decimal::ZERO {
        return Err(DomainError::invalid("days held must be strictly positive"));
    }
    if initial_value_usd <= Decimal::ZERO {
        return Err(DomainError::invalid(
            "initial position value must be positive",
        ));
    }
    let annual_fees = fees_earned / days_held * Decimal::from(DAYS_PER_YEAR);
    Ok(Decimal::from(100) * annual_fees / initial_value_usd)
}

/// Annualized fee yield for a whole pool from window volume:
///
/// `apr = 100 * (volume * fee_rate / tvl) * (365*24 / window_hours)`
pub fn pool_fee_apr(
    volume_window_usd: Decimal,
    fee_rate: Decimal,
    tvl_usd: Decimal,
    window_hours: Decimal,
) -> DomainResult<Decimal> {
    if tvl_usd <= Decimal::ZERO {
        return Err(DomainError::invalid("pool TVL must be positive"));
    }
    if window_hours <= Decimal::ZERO {
        return Err(DomainError::invalid("window must be strictly positive"));
    }
    let fees = volume_window_usd * fee_rate;
    let return_window = fees / tvl_usd;
    let periods_per_year = Decimal::from(HOURS_PER_YEAR) / window_hours;
    Ok(return_window * periods_per_year * Decimal::from(100))
}

/// Fees generated by the pool over a window.
#[must_use]
pub fn fees_in_window(volume_usd: Decimal, fee_rate: Decimal) -> Decimal {
    volume_usd * fee_rate
}

/// Daily pool fee income from 24h volume.
#[must_use]
pub fn daily_fees(volume_24h_usd: Decimal, fee_rate: Decimal) -> Decimal {
    volume_24h_usd * fee_rate
}

/// Annual pool fee income assuming constant volume.
#[must_use]
pub fn annual_fees(volume_24h_usd: Decimal, fee_rate: Decimal) -> Decimal {
    daily_fees(volume_24h_usd, fee_rate) * Decimal::from(DAYS_PER_YEAR)
}

/// Annualized volume/TVL ratio. Higher velocity means more trading
/// activity per unit of parked liquidity.
pub fn fee_velocity(
    volume_window_usd: Decimal,
    tvl_usd: Decimal,
    window_hours: Decimal,
) -> DomainResult<Decimal> {
    if tvl_usd <= Decimal::ZERO {
        return Err(DomainError::invalid("pool TVL must be positive"));
    }
    if window_hours <= Decimal::ZERO {
        return Err(DomainError::invalid("window must be strictly positive"));
    }
    let velocity_window = volume_window_usd / tvl_usd;
    Ok(velocity_window * Decimal::from(HOURS_PER_YEAR) / window_hours)
}

/// Earnings projection for a position of a given size inside the pool.
#[derive(Debug, Clone)]
pub struct PositionEarnings {
    pub position_size_usd: Decimal,
    pub pool_share_percent: Decimal,
    pub earnings_window_usd: Decimal,
    pub earnings_daily_usd: Decimal,
    pub earnings_annual_usd: Decimal,
    pub apr_percent: Decimal,
}

/// Pro-rata share of pool fees accruing to a position of
/// `position_size_usd`, extrapolated to daily and annual figures.
pub fn position_earnings(
    position_size_usd: Decimal,
    volume_window_usd: Decimal,
    tvl_usd: Decimal,
    fee_rate: Decimal,
    window_hours: Decimal,
) -> DomainResult<PositionEarnings> {
    if tvl_usd <= Decimal::ZERO {
        return Err(DomainError::invalid("pool TVL must be positive"));
    }
    if window_hours <= Decimal::ZERO {
        return Err(DomainError::invalid("window must be strictly positive"));
    }
    if position_size_usd < Decimal::ZERO {
        return Err(DomainError::invalid("position size must be non-negative"));
    }

    let pool_share = position_size_usd / tvl_usd;
    let total_fees = fees_in_window(volume_window_usd, fee_rate);
    let earnings_window = total_fees * pool_share;
    let periods_per_year = Decimal::from(HOURS_PER_YEAR) / window_hours;
    let earnings_annual = earnings_window * periods_per_year;
    let earnings_daily = earnings_annual / Decimal::from(DAYS_PER_YEAR);
    let apr_percent = if position_size_usd.is_zero() {
        Decimal::ZERO
    } else {
        earnings_annual / position_size_usd * Decimal::from(100)
    };

    Ok(PositionEarnings {
        position_size_usd,
        pool_share_percent: pool_share * Decimal::from(100),
        earnings_window_usd: earnings_window,
        earnings_daily_usd: earnings_daily,
        earnings_annual_usd: earnings_annual,
        apr_percent,
    })
}

/// APR the same pool would produce at each of the common fee tiers.
pub fn compare_fee_tiers(
    volume_window_usd: Decimal,
    tvl_usd: Decimal,
    window_hours: Decimal,
) -> DomainResult<Vec<(&'static str, Decimal)>> {
    let tiers: [(&'static str, Decimal); 3] = [
        ("0.05%", Decimal::new(5, 4)),
        ("0.3%", Decimal::new(3, 3)),
        ("1.0%", Decimal::new(1, 2)),
    ];
    tiers
        .iter()
        .map(|(name, rate)| {
            pool_fee_apr(volume_window_usd, *rate, tvl_usd, window_hours).map(|apr| (*name, apr))
        })
        .collect()
}

/// Volume the pool must trade in a window to hit `target_apr` percent.
pub fn breakeven_volume(
    tvl_usd: Decimal,
    fee_rate: Decimal,
    target_apr: Decimal,
    window_hours: Decimal,
) -> DomainResult<Decimal> {
    if tvl_usd <= Decimal::ZERO || fee_rate <= Decimal::ZERO {
        return Err(DomainError::invalid(
            "TVL and fee rate must be positive to invert the APR formula",
        ));
    }
    if window_hours <= Decimal::ZERO {
        return Err(DomainError::invalid("window must be strictly positive"));
    }
    let periods_per_year = Decimal::from(HOURS_PER_YEAR) / window_hours;
    Ok((target_apr / Decimal::from(100) * tvl_usd) / (fee_rate * periods_per_year))
}
