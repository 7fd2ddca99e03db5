use crate::error::{DomainError, DomainResult};
use crate::math::{constant_product, weighted};
use crate::metrics::{fees, recommendation, IlReport};
use crate::pool::PoolContext;
use crate::position::{FeeRecord, Position, PriceMovement};
use rust_decimal::Decimal;

/// Builds the full IL breakdown for a 50/50 constant-product position.
///
/// The pool rebalances the deposit along `x * y = k` as the token0/token1
/// price moves by `ratio`; the report compares the rebalanced holdings to
/// simply holding the deposit. Token1 is the pricing numeraire: its USD
/// price is held fixed while token0's scales by the ratio.
///
/// Fees are added back into `current_value_usd` as realized gain, but do
/// not affect the IL figures themselves.
pub fn constant_product_report(
    position: &Position,
    movement: &PriceMovement,
    fee_record: &FeeRecord,
) -> DomainResult<IlReport> {
    let ratio = movement.ratio();
    let (new_amount0, new_amount1) =
        constant_product::rebalanced_amounts(position.amount0(), position.amount1(), ratio)?;

    let initial_value_usd = position.initial_value_usd();
    let hodl_value_usd = position.amount0() * position.initial_price0() * ratio
        + position.amount1() * position.initial_price1();
    let current_pre_fees = new_amount0 * position.initial_price0() * ratio
        + new_amount1 * position.initial_price1();

    // hodl value is positive by Position's construction for any ratio > 0
    let il_usd = current_pre_fees - hodl_value_usd;
    let il_percentage = Decimal::from(100) * il_usd / hodl_value_usd;

    let fee_apr = fees::position_fee_apr(
        fee_record.fees_earned(),
        fee_record.days_held(),
        initial_value_usd,
    )?;
    let net_apr =
        fee_apr + il_percentage / fee_record.days_held() * Decimal::from(365);

    Ok(IlReport {
        il_percentage,
        il_usd,
        initial_value_usd,
        current_value_usd: current_pre_fees + fee_record.fees_earned(),
        hodl_value_usd,
        fee_apr,
        net_apr,
        recommendation: recommendation::classify(il_percentage, fee_apr, net_apr),
    })
}

/// IL percentage for a pool described by a `PoolContext`, given each
/// token's price change factor since the window start.
///
/// Balanced two-asset pools use the constant-product closed form on the
/// relative ratio; weighted pools use the weighted invariant. Stable pools
/// are refused here: their flat curve near the peg makes the
/// constant-product figure a material overstatement, and silently using it
/// anyway is exactly the failure mode this function exists to avoid.
pub fn pool_il_percent(context: &PoolContext, price_ratios: &[Decimal]) -> DomainResult<Decimal> {
    if context.pool_kind.is_stable() {
        return Err(DomainError::unsupported(
            "curve-stable pools have no closed-form invariant here; \
             request the constant-product approximation explicitly",
        ));
    }
    if price_ratios.iter().any(|r| *r <= Decimal::ZERO) {
        return Err(DomainError::invalid(
            "price ratios must be strictly positive",
        ));
    }

    let normalized = weighted::normalize_weights(&context.token_weights)?;
    if price_ratios.len() != normalized.len() {
        return Err(DomainError::invalid(
            "price ratios and weights must have the same length",
        ));
    }

    if weighted::is_balanced(&normalized) {
        let relative = price_ratios[1] / price_ratios[0];
        Ok(constant_product::il_fraction(relative)? * Decimal::from(100))
    } else {
        weighted::weighted_il_percent(price_ratios, &context.token_weights)
    }
}

/// Like [`pool_il_percent`], but degrades stable pools to the
/// constant-product approximation instead of failing. The note that comes
/// back with the figure is part of the contract: the fallback is reported,
/// never silent.
pub fn pool_il_percent_or_approximation(
    context: &PoolContext,
    price_ratios: &[Decimal],
) -> DomainResult<(Decimal, Option<&'static str>)> {
    match pool_il_percent(context, price_ratios) {
        Ok(il) => Ok((il, None)),
        Err(DomainError::UnsupportedPool(_)) => {
            if price_ratios.len() != 2 {
                return Err(DomainError::unsupported(
                    "stable-pool approximation only covers two-asset pools",
                ));
            }
            if price_ratios.iter().any(|r| *r <= Decimal::ZERO) {
                return Err(DomainError::invalid(
                    "price ratios must be strictly positive",
                ));
            }
            let relative = price_ratios[1] / price_ratios[0];
            let il = constant_product::il_fraction(relative)? * Decimal::from(100);
            Ok((
                il,
                Some(
                    "Stable pool estimated with the constant-product formula; \
                     realized IL near the peg is materially smaller",
                ),
            ))
        }
        Err(e) => Err(e),
    }
}

/// One row of the canned what-if table.
#[derive(Debug, Clone)]
pub struct IlScenario {
    pub label: &'static str,
    pub price_ratio: Decimal,
    pub il_percent: Decimal,
}

/// IL estimates for common single-token price moves, holding the other
/// token flat. Useful as a quick feel for how exposed a weight split is.
pub fn scenario_estimates(weights: &[Decimal]) -> DomainResult<Vec<IlScenario>> {
    let scenarios: [(&'static str, Decimal); 9] = [
        ("2x price increase", Decimal::from(2)),
        ("2x price decrease", Decimal::new(5, 1)),
        ("3x price increase", Decimal::from(3)),
        ("4x price increase", Decimal::from(4)),
        ("5x price increase", Decimal::from(5)),
        ("10% increase", Decimal::new(11, 1)),
        ("10% decrease", Decimal::new(9, 1)),
        ("25% increase", Decimal::new(125, 2)),
        ("25% decrease", Decimal::new(75, 2)),
    ];

    scenarios
        .iter()
        .map(|&(label, ratio)| {
            weighted::weighted_il_percent(&[Decimal::ONE, ratio], weights).map(|il_percent| {
                IlScenario {
                    label,
                    price_ratio: ratio,
                    il_percent,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::PoolKind;
    use rust_decimal_macros::dec;

    fn position() -> Position {
        Position::new(dec!(1), dec!(1), dec!(2000), dec!(1)).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let report = constant_product_report(
            &position(),
            &PriceMovement::new(dec!(1.5)).unwrap(),
            &FeeRecord::new(dec!(10), dec!(30)).unwrap(),
        )
        .unwrap();

        assert_eq!(report.initial_value_usd, dec!(2001));
        assert_eq!(report.hodl_value_usd, dec!(3001));
        // current pre-fee value: 0.8165*2000*1.5 + 1.2247 = 2450.71...
        assert!((report.current_value_usd - dec!(10) - dec!(2450.71)).abs() < dec!(0.05));
        assert!((report.il_usd - dec!(-550.3)).abs() < dec!(0.05));
        assert!((report.il_percentage - dec!(-18.34)).abs() < dec!(0.01));
    }

    #[test]
    fn test_no_move_no_loss() {
        let report = constant_product_report(
            &position(),
            &PriceMovement::new(dec!(1)).unwrap(),
            &FeeRecord::new(dec!(0), dec!(30)).unwrap(),
        )
        .unwrap();

        assert!(report.il_percentage.abs() < dec!(0.000000001));
        assert!(report.il_usd.abs() < dec!(0.000000001));
        assert_eq!(report.recommendation, crate::Recommendation::Monitor);
    }

    #[test]
    fn test_derivation_matches_closed_form() {
        // closed-form equivalence holds for a proper 50/50-value deposit:
        // 3 token0 at $4 and 12 token1 at $1 are $12 per side
        let balanced = Position::new(dec!(3), dec!(12), dec!(4), dec!(1)).unwrap();
        for ratio in [dec!(0.25), dec!(0.5), dec!(1.5), dec!(2), dec!(4)] {
            let report = constant_product_report(
                &balanced,
                &PriceMovement::new(ratio).unwrap(),
                &FeeRecord::new(dec!(0), dec!(30)).unwrap(),
            )
            .unwrap();
            let closed =
                crate::math::constant_product::il_fraction(ratio).unwrap() * dec!(100);
            assert!(
                (report.il_percentage - closed).abs() < dec!(0.000001),
                "ratio {ratio}: {} vs {}",
                report.il_percentage,
                closed
            );
        }
    }

    #[test]
    fn test_no_move_no_loss_asymmetric_amounts() {
        let uneven = Position::new(dec!(3), dec!(12), dec!(4), dec!(1)).unwrap();
        let report = constant_product_report(
            &uneven,
            &PriceMovement::new(dec!(1)).unwrap(),
            &FeeRecord::new(dec!(0), dec!(7)).unwrap(),
        )
        .unwrap();
        assert_eq!(report.il_usd, Decimal::ZERO);
        assert_eq!(report.il_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_il_never_positive_for_balanced_deposit() {
        // constant-product IL is never positive when the deposit enters at
        // the pool price (equal USD value per side)
        let balanced = Position::new(dec!(3), dec!(12), dec!(4), dec!(1)).unwrap();
        for ratio in [dec!(0.1), dec!(0.9), dec!(1.1), dec!(3), dec!(20)] {
            let report = constant_product_report(
                &balanced,
                &PriceMovement::new(ratio).unwrap(),
                &FeeRecord::new(dec!(0), dec!(1)).unwrap(),
            )
            .unwrap();
            assert!(report.il_percentage <= Decimal::ZERO);
        }
    }

    #[test]
    fn test_fees_added_back_into_current_value() {
        let without = constant_product_report(
            &position(),
            &PriceMovement::new(dec!(1.5)).unwrap(),
            &FeeRecord::new(dec!(0.000001), dec!(30)).unwrap(),
        )
        .unwrap();
        let with = constant_product_report(
            &position(),
            &PriceMovement::new(dec!(1.5)).unwrap(),
            &FeeRecord::new(dec!(100), dec!(30)).unwrap(),
        )
        .unwrap();
        // fees shift current value, never the IL figures
        assert!((with.current_value_usd - without.current_value_usd - dec!(100)).abs() < dec!(0.001));
        assert_eq!(with.il_usd, without.il_usd);
    }

    #[test]
    fn test_pool_il_balanced_uses_relative_ratio() {
        let ctx = PoolContext::new(PoolKind::UniswapV2, dec!(1000000), dec!(100000));
        // token0 +50%, token1 flat: relative ratio 1/1.5
        let il = pool_il_percent(&ctx, &[dec!(1.5), dec!(1)]).unwrap();
        let closed =
            crate::math::constant_product::il_fraction(dec!(1) / dec!(1.5)).unwrap() * dec!(100);
        assert!((il - closed).abs() < dec!(0.000001));
    }

    #[test]
    fn test_pool_il_weighted_pool() {
        let ctx = PoolContext::new(PoolKind::BalancerWeighted, dec!(1000000), dec!(100000))
            .with_weights(vec![dec!(80), dec!(20)]);
        let il = pool_il_percent(&ctx, &[dec!(2), dec!(1)]).unwrap();
        assert!(il < Decimal::ZERO);
    }

    #[test]
    fn test_pool_il_stable_refused_strictly() {
        let ctx = PoolContext::new(PoolKind::CurveStable, dec!(1000000), dec!(100000));
        let err = pool_il_percent(&ctx, &[dec!(1.01), dec!(1)]).unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedPool(_)));
    }

    #[test]
    fn test_pool_il_stable_approximation_carries_note() {
        let ctx = PoolContext::new(PoolKind::CurveStable, dec!(1000000), dec!(100000));
        let (il, note) =
            pool_il_percent_or_approximation(&ctx, &[dec!(1.01), dec!(1)]).unwrap();
        assert!(note.is_some());
        assert!(il <= Decimal::ZERO);
    }

    #[test]
    fn test_scenarios_cover_canned_moves() {
        let rows = scenario_estimates(&[dec!(50), dec!(50)]).unwrap();
        assert_eq!(rows.len(), 9);
        // 2x move on a 50/50 pool: the classic -5.72%
        let two_x = rows.iter().find(|s| s.label == "2x price increase").unwrap();
        assert!((two_x.il_percent - dec!(-5.719)).abs() < dec!(0.01));
        // 2x up and 2x down land on the same IL
        let two_x_down = rows.iter().find(|s| s.label == "2x price decrease").unwrap();
        assert!((two_x.il_percent - two_x_down.il_percent).abs() < dec!(0.000001));
    }
}
