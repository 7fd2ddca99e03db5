use rust_decimal::Decimal;
use serde::Serialize;

/// Position health label. Serializes as the human-readable sentence the
/// service has always returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    #[serde(rename = "Consider exiting - IL exceeds fee earnings")]
    ConsiderExiting,
    #[serde(rename = "Strong position - fees outpace IL")]
    StrongPosition,
    #[serde(rename = "Profitable position - fees covering IL")]
    ProfitablePosition,
    #[serde(rename = "High IL detected - evaluate exit strategy")]
    HighIl,
    #[serde(rename = "Monitor position")]
    Monitor,
}

impl Recommendation {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConsiderExiting => "Consider exiting - IL exceeds fee earnings",
            Self::StrongPosition => "Strong position - fees outpace IL",
            Self::ProfitablePosition => "Profitable position - fees covering IL",
            Self::HighIl => "High IL detected - evaluate exit strategy",
            Self::Monitor => "Monitor position",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a position from its IL and APR figures.
///
/// The rules overlap, so evaluation order is part of the contract: first
/// match wins, top to bottom. Thresholds are fixed, not configurable.
#[must_use]
pub fn classify(il_percentage: Decimal, fee_apr: Decimal, net_apr: Decimal) -> Recommendation {
    let exit_threshold = Decimal::from(-5);
    let strong_threshold = Decimal::from(10);
    let high_il_threshold = Decimal::from(-10);

    if il_percentage < exit_threshold && fee_apr < il_percentage.abs() {
        Recommendation::ConsiderExiting
    } else if net_apr > strong_threshold {
        Recommendation::StrongPosition
    } else if net_apr > Decimal::ZERO {
        Recommendation::ProfitablePosition
    } else if il_percentage < high_il_threshold {
        Recommendation::HighIl
    } else {
        Recommendation::Monitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rule_order_exit_wins_over_high_il() {
        // il = -6 satisfies both rule 1 (fee_apr 3 < 6) and would satisfy
        // nothing else above rule 4; rule 1 must win.
        let r = classify(dec!(-6), dec!(3), dec!(-70));
        assert_eq!(r, Recommendation::ConsiderExiting);
    }

    #[test]
    fn test_deep_loss_with_no_fee_cover() {
        let r = classify(dec!(-12), dec!(5), dec!(-140));
        assert_eq!(r, Recommendation::ConsiderExiting);
    }

    #[test]
    fn test_strong_position() {
        let r = classify(dec!(-2), dec!(40), dec!(15.5));
        assert_eq!(r, Recommendation::StrongPosition);
    }

    #[test]
    fn test_profitable_position() {
        let r = classify(dec!(-1), dec!(14), dec!(2));
        assert_eq!(r, Recommendation::ProfitablePosition);
    }

    #[test]
    fn test_high_il_when_fees_large_but_net_negative() {
        // rule 1 misses (fee_apr 20 > |il| 12), net is negative, rule 4 fires
        let r = classify(dec!(-12), dec!(20), dec!(-3));
        assert_eq!(r, Recommendation::HighIl);
    }

    #[test]
    fn test_default_monitor() {
        let r = classify(dec!(-1), dec!(0.5), dec!(-0.2));
        assert_eq!(r, Recommendation::Monitor);
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(
            Recommendation::ConsiderExiting.label(),
            "Consider exiting - IL exceeds fee earnings"
        );
        assert_eq!(Recommendation::Monitor.label(), "Monitor position");
    }
}
