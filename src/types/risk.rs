//! Risk badges, risk factors and risk levels shown next to a verdict

use crate::types::transaction::TransactionInput;
use serde::{Deserialize, Serialize};

/// Risk level classification of the fraud probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Determine risk level from P(fraud) and thresholds
    pub fn from_score(score: f64, thresholds: &RiskLevelThresholds) -> Self {
        if score >= thresholds.critical {
            RiskLevel::Critical
        } else if score >= thresholds.high {
            RiskLevel::High
        } else if score >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Lower bounds of each risk level above `Low`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLevelThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            medium: 0.5,
            high: 0.7,
            critical: 0.9,
        }
    }
}

/// Amount badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountBand {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Time-of-day badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBand {
    Normal,
    LateNight,
    EarlyMorning,
}

/// Cardholder age badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    YoungAdult,
    Adult,
    MiddleAge,
    Senior,
}

/// Day-type badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Weekday,
    Weekend,
}

/// Observations that push a transaction towards review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    HighAmount,
    UnusualHour,
    Weekend,
    HighRiskCategory,
}

impl RiskFactor {
    pub fn describe(self) -> &'static str {
        match self {
            RiskFactor::HighAmount => "High-value transaction",
            RiskFactor::UnusualHour => "Unusual transaction hour (late night / early morning)",
            RiskFactor::Weekend => "Weekend transaction",
            RiskFactor::HighRiskCategory => "Category with a higher fraud rate",
        }
    }
}

/// Thresholds behind the badges and risk factors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeThresholds {
    /// Amounts below this are `Low`
    pub amount_medium: f64,
    /// Amounts below this are `Medium`
    pub amount_high: f64,
    /// Amounts below this are `High`, otherwise `VeryHigh`
    pub amount_very_high: f64,
    /// Amounts above this raise `RiskFactor::HighAmount`
    pub high_amount_factor: f64,
    /// Categories that raise `RiskFactor::HighRiskCategory`
    pub high_risk_categories: Vec<String>,
}

impl Default for BadgeThresholds {
    fn default() -> Self {
        Self {
            amount_medium: 50.0,
            amount_high: 200.0,
            amount_very_high: 500.0,
            high_amount_factor: 500.0,
            high_risk_categories: vec![
                "gas_transport".to_string(),
                "misc_net".to_string(),
                "shopping_net".to_string(),
            ],
        }
    }
}

/// Badges and factors for one transaction input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub amount: AmountBand,
    pub time: TimeBand,
    pub age: AgeBand,
    pub day: DayType,
    pub factors: Vec<RiskFactor>,
}

impl RiskProfile {
    pub fn assess(tx: &TransactionInput, thresholds: &BadgeThresholds) -> Self {
        let amount = if tx.amount < thresholds.amount_medium {
            AmountBand::Low
        } else if tx.amount < thresholds.amount_high {
            AmountBand::Medium
        } else if tx.amount < thresholds.amount_very_high {
            AmountBand::High
        } else {
            AmountBand::VeryHigh
        };

        let time = if (6..=22).contains(&tx.hour) {
            TimeBand::Normal
        } else if tx.hour > 22 || tx.hour < 2 {
            TimeBand::LateNight
        } else {
            TimeBand::EarlyMorning
        };

        let age = match tx.age {
            0..=24 => AgeBand::YoungAdult,
            25..=39 => AgeBand::Adult,
            40..=59 => AgeBand::MiddleAge,
            _ => AgeBand::Senior,
        };

        let day = if tx.is_weekend {
            DayType::Weekend
        } else {
            DayType::Weekday
        };

        let mut factors = Vec::new();
        if tx.amount > thresholds.high_amount_factor {
            factors.push(RiskFactor::HighAmount);
        }
        if tx.hour < 6 || tx.hour > 22 {
            factors.push(RiskFactor::UnusualHour);
        }
        if tx.is_weekend {
            factors.push(RiskFactor::Weekend);
        }
        if thresholds
            .high_risk_categories
            .iter()
            .any(|c| c == &tx.category)
        {
            factors.push(RiskFactor::HighRiskCategory);
        }

        Self {
            amount,
            time,
            age,
            day,
            factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_from_score() {
        let thresholds = RiskLevelThresholds::default();

        assert_eq!(RiskLevel::from_score(0.1, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.5, &thresholds), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.75, &thresholds), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.95, &thresholds), RiskLevel::Critical);
    }

    #[test]
    fn test_low_is_everything_below_medium() {
        let thresholds: RiskLevelThresholds = serde_json::from_str(r#"{"high": 0.6}"#).unwrap();

        assert_eq!(thresholds.medium, 0.5);
        assert_eq!(RiskLevel::from_score(0.0, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.49, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.6, &thresholds), RiskLevel::High);
    }

    #[test]
    fn test_amount_bands() {
        let thresholds = BadgeThresholds::default();
        let band = |amount: f64| {
            RiskProfile::assess(&TransactionInput::new("home", amount, "F", "OH"), &thresholds).amount
        };

        assert_eq!(band(49.99), AmountBand::Low);
        assert_eq!(band(50.0), AmountBand::Medium);
        assert_eq!(band(199.0), AmountBand::Medium);
        assert_eq!(band(200.0), AmountBand::High);
        assert_eq!(band(500.0), AmountBand::VeryHigh);
    }

    #[test]
    fn test_time_bands() {
        let thresholds = BadgeThresholds::default();
        let band = |hour: u32| {
            RiskProfile::assess(
                &TransactionInput::new("home", 10.0, "F", "OH").with_hour(hour),
                &thresholds,
            )
            .time
        };

        assert_eq!(band(6), TimeBand::Normal);
        assert_eq!(band(22), TimeBand::Normal);
        assert_eq!(band(23), TimeBand::LateNight);
        assert_eq!(band(0), TimeBand::LateNight);
        assert_eq!(band(1), TimeBand::LateNight);
        assert_eq!(band(2), TimeBand::EarlyMorning);
        assert_eq!(band(5), TimeBand::EarlyMorning);
    }

    #[test]
    fn test_age_bands() {
        let thresholds = BadgeThresholds::default();
        let band = |age: u32| {
            RiskProfile::assess(
                &TransactionInput::new("home", 10.0, "F", "OH").with_age(age),
                &thresholds,
            )
            .age
        };

        assert_eq!(band(18), AgeBand::YoungAdult);
        assert_eq!(band(25), AgeBand::Adult);
        assert_eq!(band(40), AgeBand::MiddleAge);
        assert_eq!(band(60), AgeBand::Senior);
    }

    #[test]
    fn test_risk_factors() {
        let thresholds = BadgeThresholds::default();

        let quiet = RiskProfile::assess(&TransactionInput::new("grocery_pos", 50.0, "F", "CA"), &thresholds);
        assert!(quiet.factors.is_empty());
        assert_eq!(quiet.day, DayType::Weekday);

        let loud = RiskProfile::assess(
            &TransactionInput::new("shopping_net", 900.0, "M", "NY")
                .with_hour(3)
                .on_weekend(true),
            &thresholds,
        );
        assert_eq!(
            loud.factors,
            vec![
                RiskFactor::HighAmount,
                RiskFactor::UnusualHour,
                RiskFactor::Weekend,
                RiskFactor::HighRiskCategory
            ]
        );
        assert_eq!(loud.day, DayType::Weekend);
    }
}
