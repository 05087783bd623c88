//! Savings goal timelines: plain saving vs. investing the monthly balance.
//!
//! Both timelines are truncated to whole years and months. Degenerate
//! inputs (non-positive balance, a rate that does not compound, a log of a
//! non-positive number) produce a zero timeline instead of an error, so a
//! `(0, 0)` result means "not computable" as often as "already reached".
//! Use [`assess`] when the difference matters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Nominal annual return assumed for the invested scenario (9.9%)
pub const DEFAULT_ANNUAL_RATE: f64 = 0.099;

/// A duration in whole years and remaining whole months
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Timeline {
    pub years: u32,
    pub months: u32,
}

impl Timeline {
    pub const ZERO: Timeline = Timeline { years: 0, months: 0 };

    /// Split a fractional month count into truncated years and months.
    ///
    /// Negative or non-finite counts map to `ZERO`. Horizons past
    /// `u32::MAX` years are clamped to `u32::MAX` years.
    pub fn from_months(total_months: f64) -> Self {
        if !total_months.is_finite() || total_months <= 0.0 {
            return Self::ZERO;
        }
        let years = (total_months / 12.0).floor().min(f64::from(u32::MAX));
        Self {
            years: years as u32,
            months: (total_months % 12.0).floor() as u32,
        }
    }

    pub fn total_months(&self) -> u64 {
        u64::from(self.years) * 12 + u64::from(self.months)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} years and {} months", self.years, self.months)
    }
}

/// The two competing timelines for one savings goal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GoalProjection {
    pub savings_goal: f64,
    pub net_balance: f64,
    pub annual_rate: f64,
    /// Saving the balance every month with no growth
    pub simple: Timeline,
    /// Investing the balance every month at `annual_rate`
    pub invested: Timeline,
}

/// Monthly compounding rate equivalent to a nominal annual rate.
pub fn effective_monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Months needed to reach `savings_goal` saving `net_balance` per month.
pub fn simple_timeline(savings_goal: f64, net_balance: f64) -> Timeline {
    if net_balance <= 0.0 {
        return Timeline::ZERO;
    }
    Timeline::from_months(savings_goal / net_balance)
}

/// Months needed to reach `savings_goal` contributing `net_balance` at the
/// end of each month, compounding at `annual_rate`.
///
/// Inverts the annuity future value `goal = pmt * ((1+m)^n - 1) / m`:
/// `n = ln(goal * m / pmt + 1) / ln(1 + m)`.
pub fn invested_timeline(savings_goal: f64, net_balance: f64, annual_rate: f64) -> Timeline {
    let m = effective_monthly_rate(annual_rate);
    if m == 0.0 || m <= -1.0 || !m.is_finite() || net_balance <= 0.0 {
        return Timeline::ZERO;
    }

    let log_arg = savings_goal * m / net_balance + 1.0;
    if log_arg <= 0.0 {
        return Timeline::ZERO;
    }

    let n = log_arg.ln() / (1.0 + m).ln();
    Timeline::from_months(n)
}

/// Project a goal at the default 9.9% annual return.
pub fn project(savings_goal: f64, net_balance: f64) -> GoalProjection {
    project_at_rate(savings_goal, net_balance, DEFAULT_ANNUAL_RATE)
}

/// Project a goal at an arbitrary nominal annual return.
///
/// Never fails; see the module docs for what a zero timeline means.
pub fn project_at_rate(savings_goal: f64, net_balance: f64, annual_rate: f64) -> GoalProjection {
    let simple = simple_timeline(savings_goal, net_balance);
    let invested = invested_timeline(savings_goal, net_balance, annual_rate);

    tracing::debug!(
        savings_goal,
        net_balance,
        annual_rate,
        simple_months = simple.total_months(),
        invested_months = invested.total_months(),
        "goal projected"
    );

    GoalProjection {
        savings_goal,
        net_balance,
        annual_rate,
        simple,
        invested,
    }
}

/// Unambiguous reading of a projection request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outlook {
    /// The balance (or rate) does not allow a projection
    Unavailable,
    /// Nothing left to save
    Immediate,
    Reachable(GoalProjection),
}

/// Like [`project_at_rate`], but separates "cannot compute" from "no time needed".
pub fn assess(savings_goal: f64, net_balance: f64, annual_rate: f64) -> Outlook {
    if !net_balance.is_finite() || net_balance <= 0.0 || !savings_goal.is_finite() {
        return Outlook::Unavailable;
    }
    if savings_goal <= 0.0 {
        return Outlook::Immediate;
    }
    let m = effective_monthly_rate(annual_rate);
    if m == 0.0 || m <= -1.0 || !m.is_finite() {
        return Outlook::Unavailable;
    }
    Outlook::Reachable(project_at_rate(savings_goal, net_balance, annual_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_monthly_rate() {
        let m = effective_monthly_rate(DEFAULT_ANNUAL_RATE);
        assert!((m - 0.0078977).abs() < 1e-6, "got {m}");
        // 1.099^(1/12) - 1 = 0.00789775; the 0.0078964 sometimes quoted is an approximation
        // Twelve months at m compound back to the annual rate
        assert!(((1.0 + m).powi(12) - 1.099).abs() < 1e-12);
    }

    #[test]
    fn test_twenty_thousand_goal() {
        let p = project(20_000.0, 1230.0);
        assert_eq!(p.simple, Timeline { years: 1, months: 4 });
        assert_eq!(p.invested, Timeline { years: 1, months: 3 });
        assert!(p.invested.total_months() <= p.simple.total_months());
    }

    #[test]
    fn test_long_horizon_goal() {
        let p = project(100_000.0, 500.0);
        assert_eq!(p.simple, Timeline { years: 16, months: 8 });
        assert_eq!(p.invested, Timeline { years: 10, months: 0 });
    }

    #[test]
    fn test_zero_goal_is_zero_timeline() {
        let p = project(0.0, 1230.0);
        assert!(p.simple.is_zero());
        assert!(p.invested.is_zero());
    }

    #[test]
    fn test_non_positive_balance_is_zero_timeline() {
        for net in [0.0, -1.0, -2500.0] {
            let p = project(20_000.0, net);
            assert_eq!(p.simple, Timeline::ZERO);
            assert_eq!(p.invested, Timeline::ZERO);
        }
    }

    #[test]
    fn test_zero_rate_is_degenerate() {
        assert_eq!(invested_timeline(20_000.0, 1230.0, 0.0), Timeline::ZERO);
    }

    #[test]
    fn test_rate_at_or_below_minus_one_is_degenerate() {
        assert_eq!(invested_timeline(20_000.0, 1230.0, -1.0), Timeline::ZERO);
        assert_eq!(invested_timeline(20_000.0, 1230.0, -3.0), Timeline::ZERO);
    }

    #[test]
    fn test_log_argument_guard() {
        // goal * m / net <= -1 only happens with a negative goal
        assert_eq!(invested_timeline(-1_000_000.0, 10.0, 0.099), Timeline::ZERO);
    }

    #[test]
    fn test_from_months_truncates() {
        assert_eq!(Timeline::from_months(16.26), Timeline { years: 1, months: 4 });
        assert_eq!(Timeline::from_months(11.999), Timeline { years: 0, months: 11 });
        assert_eq!(Timeline::from_months(24.0), Timeline { years: 2, months: 0 });
        assert_eq!(Timeline::from_months(f64::INFINITY), Timeline::ZERO);
        assert_eq!(Timeline::from_months(-3.0), Timeline::ZERO);
    }

    #[test]
    fn test_huge_horizon_does_not_overflow() {
        let p = project(5_000_000_000.0, 1.0);
        assert_eq!(p.simple.years, 416_666_666);
        assert_eq!(p.simple.months, 8);
        assert_eq!(p.simple.total_months(), 5_000_000_000);
        assert!(p.invested.total_months() < p.simple.total_months());

        let t = Timeline::from_months(1e20);
        assert_eq!(t.years, u32::MAX);
        assert!(t.months < 12);
        assert_eq!(t.total_months(), u64::from(u32::MAX) * 12 + u64::from(t.months));
    }

    #[test]
    fn test_timeline_display() {
        let t = Timeline { years: 1, months: 4 };
        assert_eq!(t.to_string(), "1 years and 4 months");
    }

    #[test]
    fn test_investing_never_slower() {
        for goal in [500.0, 2_500.0, 20_000.0, 75_000.0, 1_000_000.0] {
            for net in [50.0, 300.0, 1230.0, 4000.0] {
                let p = project(goal, net);
                assert!(
                    p.invested.total_months() <= p.simple.total_months(),
                    "goal={goal} net={net}: {:?} vs {:?}",
                    p.invested,
                    p.simple
                );
            }
        }
    }

    #[test]
    fn test_assess_separates_sentinels() {
        assert_eq!(assess(20_000.0, 0.0, DEFAULT_ANNUAL_RATE), Outlook::Unavailable);
        assert_eq!(assess(20_000.0, 1230.0, 0.0), Outlook::Unavailable);
        assert_eq!(assess(0.0, 1230.0, DEFAULT_ANNUAL_RATE), Outlook::Immediate);
        match assess(20_000.0, 1230.0, DEFAULT_ANNUAL_RATE) {
            Outlook::Reachable(p) => assert_eq!(p.simple, Timeline { years: 1, months: 4 }),
            other => panic!("expected reachable, got {other:?}"),
        }
    }
}
