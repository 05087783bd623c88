//! Monthly budget inputs and the summary derived from them

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Monthly income and expense line items, as entered by the user.
///
/// Every field is expected to be non-negative. `summarize` does not check
/// this; call [`BudgetInputs::validate`] at the input boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BudgetInputs {
    /// Primary income, after tax
    pub primary_income: f64,
    pub additional_income: f64,

    /// Rent or mortgage
    pub housing: f64,
    pub utilities: f64,
    pub internet: f64,
    pub phone: f64,
    pub groceries: f64,
    /// Gas, transit
    pub transportation: f64,
    /// Car, health
    pub insurance: f64,
    pub subscriptions: f64,
    /// Dining out and entertainment
    pub dining_out: f64,
    pub other: f64,
}

impl BudgetInputs {
    /// A typical month, used as the starting values of the budget form.
    pub fn sample() -> Self {
        Self {
            primary_income: 4000.0,
            additional_income: 200.0,
            housing: 1500.0,
            utilities: 150.0,
            internet: 60.0,
            phone: 70.0,
            groceries: 400.0,
            transportation: 150.0,
            insurance: 200.0,
            subscriptions: 40.0,
            dining_out: 250.0,
            other: 150.0,
        }
    }

    /// Income fields as `(label, amount)` pairs
    pub fn income_items(&self) -> [(&'static str, f64); 2] {
        [
            ("primary_income", self.primary_income),
            ("additional_income", self.additional_income),
        ]
    }

    /// The ten expense fields as `(label, amount)` pairs
    pub fn expense_items(&self) -> [(&'static str, f64); 10] {
        [
            ("housing", self.housing),
            ("utilities", self.utilities),
            ("internet", self.internet),
            ("phone", self.phone),
            ("groceries", self.groceries),
            ("transportation", self.transportation),
            ("insurance", self.insurance),
            ("subscriptions", self.subscriptions),
            ("dining_out", self.dining_out),
            ("other", self.other),
        ]
    }

    /// Reject the first field that is negative or not a finite number.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.income_items().into_iter().chain(self.expense_items()) {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidInput { field, value });
            }
        }
        Ok(())
    }
}

/// Totals for one month. Recomputed from scratch on every submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BudgetSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    /// Income minus expenses; may be negative
    pub net_balance: f64,
}

impl BudgetSummary {
    /// Goal projections are only defined for a positive monthly balance.
    pub fn can_project(&self) -> bool {
        self.net_balance > 0.0
    }
}

/// Reduce the inputs into income, expense and net totals.
///
/// Total for any real-valued input, negative amounts included. No rounding.
pub fn summarize(inputs: &BudgetInputs) -> BudgetSummary {
    let total_income = inputs.primary_income + inputs.additional_income;
    let total_expenses: f64 = inputs.expense_items().iter().map(|(_, v)| v).sum();
    let net_balance = total_income - total_expenses;

    tracing::debug!(total_income, total_expenses, net_balance, "budget summarized");

    BudgetSummary {
        total_income,
        total_expenses,
        net_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_sample_month() {
        let s = summarize(&BudgetInputs::sample());
        assert_eq!(s.total_income, 4200.0);
        assert_eq!(s.total_expenses, 2970.0);
        assert_eq!(s.net_balance, 1230.0);
        assert!(s.can_project());
    }

    #[test]
    fn test_net_balance_matches_direct_difference() {
        let inputs = BudgetInputs {
            primary_income: 3100.55,
            additional_income: 12.3,
            housing: 999.99,
            groceries: 321.07,
            other: 0.01,
            ..Default::default()
        };
        let s = summarize(&inputs);
        assert_eq!(s.net_balance, s.total_income - s.total_expenses);
    }

    #[test]
    fn test_overspent_month_cannot_project() {
        let inputs = BudgetInputs {
            primary_income: 1000.0,
            housing: 1200.0,
            ..Default::default()
        };
        let s = summarize(&inputs);
        assert_eq!(s.net_balance, -200.0);
        assert!(!s.can_project());
    }

    #[test]
    fn test_summarize_accepts_negative_amounts() {
        let inputs = BudgetInputs {
            primary_income: -50.0,
            phone: -10.0,
            ..Default::default()
        };
        let s = summarize(&inputs);
        assert_eq!(s.total_income, -50.0);
        assert_eq!(s.total_expenses, -10.0);
        assert_eq!(s.net_balance, -40.0);
    }

    #[test]
    fn test_validate_names_offending_field() {
        let mut inputs = BudgetInputs::sample();
        assert!(inputs.validate().is_ok());

        inputs.insurance = -1.0;
        assert_eq!(
            inputs.validate(),
            Err(ForecastError::InvalidInput {
                field: "insurance",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_validate_rejects_nan() {
        let inputs = BudgetInputs {
            additional_income: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            inputs.validate(),
            Err(ForecastError::InvalidInput {
                field: "additional_income",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_json_fills_missing_fields_with_zero() {
        let inputs: BudgetInputs =
            serde_json::from_str(r#"{"primary_income": 2500, "housing": 900}"#).unwrap();
        assert_eq!(inputs.primary_income, 2500.0);
        assert_eq!(inputs.housing, 900.0);
        assert_eq!(inputs.groceries, 0.0);
    }
}
