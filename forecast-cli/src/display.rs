//! Terminal and JSON rendering of budget results.

use anyhow::Result;
use forecast_core::format::{percent, usd};
use forecast_core::{assess, BudgetInputs, BudgetSummary, GoalProjection, Outlook};
use serde::Serialize;

pub const OVERSPENT_NOTICE: &str = "Your expenses are higher than your income. \
To project savings, you first need a positive net monthly balance.";

pub fn print_summary(inputs: &BudgetInputs, summary: &BudgetSummary) {
    println!("# Budget summary\n");
    println!("Income");
    for (label, amount) in inputs.income_items() {
        println!("  {:<20} {:>14}", label, usd(amount));
    }
    println!("Expenses");
    for (label, amount) in inputs.expense_items() {
        println!("  {:<20} {:>14}", label, usd(amount));
    }
    println!();
    println!("  {:<20} {:>14}", "Total income", usd(summary.total_income));
    println!("  {:<20} {:>14}", "Total expenses", usd(summary.total_expenses));
    println!("  {:<20} {:>14}", "Net monthly savings", usd(summary.net_balance));
}

pub fn print_projection(p: &GoalProjection) {
    println!("\n# Timelines to reach {}\n", usd(p.savings_goal));
    println!("Just saving:     {}", p.simple);
    println!(
        "By investing:    {} (at {} avg. return)",
        p.invested,
        percent(p.annual_rate)
    );
    // A goal under one month of saving also truncates to (0, 0)
    if assess(p.savings_goal, p.net_balance, p.annual_rate) == Outlook::Unavailable {
        println!("(the invested timeline could not be computed for these inputs)");
    }
}

pub fn print_notice(msg: &str) {
    eprintln!("! {msg}");
}

#[derive(Serialize)]
struct Report<'a> {
    inputs: &'a BudgetInputs,
    summary: &'a BudgetSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    projection: Option<&'a GoalProjection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    advice: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<&'a str>,
}

pub fn print_json(
    inputs: &BudgetInputs,
    summary: &BudgetSummary,
    projection: Option<&GoalProjection>,
    advice: Option<&str>,
    notice: Option<&str>,
) -> Result<()> {
    let report = Report {
        inputs,
        summary,
        projection,
        advice,
        notice,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
