//! Display helpers shared by the prompt builder and the CLI.

/// Format an amount as dollars with thousands separators and two decimals,
/// e.g. `4200.0` -> `$4,200.00`.
pub fn usd(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${amount}");
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    format!("{sign}${whole}.{:02}", cents % 100)
}

/// Rate as a percentage with one decimal, e.g. `0.099` -> `9.9%`.
pub fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
