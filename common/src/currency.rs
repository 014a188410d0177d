/// Display unit for budgets and bids. Amounts are plain numbers in this unit;
/// nothing is ever settled on-chain.
pub const DEFAULT_CURRENCY: &str = "USDC";

/// Format an amount for display, e.g. `50 USDC` or `12.5 USDC`.
pub fn format_amount(amount: f64, currency: &str) -> String {
    format!("{amount} {currency}")
}

/// Parse user input into a finite number. Surrounding whitespace is ignored.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}
