//! Display-currency conversion and number formatting.

use super::state::{DisplayCurrency, TradingState};

/// Convert a primary-unit amount into the state's display currency.
pub fn to_display(amount: f64, state: &TradingState) -> f64 {
    match state.display_currency {
        DisplayCurrency::Primary => amount,
        DisplayCurrency::Secondary => amount * state.fx_rate,
    }
}

/// Convert an amount entered in the display currency back to the primary unit.
pub fn from_display(amount: f64, state: &TradingState) -> f64 {
    match state.display_currency {
        DisplayCurrency::Primary => amount,
        DisplayCurrency::Secondary => amount / state.fx_rate,
    }
}

pub fn currency_prefix(currency: DisplayCurrency) -> &'static str {
    match currency {
        DisplayCurrency::Primary => "$",
        DisplayCurrency::Secondary => "CA$",
    }
}

/// Fixed precision with `,` thousands separators, e.g. `1,234.50`.
pub fn format_number(value: f64, digits: usize) -> String {
    let raw = format!("{:.*}", digits, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && raw.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Two-decimal money with the currency prefix, e.g. `$1,234.50` or `-CA$12.00`.
pub fn format_money(value: f64, currency: DisplayCurrency) -> String {
    let body = format_number(value, 2);
    match body.strip_prefix('-') {
        Some(abs) => format!("-{}{}", currency_prefix(currency), abs),
        None => format!("{}{}", currency_prefix(currency), body),
    }
}

/// Convert and format a primary-unit amount for display.
pub fn display_money(amount: f64, state: &TradingState) -> String {
    format_money(to_display(amount, state), state.display_currency)
}
