//! Token codec
//!
//! Chain tables and the token contract speak `"12.3456 HEL"` strings. This
//! module parses them into [`Token`] and renders the two formats the rest of
//! the crate needs: a human display form (grouped, up to 4 fraction digits)
//! and the contract form (ungrouped, exactly 4 fraction digits) that actions
//! must submit.

use serde::{Deserialize, Serialize};

/// A token quantity split into amount and symbol.
///
/// `amount` is NaN when the source string was malformed; NaN never satisfies
/// the fuel/price comparisons downstream, so bad input fails closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub amount: f64,
    pub symbol: String,
}

/// Parse an `"amount SYMBOL"` string.
///
/// A missing or unparseable amount yields NaN; a missing symbol yields `""`.
pub fn parse_token(raw: &str) -> Token {
    let mut parts = raw.split_whitespace();
    let amount = parts
        .next()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(f64::NAN);
    let symbol = parts.next().unwrap_or("").to_string();
    Token { amount, symbol }
}

/// Render for display: en-style thousands grouping, at most 4 fraction
/// digits, trailing zeros trimmed.
pub fn format_display(token: &Token) -> String {
    format!("{} {}", group_amount(token.amount), token.symbol)
}

/// Render for contract submission: no grouping, exactly 4 fraction digits.
///
/// This is the precision the game's token contract expects in `quantitys`
/// fields; anything else is rejected on-chain.
pub fn format_contract(token: &Token) -> String {
    format!("{:.4} {}", token.amount, token.symbol)
}

/// Swap a raw chain symbol for its display spelling (`HEL` reads as `He3`).
///
/// Unknown symbols pass through untouched, which also makes the mapping
/// idempotent: display spellings are not themselves keys.
pub fn display_symbol(token: &Token) -> Token {
    let symbol = match token.symbol.as_str() {
        "HEL" => "He3",
        "HTWO" => "H2",
        "MWH" => "MWh",
        "OTWO" => "O2",
        "WATER" => "H2O",
        other => other,
    };
    Token {
        amount: token.amount,
        symbol: symbol.to_string(),
    }
}

fn group_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }
    let fixed = format!("{amount:.4}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed.split_once('.') {
        Some((int_part, frac)) => format!("{}.{frac}", group_thousands(int_part)),
        None => group_thousands(trimmed),
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}
