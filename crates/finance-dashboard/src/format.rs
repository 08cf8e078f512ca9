//! Number, currency, and time formatting for the quote card and chat

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// Direction of the last price move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    /// Classify a change; a missing change counts as flat
    pub fn from_change(change: Option<f64>) -> Self {
        let change = change.unwrap_or(0.0);
        if change > 0.0 {
            Self::Up
        } else if change < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }

    /// Flat moves are shown with a `+` sign
    pub fn is_positive(self) -> bool {
        !matches!(self, Self::Down)
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Down => "▼",
            Self::Flat => "─",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Up => "bullish",
            Self::Down => "bearish",
            Self::Flat => "neutral",
        }
    }
}

/// Symbol for common ISO-4217 codes, as en-US locales print them
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "INR" => "₹",
        "KRW" => "₩",
        "CNY" => "CN¥",
        "CAD" => "CA$",
        "AUD" => "A$",
        "HKD" => "HK$",
        "NZD" => "NZ$",
        "MXN" => "MX$",
        "BRL" => "R$",
        _ => return None,
    };
    Some(symbol)
}

/// Format `value` as money in `currency` with exactly two decimals
///
/// `150.25, "USD"` → `$150.25`; `-1234.5, "EUR"` → `-€1,234.50`;
/// unknown codes are prefixed: `12, "CHF"` → `CHF 12.00`.
pub fn format_price(value: f64, currency: &str) -> String {
    let code = currency.trim().to_uppercase();
    let amount = group_thousands(&format!("{:.2}", value.abs()));
    let sign = if value < 0.0 { "-" } else { "" };

    match currency_symbol(&code) {
        Some(symbol) => format!("{sign}{symbol}{amount}"),
        None => format!("{sign}{code} {amount}"),
    }
}

/// Signed absolute change with two decimals, e.g. `+2.10`
pub fn format_change(value: f64, trend: Trend) -> String {
    format!("{}{:.2}", sign(trend), value.abs())
}

/// Signed absolute percentage with two decimals, e.g. `+1.42%`
///
/// The sign follows the price change, not the percentage itself.
pub fn format_percent(value: f64, trend: Trend) -> String {
    format!("{}{:.2}%", sign(trend), value.abs())
}

fn sign(trend: Trend) -> &'static str {
    if trend.is_positive() { "+" } else { "-" }
}

fn group_thousands(fixed: &str) -> String {
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed, ""));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction.is_empty() {
        grouped
    } else {
        format!("{grouped}.{fraction}")
    }
}

/// Render a backend timestamp for "Last updated"
///
/// RFC 3339 and offset-less ISO-8601 (read as UTC) are shown in UTC; anything
/// else is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S UTC").to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    }
    raw.to_string()
}

/// Local wall-clock time of a chat message
pub fn format_clock(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}
