//! Price normalization service
//!
//! Turns locale-formatted marketplace price text into a comparable KRW
//! amount, and formats KRW amounts for display.

use crate::services::rates::ExchangeRateSnapshot;
use crate::types::{Currency, PriceValue};
use regex::Regex;
use std::sync::LazyLock;

/// Substrings removed before looking for a number, applied in this order
const NOISE: [&str; 8] = ["약", "원", "엔", "￥", "USD", "US", "$", "₩"];

static PRICE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\.\d+)?").expect("price token pattern is valid")
});

static DECIMAL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("decimal digit pattern is valid"));

/// Display text for listings without a usable price
pub const NO_PRICE: &str = "가격 정보 없음";

/// Normalize a raw price string into KRW.
///
/// Steps:
/// - strip currency glyphs and markers (`약`, `원`, `엔`, `￥`, `USD`, `US`, `$`, `₩`)
/// - every `,` becomes `.`, so `12,345` reads as `12.345`
/// - the first `\d+(\.\d+)?` token is the amount; later tokens are ignored.
///   Digits from any script count and are read by their decimal value
/// - USD and CNY amounts are multiplied by the snapshot rate
///
/// # Examples
/// ```
/// use pricecmp::services::normalizer::extract_price;
/// use pricecmp::services::rates::ExchangeRateSnapshot;
/// use pricecmp::types::PriceValue;
///
/// let rates = ExchangeRateSnapshot::fallback();
/// assert_eq!(extract_price("1,5", None, &rates), PriceValue::Priced(1.5));
/// assert_eq!(extract_price("가격 문의", None, &rates), PriceValue::Unparseable);
/// ```
pub fn extract_price(
    raw: &str,
    source_currency: Option<Currency>,
    rates: &ExchangeRateSnapshot,
) -> PriceValue {
    let mut cleaned = raw.to_string();
    for noise in NOISE {
        cleaned = cleaned.replace(noise, "");
    }
    let cleaned = cleaned.replace(',', ".");

    let Some(token) = PRICE_TOKEN.find(&cleaned) else {
        return PriceValue::Unparseable;
    };
    let Some(ascii) = to_ascii_number(token.as_str()) else {
        return PriceValue::Unparseable;
    };
    let Ok(amount) = ascii.parse::<f64>() else {
        return PriceValue::Unparseable;
    };

    match source_currency.and_then(|c| rates.rate_for(c)) {
        Some(rate) => PriceValue::from_amount(amount * rate),
        None => PriceValue::from_amount(amount),
    }
}

/// Rewrite a matched token's digits (any script) as ASCII
fn to_ascii_number(token: &str) -> Option<String> {
    token
        .chars()
        .map(|c| if c == '.' { Some('.') } else { ascii_digit(c) })
        .collect()
}

/// ASCII form of a Unicode decimal digit.
///
/// Decimal digits are encoded in runs of whole `0..=9` sets, so the value is
/// the offset from the start of the run, modulo 10.
fn ascii_digit(c: char) -> Option<char> {
    if c.is_ascii_digit() {
        return Some(c);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    char::from_digit((c as u32 - start) % 10, 10)
}

fn is_decimal_digit(c: char) -> bool {
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut [0; 4]))
}

/// Format a KRW price as `약 ₩12,345`, truncating the fraction
pub fn format_krw(price: PriceValue) -> String {
    match price {
        PriceValue::Priced(value) => {
            format!("약 ₩{}", group_thousands(&format!("{:.0}", value.trunc())))
        }
        PriceValue::Unparseable => NO_PRICE.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
