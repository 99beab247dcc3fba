//! Formatting and validation rules of the simulated storefront.

use chrono::{DateTime, Datelike, Local, NaiveDate, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub use crate::pages::{format_card_number, format_cvv, format_expiry, MAX_CARD_DIGITS};

const UID_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Cart quantities are clamped to `1..=MAX_QTY`
pub const MAX_QTY: u32 = 99;

fn matches(pattern: &str, text: &str) -> bool {
    regex::Regex::new(pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// `$1,234.50`
#[must_use]
pub fn format_usd(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Luhn checksum over an all-digit string
#[must_use]
pub fn luhn_valid(number: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in number.chars().rev().enumerate() {
        let Some(mut n) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            n *= 2;
            if n > 9 {
                n -= 9;
            }
        }
        sum += n;
    }
    sum % 10 == 0
}

/// Card number rule: 12 to 19 digits passing Luhn
#[must_use]
pub fn card_number_valid(formatted: &str) -> bool {
    let number = digits(formatted);
    (12..=MAX_CARD_DIGITS).contains(&number.len()) && luhn_valid(&number)
}

/// `MM/YY` whose month has not ended before `today`
#[must_use]
pub fn expiry_valid(expiry: &str, today: NaiveDate) -> bool {
    let Ok(re) = regex::Regex::new(r"^(\d{2})\s*/\s*(\d{2})$") else {
        return false;
    };
    let Some(caps) = re.captures(expiry.trim()) else {
        return false;
    };
    let (Ok(month), Ok(year)) = (caps[1].parse::<u32>(), caps[2].parse::<i32>()) else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }
    (2000 + year, month) >= (today.year(), today.month())
}

/// CVV rule: three or four digits
#[must_use]
pub fn cvv_valid(cvv: &str) -> bool {
    matches(r"^\d{3,4}$", cvv)
}

/// Loose email shape check
#[must_use]
pub fn is_email(text: &str) -> bool {
    matches(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", text.trim())
}

/// Lowercase hex SHA-256
#[must_use]
pub fn sha256_hex(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Random id over an unambiguous alphabet
#[must_use]
pub fn uid(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        for byte in Uuid::new_v4().as_bytes() {
            if out.len() == len {
                break;
            }
            out.push(char::from(UID_ALPHABET[usize::from(*byte) % UID_ALPHABET.len()]));
        }
    }
    out
}

/// `GS-YYYYMMDD-XXXXXX`
#[must_use]
pub fn order_id(now: DateTime<Utc>) -> String {
    format!("GS-{}-{}", now.format("%Y%m%d"), uid(6))
}

/// ISO-8601 with milliseconds, UTC
#[must_use]
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `Jan 05, 2026, 03:04 PM` in local time; the raw text when unparsable
#[must_use]
pub fn format_date_time(iso: &str) -> String {
    DateTime::parse_from_rfc3339(iso).map_or_else(
        |_| iso.to_string(),
        |at| {
            at.with_timezone(&Local)
                .format("%b %d, %Y, %I:%M %p")
                .to_string()
        },
    )
}
