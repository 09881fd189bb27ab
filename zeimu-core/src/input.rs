//! Normalizing and formatting amounts typed into calculator forms.
//!
//! Users paste figures with full-width digits (`１２３`) and thousands
//! separators; everything is reduced to plain ASCII digits before it
//! reaches a calculator.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::round_half_up;

/// Offset between a full-width digit (U+FF10..=U+FF19) and its ASCII form.
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;

/// Reasons an amount field is rejected before any calculation runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("amount '{0}' is too large")]
    TooLarge(String),
}

impl InputError {
    /// Message shown next to the form field.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Empty | Self::NotPositive => "※金額を正しく入力してください。",
            Self::TooLarge(_) => "※金額が大きすぎます。",
        }
    }
}

/// Converts full-width digits to ASCII and drops every other non-digit.
///
/// # Examples
///
/// ```
/// use zeimu_core::input::normalize_number_string;
///
/// assert_eq!(normalize_number_string("１，０００，０００"), "1000000");
/// assert_eq!(normalize_number_string("¥1,234円"), "1234");
/// ```
pub fn normalize_number_string(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - FULL_WIDTH_OFFSET).unwrap_or(c),
            _ => c,
        })
        .filter(char::is_ascii_digit)
        .collect()
}

/// Parses a user-entered amount into whole yen.
///
/// # Errors
///
/// Returns [`InputError`] when nothing numeric remains after
/// normalization, when the amount is zero, or when it does not fit.
pub fn parse_amount(value: &str) -> Result<u64, InputError> {
    let normalized = normalize_number_string(value);
    if normalized.is_empty() {
        tracing::debug!(input = %value, "rejected empty amount");
        return Err(InputError::Empty);
    }

    let amount: u64 = normalized.parse().map_err(|_| {
        tracing::debug!(input = %value, "rejected oversized amount");
        InputError::TooLarge(normalized.clone())
    })?;

    if amount == 0 {
        return Err(InputError::NotPositive);
    }

    Ok(amount)
}

/// Formats an amount with comma thousands separators.
///
/// ```
/// use zeimu_core::input::format_amount;
///
/// assert_eq!(format_amount(2_310_000), "2,310,000");
/// ```
pub fn format_amount(amount: u64) -> String {
    group_digits(&amount.to_string())
}

/// Formats a yen amount in 万円 with up to three decimals.
///
/// ```
/// use zeimu_core::input::format_man;
///
/// assert_eq!(format_man(12_345_000), "1,234.5万円");
/// ```
pub fn format_man(amount: u64) -> String {
    let man = round_half_up(Decimal::from(amount) / Decimal::from(10_000), 3).normalize();
    let text = man.to_string();

    match text.split_once('.') {
        Some((whole, fraction)) => format!("{}.{}万円", group_digits(whole), fraction),
        None => format!("{}万円", group_digits(&text)),
    }
}

/// Formats a fraction as a percentage with one decimal place.
///
/// ```
/// use rust_decimal_macros::dec;
/// use zeimu_core::input::format_percent;
///
/// assert_eq!(format_percent(dec!(0.231)), "23.1%");
/// ```
pub fn format_percent(rate: Decimal) -> String {
    let percent = round_half_up(rate * Decimal::ONE_HUNDRED, 1);
    format!("{percent:.1}%")
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
