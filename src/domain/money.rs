use thiserror::Error;

/// Amounts are integer counts of minor currency units (1 unit = 100 minor units),
/// so 10_000_00 is "10000.00".
pub type Money = i64;

/// Sums across accounts or payments, wide enough that adding any number of
/// `Money` values cannot overflow.
pub type MoneyTotal = i128;

const MINOR_PER_UNIT: Money = 100;

/// Format minor units (a single amount or a total) as a decimal string.
/// Example: 1_000_00 -> "1000.00", -5 -> "-0.05"
pub fn format_money(amount: impl Into<MoneyTotal>) -> String {
    let amount: MoneyTotal = amount.into();
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let per_unit = MINOR_PER_UNIT as u128;
    format!("{}{}.{:02}", sign, abs / per_unit, abs % per_unit)
}

/// Parse a decimal string in major units into minor units.
/// Example: "1000" -> 1_000_00, "12.5" -> 12_50, ".05" -> 5
///
/// More than two fractional digits is rejected rather than rounded.
pub fn parse_money(input: &str) -> Result<Money, ParseMoneyError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, fraction_str) = digits.split_once('.').unwrap_or((digits, ""));
    if units_str.is_empty() && fraction_str.is_empty() {
        return Err(ParseMoneyError::InvalidFormat(input.to_string()));
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !fraction_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseMoneyError::InvalidFormat(input.to_string()));
    }

    let units: Money = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseMoneyError::OutOfRange(input.to_string()))?
    };

    let fraction: Money = match fraction_str.len() {
        0 => 0,
        1 => fraction_str.parse::<Money>().unwrap_or(0) * 10,
        2 => fraction_str.parse::<Money>().unwrap_or(0),
        _ => return Err(ParseMoneyError::TooPrecise(input.to_string())),
    };

    let amount = units
        .checked_mul(MINOR_PER_UNIT)
        .and_then(|minor| minor.checked_add(fraction))
        .ok_or_else(|| ParseMoneyError::OutOfRange(input.to_string()))?;

    Ok(if negative { -amount } else { amount })
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseMoneyError {
    #[error("invalid money format: '{0}'")]
    InvalidFormat(String),

    #[error("at most two decimal places are allowed: '{0}'")]
    TooPrecise(String),

    #[error("amount out of range: '{0}'")]
    OutOfRange(String),
}
