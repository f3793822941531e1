use std::fmt;

/// Balances are plain non-negative decimal amounts in the account's currency.
pub type Amount = f64;

/// Format an amount as a human-readable string with two decimals.
/// Example: 50.0 -> "50.00", 12.345 -> "12.35"
pub fn format_amount(amount: Amount) -> String {
    format!("{:.2}", amount)
}

/// Parse a balance typed by the user.
/// Accepts "50", "50.25" and ".5". Rejects negative, non-numeric and non-finite input.
pub fn parse_balance(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Missing);
    }

    let value: f64 = input.parse().map_err(|_| ParseAmountError::InvalidFormat)?;
    validate_balance(value)?;
    Ok(value)
}

/// Check that a balance is usable: finite and zero or positive.
pub fn validate_balance(value: Amount) -> Result<(), ParseAmountError> {
    if !value.is_finite() {
        return Err(ParseAmountError::InvalidFormat);
    }
    if value < 0.0 {
        return Err(ParseAmountError::Negative);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Missing,
    InvalidFormat,
    Negative,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Missing => write!(f, "balance is required"),
            ParseAmountError::InvalidFormat => write!(f, "invalid balance format"),
            ParseAmountError::Negative => write!(f, "balance must be zero or positive"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
