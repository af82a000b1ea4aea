use std::fmt;

/// Prices are kept as integer cents, so S/ 25.90 = 2590 cents.
pub type Cents = i64;

/// Format cents as a plain decimal string.
/// Example: 2590 -> "25.90", -5 -> "-0.05"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal price into cents.
/// Example: "25.90" -> 2590, "3.5" -> 350, "12" -> 1200.
/// Digits past the second decimal place are truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParsePriceError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, decimals_str) = digits.split_once('.').unwrap_or((digits, ""));
    if units_str.is_empty() && decimals_str.is_empty() {
        return Err(ParsePriceError::InvalidFormat);
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimals_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParsePriceError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParsePriceError::InvalidFormat)?
    };

    let decimals: i64 = match decimals_str.len() {
        0 => 0,
        1 => decimals_str.parse::<i64>().map_err(|_| ParsePriceError::InvalidFormat)? * 10,
        _ => decimals_str[..2]
            .parse()
            .map_err(|_| ParsePriceError::InvalidFormat)?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimals))
        .ok_or(ParsePriceError::InvalidFormat)?;
    Ok(if negative { -cents } else { cents })
}

/// Coerce raw price text the way catalog input is accepted:
/// anything that doesn't parse counts as zero.
pub fn coerce_price(input: &str) -> Cents {
    parse_cents(input).unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsePriceError {
    InvalidFormat,
}

impl fmt::Display for ParsePriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsePriceError::InvalidFormat => write!(f, "invalid price format"),
        }
    }
}

impl std::error::Error for ParsePriceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(2590), "25.90");
        assert_eq!(format_cents(100), "1.00");
        assert_eq!(format_cents(7), "0.07");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5), "-0.05");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("25.90"), Ok(2590));
        assert_eq!(parse_cents("12"), Ok(1200));
        assert_eq!(parse_cents("3.5"), Ok(350));
        assert_eq!(parse_cents(".75"), Ok(75));
        assert_eq!(parse_cents(" 8.00 "), Ok(800));
        assert_eq!(parse_cents("-1.25"), Ok(-125));
        assert_eq!(parse_cents("4.999"), Ok(499));
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("").is_err());
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("1.2.3").is_err());
        assert!(parse_cents("1e3").is_err());
    }

    #[test]
    fn test_coerce_price_defaults_to_zero() {
        assert_eq!(coerce_price("S/ 10"), 0);
        assert_eq!(coerce_price(""), 0);
        assert_eq!(coerce_price("10.50"), 1050);
    }
}
