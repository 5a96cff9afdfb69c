use std::{fmt, str::FromStr};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// The budget API is inconsistent about amounts: depending on the endpoint
/// it answers with a formatted currency string (`"$1,234.56"`) or a raw
/// number (`12.5`). Both are converted into this type at the API boundary,
/// and nothing past the boundary carries a formatted string.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "$12.34");
/// ```
///
/// Parsing accepts an optional `$`, thousands separators and at most two
/// decimals:
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("$1,234.5".parse::<MoneyCents>().unwrap().cents(), 123_450);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Sums the amounts, failing instead of wrapping on overflow.
    pub fn checked_sum<I>(amounts: I) -> Result<MoneyCents, EngineError>
    where
        I: IntoIterator<Item = MoneyCents>,
    {
        amounts
            .into_iter()
            .try_fold(MoneyCents::ZERO, |acc, amount| acc.checked_add(amount))
            .ok_or_else(|| EngineError::Overflow("sum of amounts too large".to_string()))
    }

    /// Converts a raw JSON number (major units) into cents.
    ///
    /// Rounds half away from zero to the nearest cent.
    pub fn from_major_f64(value: f64) -> Result<MoneyCents, EngineError> {
        if !value.is_finite() {
            return Err(EngineError::InvalidAmount(format!("not a number: {value}")));
        }
        let cents = whole_cents((value * 100.0).round())
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        Ok(MoneyCents(cents))
    }

    /// Plain decimal rendering without currency symbol (`-12.34`), the form
    /// the API accepts for amounts.
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let dollars = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}${dollars}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a currency string into cents.
    ///
    /// Accepts an optional leading `+`/`-` (before or after the `$`), an
    /// optional `$` and `,` as thousands separator.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {s}"));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = split_sign(trimmed);
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        // "$-1.00" is what some locales produce.
        let (inner_negative, rest) = split_sign(rest.trim());
        if negative && inner_negative {
            return Err(invalid());
        }
        let negative = negative || inner_negative;

        if rest.is_empty() {
            return Err(empty());
        }

        let mut parts = rest.split('.');
        let dollars_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let dollars_digits = strip_grouping(dollars_str).ok_or_else(invalid)?;
        let dollars: i64 = dollars_digits.parse().map_err(|_| overflow())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        let total = dollars
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        let signed = if negative {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(MoneyCents(signed))
    }
}

/// `None` when a rounded cent count does not fit in an `i64`.
fn whole_cents(cents: f64) -> Option<i64> {
    // `i64::MAX as f64` rounds up to 2^63, itself out of range.
    (cents >= i64::MIN as f64 && cents < i64::MAX as f64).then_some(cents as i64)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(stripped) = s.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = s.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, s)
    }
}

/// Removes `,` thousands separators, checking the groups are well formed.
fn strip_grouping(s: &str) -> Option<String> {
    if s.is_empty() {
        return None;
    }
    let groups: Vec<&str> = s.split(',').collect();
    let well_formed = groups.iter().enumerate().all(|(idx, group)| {
        let digits = group.chars().all(|c| c.is_ascii_digit());
        let len_ok = if idx == 0 {
            !group.is_empty() && (groups.len() == 1 || group.len() <= 3)
        } else {
            group.len() == 3
        };
        digits && len_ok
    });
    well_formed.then(|| groups.concat())
}
