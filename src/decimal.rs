//! Exact decimal numbers.
//!
//! JSON has no decimal type, so decimal attributes travel as strings
//! (`"0.06500"`) and are held in memory as [`Decimal`]: a sign, a coefficient
//! digit sequence and a base-10 exponent. Parsing never rounds, trailing
//! zeros are kept, and the string form reproduces the parsed text's scale, so
//! a decimal survives any number of JSON round trips unchanged.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest magnitude accepted for a decimal's exponent, both as written and
/// as the position of its most significant digit.
pub const MAX_EXPONENT: i64 = 999_999_999;

/// Error returned when text is not a finite decimal number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal literal '{0}'")]
pub struct DecimalParseError(pub String);

/// An exact, arbitrary-precision decimal number.
///
/// The value is `(-1)^negative * coefficient * 10^exponent`. The coefficient
/// is stored without leading zeros (a zero coefficient is the single digit
/// `0`), so [`digits`](Decimal::digits) always counts significant digits.
///
/// Equality and ordering are numeric: `0.5 == 0.50`. The string form is not:
/// `0.50` prints as `0.50`.
///
/// # Example
///
/// ```rust
/// use eav_schema::Decimal;
///
/// let rate: Decimal = "0.06500".parse().unwrap();
/// assert_eq!(rate.to_string(), "0.06500");
/// assert_eq!(rate.digits(), &[6, 5, 0, 0]);
/// assert_eq!(rate.exponent(), -5);
/// assert_eq!(rate, "0.065".parse::<Decimal>().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Decimal {
    negative: bool,
    digits: Vec<u8>,
    exponent: i64,
}

impl Decimal {
    /// Returns zero with exponent 0.
    pub fn zero() -> Self {
        Self {
            negative: false,
            digits: vec![0],
            exponent: 0,
        }
    }

    /// Builds a decimal from an integer, exactly.
    pub fn from_i64(value: i64) -> Self {
        Self::from_magnitude(value < 0, value.unsigned_abs())
    }

    /// Builds a decimal from an unsigned integer, exactly.
    pub fn from_u64(value: u64) -> Self {
        Self::from_magnitude(false, value)
    }

    fn from_magnitude(negative: bool, magnitude: u64) -> Self {
        let digits = magnitude.to_string().bytes().map(|b| b - b'0').collect();
        Self {
            negative,
            digits,
            exponent: 0,
        }
    }

    /// Builds a decimal from the shortest text that round-trips the float.
    ///
    /// Whole floats keep one fractional zero (`5.0`), so their scale records
    /// that they came from a float. Non-finite floats have no decimal form.
    pub fn from_f64(value: f64) -> Result<Self, DecimalParseError> {
        if !value.is_finite() {
            return Err(DecimalParseError(value.to_string()));
        }
        // `{:?}` is the shortest round-trip repr and keeps the `.0` suffix.
        format!("{:?}", value).parse()
    }

    /// Returns true if the sign bit is set (including negative zero).
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns true if the value is numerically zero.
    pub fn is_zero(&self) -> bool {
        self.digits == [0]
    }

    /// Returns the coefficient digits, most significant first.
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Returns the base-10 exponent.
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Returns the `(sign, digits, exponent)` triple.
    pub fn as_tuple(&self) -> (bool, &[u8], i64) {
        (self.negative, &self.digits, self.exponent)
    }

    /// Number of digits to the right of the decimal point.
    pub fn fractional_digits(&self) -> u64 {
        if self.exponent < 0 {
            self.exponent.unsigned_abs()
        } else {
            0
        }
    }

    /// Number of coefficient digits left of the decimal point.
    ///
    /// Negative when the value is below one and written with leading
    /// fractional zeros (e.g. `0.065` has -1 whole digits).
    pub fn whole_digits(&self) -> i64 {
        let frac = i64::try_from(self.fractional_digits()).unwrap_or(i64::MAX);
        self.digit_count().saturating_sub(frac)
    }

    /// Exponent of the most significant digit.
    fn adjusted(&self) -> i64 {
        self.exponent.saturating_add(self.digit_count() - 1)
    }

    fn digit_count(&self) -> i64 {
        i64::try_from(self.digits.len()).unwrap_or(i64::MAX)
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        match self.adjusted().cmp(&other.adjusted()) {
            Ordering::Equal => {}
            unequal => return unequal,
        }

        // Same leading position: compare digit by digit, padding with zeros.
        let len = self.digits.len().max(other.digits.len());
        for i in 0..len {
            let a = self.digits.get(i).copied().unwrap_or(0);
            let b = other.digits.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Decimal {
    type Err = DecimalParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || DecimalParseError(text.to_string());
        let s = text.trim();

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (mantissa, exp_part) = match body.find(['e', 'E']) {
            Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
            None => (body, None),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (mantissa, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let written: i128 = match exp_part {
            Some(exp) => {
                let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                exp.parse().map_err(|_| invalid())?
            }
            None => 0,
        };

        let mut digits: Vec<u8> = int_part
            .bytes()
            .chain(frac_part.bytes())
            .map(|b| b - b'0')
            .skip_while(|d| *d == 0)
            .collect();
        if digits.is_empty() {
            digits.push(0);
        }

        let exponent = written - frac_part.len() as i128;
        let adjusted = exponent + digits.len() as i128 - 1;
        let limit = i128::from(MAX_EXPONENT);
        if !(-limit..=limit).contains(&exponent) || !(-limit..=limit).contains(&adjusted) {
            return Err(invalid());
        }
        let exponent = exponent as i64;

        Ok(Self {
            negative,
            digits,
            exponent,
        })
    }
}

impl Display for Decimal {
    /// Formats the value the way it was written: plain notation while the
    /// exponent is non-positive and the leading digit sits at most six
    /// places right of the point, scientific notation otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coefficient: String = self.digits.iter().map(|d| char::from(b'0' + d)).collect();
        let adjusted = self.adjusted();

        if self.negative {
            f.write_str("-")?;
        }

        if self.exponent <= 0 && adjusted >= -6 {
            if self.exponent == 0 {
                return f.write_str(&coefficient);
            }
            let point = coefficient.len() as i64 + self.exponent;
            if point > 0 {
                let (whole, frac) = coefficient.split_at(point as usize);
                write!(f, "{}.{}", whole, frac)
            } else {
                write!(f, "0.{}{}", "0".repeat((-point) as usize), coefficient)
            }
        } else {
            let (lead, rest) = coefficient.split_at(1);
            f.write_str(lead)?;
            if !rest.is_empty() {
                write!(f, ".{}", rest)?;
            }
            write!(f, "E{}{}", if adjusted >= 0 { "+" } else { "-" }, adjusted.abs())
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let self_neg = self.negative && !self.is_zero();
        let other_neg = other.negative && !other.is_zero();
        match (self_neg, other_neg) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Self::from_i64(value.into())
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl TryFrom<f64> for Decimal {
    type Error = DecimalParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DecimalVisitor;

        impl Visitor<'_> for DecimalVisitor {
            type Value = Decimal;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
                Ok(Decimal::from_i64(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
                Ok(Decimal::from_u64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
                Decimal::from_f64(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing the display form reproduces the same digits and exponent.
        #[test]
        fn display_round_trips(
            negative in any::<bool>(),
            whole in "[0-9]{1,12}",
            frac in "[0-9]{0,12}",
        ) {
            let text = if frac.is_empty() {
                format!("{}{}", if negative { "-" } else { "" }, whole)
            } else {
                format!("{}{}.{}", if negative { "-" } else { "" }, whole, frac)
            };
            let parsed: Decimal = text.parse().unwrap();
            let reparsed: Decimal = parsed.to_string().parse().unwrap();
            prop_assert_eq!(parsed.as_tuple(), reparsed.as_tuple());
            prop_assert_eq!(parsed.to_string(), reparsed.to_string());
        }

        /// Integer conversion agrees with parsing the integer's text.
        #[test]
        fn from_i64_matches_parse(n in any::<i64>()) {
            let parsed: Decimal = n.to_string().parse().unwrap();
            let converted = Decimal::from_i64(n);
            prop_assert_eq!(converted.as_tuple(), parsed.as_tuple());
        }

        /// Ordering agrees with integer ordering.
        #[test]
        fn ordering_matches_integers(a in any::<i32>(), b in any::<i32>()) {
            prop_assert_eq!(Decimal::from(a).cmp(&Decimal::from(b)), a.cmp(&b));
        }
    }
}
