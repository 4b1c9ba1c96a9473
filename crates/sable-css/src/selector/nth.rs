//! [§ 6.2 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)

use std::fmt;

/// An `an+b` formula.
///
/// "The An+B notation defines an integer step (A) and offset (B), and
/// represents the An+Bth elements in a list, for every positive integer or
/// zero value of n, with the first element in the list having index 1."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nth {
    /// The step.
    pub a: i32,
    /// The offset.
    pub b: i32,
}

impl Nth {
    /// Create a formula from its step and offset.
    #[must_use]
    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse `odd`, `even`, `b`, `an`, or `an+b`, case-insensitively.
    ///
    /// Whitespace is allowed around the expression and around the sign
    /// between `an` and `b`, nowhere else.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().to_ascii_lowercase();

        match text.as_str() {
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }

        let Some((step, offset)) = text.split_once('n') else {
            return parse_integer(&text).map(|b| Self::new(0, b));
        };

        let a = match step {
            "" | "+" => 1,
            "-" => -1,
            digits => parse_integer(digits)?,
        };

        let offset = offset.trim_start();
        let b = if offset.is_empty() {
            0
        } else {
            let (negative, digits) = match offset.split_at_checked(1)? {
                ("+", rest) => (false, rest.trim_start()),
                ("-", rest) => (true, rest.trim_start()),
                _ => return None,
            };
            let b = parse_integer(digits).filter(|_| !digits.starts_with(['+', '-']))?;
            if negative { -b } else { b }
        };
        Some(Self::new(a, b))
    }

    /// Whether the 1-based `position` is `an+b` for some `n >= 0`.
    #[must_use]
    pub fn matches(self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            return position == b;
        }
        let diff = position - b;
        diff % a == 0 && diff / a >= 0
    }
}

/// An optionally signed run of ASCII digits.
fn parse_integer(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for Nth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.a {
            0 => return write!(f, "{}", self.b),
            1 => f.write_str("n")?,
            -1 => f.write_str("-n")?,
            a => write!(f, "{a}n")?,
        }
        if self.b != 0 {
            write!(f, "{:+}", self.b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(Nth::parse("odd"), Some(Nth::new(2, 1)));
        assert_eq!(Nth::parse(" EVEN "), Some(Nth::new(2, 0)));
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(Nth::parse("3"), Some(Nth::new(0, 3)));
        assert_eq!(Nth::parse("n"), Some(Nth::new(1, 0)));
        assert_eq!(Nth::parse("-n+3"), Some(Nth::new(-1, 3)));
        assert_eq!(Nth::parse("2n + 1"), Some(Nth::new(2, 1)));
        assert_eq!(Nth::parse("+4n-2"), Some(Nth::new(4, -2)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Nth::parse(""), None);
        assert_eq!(Nth::parse("n5"), None);
        assert_eq!(Nth::parse("2n+"), None);
        assert_eq!(Nth::parse("x"), None);
        assert_eq!(Nth::parse("2nn"), None);
    }

    #[test]
    fn test_parse_rejects_inner_whitespace() {
        assert_eq!(Nth::parse("o dd"), None);
        assert_eq!(Nth::parse("ev en"), None);
        assert_eq!(Nth::parse("2 n+1"), None);
        assert_eq!(Nth::parse("1 0"), None);
        assert_eq!(Nth::parse("2n+1 0"), None);
        assert_eq!(Nth::parse("- n"), None);
        assert_eq!(Nth::parse("2n+-1"), None);
        assert_eq!(Nth::parse("-n - 2"), Some(Nth::new(-1, -2)));
        assert_eq!(Nth::parse(" 3n+ 1 "), Some(Nth::new(3, 1)));
    }

    #[test]
    fn test_matches() {
        let odd = Nth::new(2, 1);
        assert!(odd.matches(1));
        assert!(!odd.matches(2));
        assert!(odd.matches(5));

        let first_three = Nth::new(-1, 3);
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));

        let exact = Nth::new(0, 2);
        assert!(exact.matches(2));
        assert!(!exact.matches(4));

        // n must be non-negative, so 3n+4 never matches position 1.
        assert!(!Nth::new(3, 4).matches(1));
        assert!(Nth::new(3, 4).matches(7));
    }

    #[test]
    fn test_display() {
        assert_eq!(Nth::new(2, 1).to_string(), "2n+1");
        assert_eq!(Nth::new(-1, 3).to_string(), "-n+3");
        assert_eq!(Nth::new(1, 0).to_string(), "n");
        assert_eq!(Nth::new(0, -2).to_string(), "-2");
        assert_eq!(Nth::new(4, -2).to_string(), "4n-2");
    }
}
