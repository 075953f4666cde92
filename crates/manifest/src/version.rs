//! Version ordering for component versions.
//!
//! Component versions are not semver: they look like `1.0.0.Final`,
//! `2.1.0.Beta2`, `7.4-SP1`. They are split into items on `.`, `-`, `_` and
//! on every digit/letter transition. Numeric items compare numerically,
//! qualifiers compare by a fixed rank, and trailing zeroes or release
//! qualifiers are insignificant (`1.0 == 1.0.0 == 1.0.0.Final`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    /// Decimal digits without leading zeroes ("0" for zero)
    Number(String),
    /// Lowercased qualifier
    Qualifier(String),
}

impl Item {
    fn number(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Self::Number("0".to_string())
        } else {
            Self::Number(trimmed.to_string())
        }
    }

    fn is_insignificant(&self) -> bool {
        match self {
            Self::Number(n) => n == "0",
            Self::Qualifier(q) => qualifier_rank(q) == RELEASE_RANK,
        }
    }
}

const RELEASE_RANK: u8 = 5;
const UNKNOWN_RANK: u8 = 7;

fn qualifier_rank(qualifier: &str) -> u8 {
    match qualifier {
        "alpha" | "a" => 0,
        "beta" | "b" => 1,
        "milestone" | "m" => 2,
        "rc" | "cr" => 3,
        "snapshot" => 4,
        "" | "ga" | "final" | "release" => RELEASE_RANK,
        "sp" => 6,
        _ => UNKNOWN_RANK,
    }
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_qualifiers(a: &str, b: &str) -> Ordering {
    let (ra, rb) = (qualifier_rank(a), qualifier_rank(b));
    if ra == UNKNOWN_RANK && rb == UNKNOWN_RANK {
        return a.cmp(b);
    }
    ra.cmp(&rb)
}

/// Compare an item against the implicit padding of a shorter version
fn compare_to_padding(item: &Item) -> Ordering {
    match item {
        Item::Number(n) => compare_numbers(n, "0"),
        Item::Qualifier(q) => qualifier_rank(q).cmp(&RELEASE_RANK),
    }
}

fn compare_items(a: &Item, b: &Item) -> Ordering {
    match (a, b) {
        (Item::Number(x), Item::Number(y)) => compare_numbers(x, y),
        (Item::Qualifier(x), Item::Qualifier(y)) => compare_qualifiers(x, y),
        (Item::Number(_), Item::Qualifier(_)) => Ordering::Greater,
        (Item::Qualifier(_), Item::Number(_)) => Ordering::Less,
    }
}

fn tokenize(raw: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    let flush = |current: &mut String, is_digit: bool, items: &mut Vec<Item>| {
        if current.is_empty() {
            return;
        }
        if is_digit {
            items.push(Item::number(current));
        } else {
            items.push(Item::Qualifier(current.to_lowercase()));
        }
        current.clear();
    };

    for c in raw.trim().chars() {
        if matches!(c, '.' | '-' | '_' | '+') {
            flush(&mut current, current_is_digit, &mut items);
            continue;
        }
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            flush(&mut current, current_is_digit, &mut items);
        }
        current_is_digit = is_digit;
        current.push(c);
    }
    flush(&mut current, current_is_digit, &mut items);

    while items.last().is_some_and(Item::is_insignificant) {
        items.pop();
    }
    items
}

/// A parsed, totally ordered component version
#[derive(Debug, Clone)]
pub struct ComponentVersion {
    raw: String,
    items: Vec<Item>,
}

impl ComponentVersion {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.trim().to_string(),
            items: tokenize(raw),
        }
    }

    /// The version exactly as it was written
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for ComponentVersion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for ComponentVersion {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for ComponentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for ComponentVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        for i in 0..len {
            let ord = match (self.items.get(i), other.items.get(i)) {
                (Some(a), Some(b)) => compare_items(a, b),
                (Some(a), None) => compare_to_padding(a),
                (None, Some(b)) => compare_to_padding(b).reverse(),
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ComponentVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ComponentVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ComponentVersion {}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ComponentVersion {
        ComponentVersion::parse(s)
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("1.0.0") < v("1.1.0"));
        assert!(v("1.10") > v("1.9"));
        assert!(v("2") > v("1.99.99"));
        assert!(v("1.0.10") > v("1.0.9"));
    }

    #[test]
    fn test_trailing_zeroes_are_insignificant() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1.0.0.Final"), v("1.0"));
        assert_eq!(v("01.002"), v("1.2"));
    }

    #[test]
    fn test_qualifier_ordering() {
        assert!(v("1.0.0.Alpha1") < v("1.0.0.Beta1"));
        assert!(v("1.0.0.Beta1") < v("1.0.0.CR1"));
        assert!(v("1.0.0.CR1") < v("1.0.0.Final"));
        assert!(v("1.0.0.Final") < v("1.0.0.SP1"));
        assert!(v("1.0.0-SNAPSHOT") < v("1.0.0"));
        assert!(v("1.0.0.Beta2") > v("1.0.0.Beta1"));
    }

    #[test]
    fn test_digit_letter_transitions_split_items() {
        assert_eq!(v("1.0rc1"), v("1.0-rc-1"));
        assert!(v("1.0rc1") < v("1.0"));
    }

    #[test]
    fn test_not_lexical() {
        // Lexically "1.9" > "1.10", but not as versions
        assert!("1.9" > "1.10");
        assert!(v("1.9") < v("1.10"));
    }

    #[test]
    fn test_display_keeps_raw_form() {
        assert_eq!(v("1.0.0.Final").to_string(), "1.0.0.Final");
    }
}
