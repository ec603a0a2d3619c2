use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::record::{Record, Value};

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([0-9]+)\s*(minutes?|hours?)\s*$").expect("valid duration regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Parses "<n> minutes" / "<n> hours" into minutes.
pub fn parse_duration(text: &str) -> Option<u64> {
    let caps = DURATION.captures(text)?;
    let amount: u64 = caps[1].parse().ok()?;
    if caps[2].to_ascii_lowercase().starts_with("hour") {
        amount.checked_mul(60)
    } else {
        Some(amount)
    }
}

fn lexical(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// What a field sorts by. Keys of different kinds order by kind, numbers
/// before durations before text, so a mixed column still sorts consistently.
#[derive(Debug)]
enum SortKey<'a> {
    Number(f64),
    Minutes(u64),
    Text(&'a str),
}

impl<'a> SortKey<'a> {
    fn of(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::Number(n)) => SortKey::Number(*n),
            Some(Value::Text(text)) => match parse_duration(text) {
                Some(minutes) => SortKey::Minutes(minutes),
                None => SortKey::Text(text),
            },
            None => SortKey::Text(""),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Minutes(_) => 1,
            SortKey::Text(_) => 2,
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
            (SortKey::Minutes(x), SortKey::Minutes(y)) => x.cmp(y),
            (SortKey::Text(x), SortKey::Text(y)) => lexical(x, y),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Orders two records by the value of `key`. Never fails: records missing
/// the field compare as if it held an empty string. The order is total, so
/// any mix of values in a column can go through `slice::sort_by`.
pub fn compare(a: &Record, b: &Record, key: &str, direction: SortDirection) -> Ordering {
    let ord = SortKey::of(a.get(key)).order(&SortKey::of(b.get(key)));
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}
