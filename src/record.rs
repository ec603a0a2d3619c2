use std::fmt;

/// A single cell. Numbers keep their numeric value so they can be compared
/// numerically, but are matched and rendered by their decimal string form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            // Integral numbers are printed without a trailing ".0"
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

/// One row of the dataset. Fields keep the order in which the data source
/// delivered them, the first record's field order defines the table headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, replacing the value in place if the name already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }
}

/// Header names of a dataset, taken from the first record.
pub fn headers(records: &[Record]) -> Vec<String> {
    records
        .first()
        .map(|r| r.keys().map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_as_decimal_strings() {
        assert_eq!(Value::from(42i64).to_string(), "42");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(-3.0).to_string(), "-3");
        assert_eq!(Value::from("abc").to_string(), "abc");
    }

    #[test]
    fn insert_keeps_field_order_and_replaces() {
        let mut r = Record::new().with("name", "Alice").with("city", "Reno");
        r.insert("name", "Bob");
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["name", "city"]);
        assert_eq!(r.get("name"), Some(&Value::from("Bob")));
        assert_eq!(r.get("age"), None);
        assert_eq!(r.values().count(), 2);
    }

    #[test]
    fn headers_come_from_first_record() {
        let records = vec![
            Record::new().with("b", 1i64).with("a", 2i64),
            Record::new().with("a", 3i64).with("b", 4i64),
        ];
        assert_eq!(headers(&records), vec!["b", "a"]);
        assert!(headers(&[]).is_empty());
    }
}
