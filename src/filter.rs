use rayon::prelude::*;

use crate::record::Record;

/// True if `term` is empty or any field contains it, ignoring case.
pub fn matches(row: &Record, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    row.values()
        .any(|v| v.to_string().to_lowercase().contains(&term))
}

/// Indices of all records matching `term`, in input order.
pub fn filter_indices(records: &[Record], term: &str) -> Vec<usize> {
    if term.is_empty() {
        return (0..records.len()).collect();
    }
    // Indexed parallel iterators keep the input order on collect
    records
        .par_iter()
        .enumerate()
        .filter(|(_, r)| matches(r, term))
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Vec<Record> {
        vec![
            Record::new().with("name", "Alice").with("city", "Reno"),
            Record::new().with("name", "Bob").with("city", "Elko"),
        ]
    }

    #[test]
    fn matches_any_field_case_insensitive() {
        let rows = people();
        assert_eq!(filter_indices(&rows, "re"), vec![0]);
        assert_eq!(filter_indices(&rows, "BOB"), vec![1]);
        assert!(filter_indices(&rows, "xyz").is_empty());
    }

    #[test]
    fn empty_term_matches_everything() {
        let rows = people();
        assert!(matches(&rows[0], ""));
        assert_eq!(filter_indices(&rows, ""), vec![0, 1]);
    }

    #[test]
    fn numbers_match_by_decimal_form() {
        let row = Record::new().with("age", 42i64).with("score", 1.5);
        assert!(matches(&row, "42"));
        assert!(matches(&row, "1.5"));
        assert!(!matches(&row, "42.0"));
    }
}
