use std::collections::BTreeSet;

/// Selected rows, as positions within the current page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    rows: BTreeSet<usize>,
}

impl Selection {
    pub fn toggle_one(&mut self, index: usize) {
        if !self.rows.insert(index) {
            self.rows.remove(&index);
        }
    }

    pub fn toggle_all(&mut self, page_len: usize, checked: bool) {
        self.rows.clear();
        if checked {
            self.rows.extend(0..page_len);
        }
    }

    pub fn is_all_selected(&self, page_len: usize) -> bool {
        page_len > 0 && self.rows.len() == page_len
    }

    pub fn contains(&self, index: usize) -> bool {
        self.rows.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_one_adds_and_removes() {
        let mut s = Selection::default();
        s.toggle_one(3);
        assert!(s.contains(3));
        s.toggle_one(3);
        assert!(s.is_empty());
    }

    #[test]
    fn toggle_all_selects_whole_page() {
        let mut s = Selection::default();
        s.toggle_one(1);
        s.toggle_all(4, true);
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert!(s.is_all_selected(4));
        s.toggle_all(4, false);
        assert!(s.is_empty());
    }

    #[test]
    fn empty_page_is_never_all_selected() {
        let mut s = Selection::default();
        s.toggle_all(0, true);
        assert!(!s.is_all_selected(0));
    }
}
