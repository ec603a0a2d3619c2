//! The view engine.
//!
//! `ViewState` owns the raw records and every user controlled view input
//! (search term, sort column and direction, page size, page index). Each
//! mutator ends in [`ViewState::recompute`], which runs
//! filter → sort → paginate and publishes a fresh [`ViewSnapshot`].
//! The selection holds page-relative row positions and is cleared on every
//! recompute so it never points at rows of a different page.

use std::time::Instant;

use tracing::{debug, trace};

use crate::compare::{SortDirection, compare};
use crate::domain::TVError;
use crate::filter::filter_indices;
use crate::paginator::{self, Navigation, PageSize, clamp_index, navigate, paginate};
use crate::record::{Record, headers};
use crate::selection::Selection;

/// Read-only result of the last recompute, as consumed by the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewSnapshot {
    pub headers: Vec<String>,
    pub visible: Vec<Record>,
    pub total_pages: usize,
    pub page_index: usize,
    pub filtered_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Default)]
pub struct ViewState {
    records: Vec<Record>,
    headers: Vec<String>,
    search: String,
    sort_key: Option<String>,
    sort_direction: SortDirection,
    page_size: PageSize,
    page_index: usize,
    page_input: String,
    selection: Selection,
    snapshot: ViewSnapshot,
}

impl ViewState {
    pub fn new(page_size: PageSize) -> Self {
        let mut view = Self {
            page_size,
            ..Self::default()
        };
        view.recompute();
        view
    }

    // -------------------------- Accessors -------------------------------- //

    pub fn snapshot(&self) -> &ViewSnapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        self.sort_key.as_deref().map(|k| (k, self.sort_direction))
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Records of the current page that are selected, in page order.
    pub fn selected_records(&self) -> Vec<&Record> {
        self.selection
            .iter()
            .filter_map(|idx| self.snapshot.visible.get(idx))
            .collect()
    }

    // -------------------------- Mutators --------------------------------- //

    /// Replaces the whole dataset.
    pub fn set_records(&mut self, records: Vec<Record>) {
        debug!("Received {} records", records.len());
        self.headers = headers(&records);
        self.records = records;
        self.recompute();
    }

    pub fn search(&mut self, term: &str) {
        trace!("Search for {term:?}");
        self.search = term.to_string();
        self.recompute();
    }

    /// Header click. Clicking the sorted column flips the direction, any
    /// other column becomes the sort key in ascending order.
    pub fn sort_by_column(&mut self, name: &str) -> Result<(), TVError> {
        if !self.headers.iter().any(|h| h == name) {
            return Err(TVError::UnknownColumn(name.to_string()));
        }
        if self.sort_key.as_deref() == Some(name) {
            self.sort_direction = self.sort_direction.reversed();
        } else {
            self.sort_key = Some(name.to_string());
            self.sort_direction = SortDirection::Ascending;
        }
        trace!("Sort by {name} {:?}", self.sort_direction);
        self.recompute();
        Ok(())
    }

    pub fn clear_sort(&mut self) {
        self.sort_key = None;
        self.sort_direction = SortDirection::Ascending;
        self.recompute();
    }

    /// Changing the page size always starts over on the first page.
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page_index = 0;
        self.recompute();
    }

    pub fn go_first(&mut self) {
        self.navigate(Navigation::First);
    }

    pub fn go_prev(&mut self) {
        self.navigate(Navigation::Prev);
    }

    pub fn go_next(&mut self) {
        self.navigate(Navigation::Next);
    }

    pub fn go_last(&mut self) {
        self.navigate(Navigation::Last);
    }

    /// Jumps to a 1-based page number, clamped to the existing pages.
    pub fn jump_to_page(&mut self, page_number: i64) {
        self.navigate(Navigation::JumpTo(page_number));
    }

    /// Stores the jump-to-page input without acting on it.
    pub fn type_page_number(&mut self, input: &str) {
        self.page_input = input.to_string();
    }

    /// Commits the typed page number. Malformed input is rejected and the
    /// page index stays untouched.
    pub fn confirm_page_number(&mut self) -> Result<(), TVError> {
        let page_number = paginator::parse_page_number(&self.page_input)?;
        self.page_input.clear();
        self.jump_to_page(page_number);
        Ok(())
    }

    pub fn toggle_row_selected(&mut self, index: usize) -> Result<(), TVError> {
        let len = self.snapshot.visible.len();
        if index >= len {
            return Err(TVError::RowOutOfRange { index, len });
        }
        self.selection.toggle_one(index);
        Ok(())
    }

    pub fn toggle_all_selected(&mut self, checked: bool) {
        self.selection
            .toggle_all(self.snapshot.visible.len(), checked);
    }

    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected(self.snapshot.visible.len())
    }

    fn navigate(&mut self, nav: Navigation) {
        self.page_index = navigate(nav, self.page_index, self.snapshot.total_pages);
        self.recompute();
    }

    // -------------------------- Pipeline --------------------------------- //

    /// Filter, sort and paginate the records with the current inputs.
    pub fn recompute(&mut self) {
        let start_time = Instant::now();

        // Positions into `records`, filtered and then sorted
        let mut rows = filter_indices(&self.records, &self.search);

        if let Some(key) = self.sort_key.as_deref() {
            let records = &self.records;
            let direction = self.sort_direction;
            // slice::sort_by is stable, equal rows keep their filtered order
            rows.sort_by(|&a, &b| compare(&records[a], &records[b], key, direction));
        }

        let mut page = paginate(&rows, self.page_size, self.page_index);
        let clamped = clamp_index(self.page_index, page.total_pages);
        if clamped != self.page_index {
            trace!("Page index {} out of range, clamped to {clamped}", self.page_index);
            self.page_index = clamped;
            page = paginate(&rows, self.page_size, self.page_index);
        }

        self.selection.clear();
        self.snapshot = ViewSnapshot {
            headers: self.headers.clone(),
            visible: page
                .visible
                .iter()
                .map(|&idx| self.records[idx].clone())
                .collect(),
            total_pages: page.total_pages,
            page_index: self.page_index,
            filtered_count: rows.len(),
            total_count: self.records.len(),
        };

        trace!(
            "Recompute: {} of {} rows, page {}/{} in {}us",
            self.snapshot.filtered_count,
            self.snapshot.total_count,
            self.snapshot.page_index + 1,
            self.snapshot.total_pages,
            start_time.elapsed().as_micros()
        );
    }
}
