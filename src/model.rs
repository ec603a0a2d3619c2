use arboard::Clipboard;
use tracing::{debug, error, info, trace};

use crate::compare::SortDirection;
use crate::domain::{CMDMode, HELP_TEXT, Message, TVConfig, TVError};
use crate::inputter::{InputResult, Inputter};
use crate::record::Record;
use crate::view_state::ViewState;

#[derive(Debug, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderView {
    pub name: String,
    pub sort: Option<SortDirection>,
    pub width: usize,
}

/// Everything the UI needs to draw one frame.
pub struct UIData {
    pub name: String,
    pub loading: bool,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<Vec<String>>,
    pub selected: Vec<bool>,
    pub all_selected: bool,
    pub cursor_row: usize,
    pub cursor_column: usize,
    pub page_index: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub search: String,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            loading: true,
            headers: Vec::new(),
            rows: Vec::new(),
            selected: Vec::new(),
            all_selected: false,
            cursor_row: 0,
            cursor_column: 0,
            page_index: 0,
            total_pages: 0,
            page_size: 0,
            filtered_count: 0,
            total_count: 0,
            search: String::new(),
            show_popup: false,
            popup_message: String::new(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
        }
    }
}

pub struct Model {
    config: TVConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    name: String,
    view: ViewState,
    cursor_row: usize,
    cursor_column: usize,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    // Search term to restore when the search input is canceled
    search_before_input: String,
    status_message: String,
}

impl Model {
    pub fn init(config: &TVConfig) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::LOADING,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            name: String::new(),
            view: ViewState::new(config.page_size),
            cursor_row: 0,
            cursor_column: 0,
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            search_before_input: String::new(),
            status_message: "Loading ...".to_string(),
        };
        model.update_uidata();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::CMDINPUT
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Message) -> Result<(), TVError> {
        // Data can arrive in any modus
        let msg = match message {
            Message::DataArrived(name, records) => {
                self.data_arrived(name, records);
                self.update_uidata();
                return Ok(());
            }
            msg => msg,
        };

        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::Help => self.show_help(),
                Message::Exit => self.exit(),
                Message::MoveUp => self.cursor_row = self.cursor_row.saturating_sub(1),
                Message::MoveDown => self.cursor_row += 1,
                Message::MoveLeft => self.cursor_column = self.cursor_column.saturating_sub(1),
                Message::MoveRight => self.cursor_column += 1,
                Message::FirstPage => self.view.go_first(),
                Message::PrevPage => self.view.go_prev(),
                Message::NextPage => self.view.go_next(),
                Message::LastPage => self.view.go_last(),
                Message::JumpToPage => self.enter_cmd_mode(CMDMode::JumpToPage),
                Message::Search => self.enter_cmd_mode(CMDMode::Search),
                Message::Enter | Message::SortByColumn => self.sort_current_column(),
                Message::ClearSort => {
                    self.view.clear_sort();
                    self.set_status_message("Original order");
                }
                Message::IncreasePageSize => {
                    self.view.set_page_size(self.view.page_size().larger())
                }
                Message::DecreasePageSize => {
                    self.view.set_page_size(self.view.page_size().smaller())
                }
                Message::ToggleRow => self.toggle_current_row(),
                Message::ToggleAll => self.view.toggle_all_selected(!self.view.is_all_selected()),
                Message::CopySelection => self.copy_selection(),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.exit(),
                _ => (),
            },
            Modus::CMDINPUT => {
                if let Message::RawKey(key) = msg {
                    self.last_input = self.input.read(key);
                    self.handle_cmd_input();
                }
            }
        }

        self.update_uidata();
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn data_arrived(&mut self, name: String, records: Vec<Record>) {
        info!("Data from {name} arrived: {} records", records.len());
        let count = records.len();
        self.name = name;
        self.view.set_records(records);
        self.status = Status::READY;
        self.set_status_message(format!("Loaded {count} records"));
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::TABLE => {
                // Esc in the table drops an active search
                if !self.view.search_term().is_empty() {
                    self.view.search("");
                    self.set_status_message("Search cleared");
                }
            }
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
            }
            Modus::CMDINPUT => {}
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);

        self.input.clear();
        match mode {
            CMDMode::Search => {
                self.search_before_input = self.view.search_term().to_string();
                self.input.set(&self.search_before_input);
            }
            CMDMode::JumpToPage => self.view.type_page_number(""),
        }
        self.last_input = self.input.get();
    }

    fn leave_cmd_mode(&mut self) {
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        self.cmd_mode = None;
        self.input.clear();
        self.last_input = self.input.get();
    }

    fn handle_cmd_input(&mut self) {
        let input = self.last_input.clone();
        match self.cmd_mode {
            Some(CMDMode::Search) => {
                if input.canceled {
                    let previous = std::mem::take(&mut self.search_before_input);
                    self.view.search(&previous);
                } else if input.changed {
                    // Search follows every keystroke
                    self.view.search(&input.input);
                }
                if input.finished {
                    let found = self.view.snapshot().filtered_count;
                    self.leave_cmd_mode();
                    if !input.canceled {
                        self.set_status_message(format!("Found {found} matching rows"));
                    }
                }
            }
            Some(CMDMode::JumpToPage) => {
                // The page only changes once the number is confirmed
                self.view.type_page_number(&input.input);
                if input.canceled {
                    self.view.type_page_number("");
                    self.leave_cmd_mode();
                } else if input.finished {
                    let result = self.view.confirm_page_number();
                    self.leave_cmd_mode();
                    match result {
                        Ok(()) => debug!("Jumped to page {}", self.view.page_index() + 1),
                        Err(e) => self.set_status_message(e.to_string()),
                    }
                }
            }
            None => {
                info!("Cmd mode is none!");
                self.leave_cmd_mode();
            }
        }
    }

    fn sort_current_column(&mut self) {
        let Some(column) = self
            .view
            .snapshot()
            .headers
            .get(self.cursor_column)
            .cloned()
        else {
            return;
        };
        match self.view.sort_by_column(&column) {
            Ok(()) => {
                if let Some((key, direction)) = self.view.sort() {
                    self.set_status_message(format!("Sorted by {key} ({direction:?})"));
                }
            }
            Err(e) => error!("Sorting failed: {e}"),
        }
    }

    fn toggle_current_row(&mut self) {
        if let Err(e) = self.view.toggle_row_selected(self.cursor_row) {
            debug!("Toggle row failed: {e}");
        }
    }

    fn copy_selection(&mut self) {
        if self.view.selection().is_empty() {
            self.set_status_message("Nothing selected");
            return;
        }
        let count = self.view.selection().len();
        let selected = self.view.selected_records();
        let text = selection_as_csv(&self.view.snapshot().headers, &selected);

        match self.copy_to_clipboard(text) {
            Ok(()) => {
                trace!("Copied {count} rows to clipboard.");
                self.set_status_message(format!("Copied {count} rows"));
            }
            Err(e) => {
                error!("Error copying to clipboard: {e:?}");
                self.set_status_message("Clipboard not available");
            }
        }
    }

    fn copy_to_clipboard(&mut self, text: String) -> Result<(), arboard::Error> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard.set_text(text)?;
        }
        Ok(())
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    // -------------------- UI data ---------------------------------------- //

    fn update_uidata(&mut self) {
        let snapshot = self.view.snapshot();

        // Keep the cursor on the current page and columns
        self.cursor_row = self.cursor_row.min(snapshot.visible.len().saturating_sub(1));
        self.cursor_column = self
            .cursor_column
            .min(snapshot.headers.len().saturating_sub(1));

        let rows: Vec<Vec<String>> = snapshot
            .visible
            .iter()
            .map(|record| {
                snapshot
                    .headers
                    .iter()
                    .map(|h| {
                        record
                            .get(h)
                            .map(|v| v.to_string().replace("\r\n", " ↵ ").replace('\n', " ↵ "))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        let sort = self.view.sort();
        let headers = snapshot
            .headers
            .iter()
            .enumerate()
            .map(|(cidx, name)| HeaderView {
                name: name.clone(),
                sort: sort.filter(|(key, _)| *key == name.as_str()).map(|(_, d)| d),
                width: Self::calculate_column_width(name, &rows, cidx, self.config.max_column_width),
            })
            .collect();

        let selection = self.view.selection();
        self.uidata = UIData {
            name: self.name.clone(),
            loading: self.status == Status::LOADING,
            headers,
            selected: (0..rows.len()).map(|idx| selection.contains(idx)).collect(),
            all_selected: self.view.is_all_selected(),
            rows,
            cursor_row: self.cursor_row,
            cursor_column: self.cursor_column,
            page_index: snapshot.page_index,
            total_pages: snapshot.total_pages,
            page_size: self.view.page_size().get(),
            filtered_count: snapshot.filtered_count,
            total_count: snapshot.total_count,
            search: self.view.search_term().to_string(),
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.modus == Modus::CMDINPUT,
            status_message: self.status_message.clone(),
        };
    }

    /// Width of a column on the current page, header marker included.
    fn calculate_column_width(
        name: &str,
        rows: &[Vec<String>],
        cidx: usize,
        max_column_width: usize,
    ) -> usize {
        let data_width = rows
            .iter()
            .filter_map(|r| r.get(cidx))
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);
        // Two extra chars for the sort marker
        let width = std::cmp::max(name.chars().count() + 2, data_width);
        std::cmp::min(width, max_column_width)
    }
}

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = needs_escaping || c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

/// Header line followed by one CSV line per record.
pub fn selection_as_csv(headers: &[String], records: &[&Record]) -> String {
    let mut lines = vec![
        headers
            .iter()
            .map(|h| wrap_cell_content(h))
            .collect::<Vec<String>>()
            .join(","),
    ];
    for record in records {
        lines.push(
            headers
                .iter()
                .map(|h| {
                    let cell = record.get(h).map(|v| v.to_string()).unwrap_or_default();
                    wrap_cell_content(&cell)
                })
                .collect::<Vec<String>>()
                .join(","),
        );
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn bookings(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                Record::new()
                    .with("id", i as i64)
                    .with("city", if i % 3 == 0 { "Reno" } else { "Elko" })
            })
            .collect()
    }

    fn loaded(n: usize) -> Model {
        let mut model = Model::init(&TVConfig::default());
        model
            .update(Message::DataArrived("bookings".into(), bookings(n)))
            .unwrap();
        model
    }

    fn send_keys(model: &mut Model, keys: &str) {
        for c in keys.chars() {
            let code = match c {
                '\n' => KeyCode::Enter,
                '\x1b' => KeyCode::Esc,
                c => KeyCode::Char(c),
            };
            model
                .update(Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)))
                .unwrap();
        }
    }

    #[test]
    fn starts_empty_and_loading() {
        let model = Model::init(&TVConfig::default());
        let ui = model.get_uidata();
        assert_eq!(model.status, Status::LOADING);
        assert!(ui.loading);
        assert!(ui.headers.is_empty());
        assert_eq!(ui.total_pages, 0);
    }

    #[test]
    fn data_arrival_fills_table() {
        let model = loaded(25);
        let ui = model.get_uidata();
        assert_eq!(model.status, Status::READY);
        assert_eq!(ui.name, "bookings");
        assert_eq!(ui.rows.len(), 10);
        assert_eq!(ui.total_pages, 3);
        assert_eq!(ui.headers.iter().map(|h| h.name.as_str()).collect::<Vec<_>>(), vec!["id", "city"]);
    }

    #[test]
    fn page_size_change_clears_selection() {
        let mut model = loaded(25);
        model.update(Message::NextPage).unwrap();
        model.update(Message::ToggleRow).unwrap();
        assert_eq!(model.get_uidata().selected.iter().filter(|s| **s).count(), 1);
        model.update(Message::IncreasePageSize).unwrap();
        let ui = model.get_uidata();
        assert!(ui.selected.iter().all(|s| !s));
        assert_eq!(ui.page_index, 0);
        assert_eq!(ui.page_size, 20);
    }

    #[test]
    fn search_follows_keystrokes_and_escape_restores() {
        let mut model = loaded(25);
        model.update(Message::Search).unwrap();
        assert!(model.raw_keyevents());
        send_keys(&mut model, "re");
        assert_eq!(model.get_uidata().filtered_count, 9);
        send_keys(&mut model, "\x1b");
        assert!(!model.raw_keyevents());
        assert_eq!(model.get_uidata().filtered_count, 25);

        model.update(Message::Search).unwrap();
        send_keys(&mut model, "elko\n");
        assert_eq!(model.get_uidata().search, "elko");
        assert_eq!(model.get_uidata().filtered_count, 16);
        model.update(Message::Exit).unwrap();
        assert_eq!(model.get_uidata().filtered_count, 25);
    }

    #[test]
    fn jump_commits_on_enter_only() {
        let mut model = loaded(25);
        model.update(Message::JumpToPage).unwrap();
        send_keys(&mut model, "3");
        assert_eq!(model.get_uidata().page_index, 0);
        send_keys(&mut model, "\n");
        assert_eq!(model.get_uidata().page_index, 2);

        model.update(Message::JumpToPage).unwrap();
        send_keys(&mut model, "x\n");
        let ui = model.get_uidata();
        assert_eq!(ui.page_index, 2);
        assert!(ui.status_message.contains("not a page number"));
    }

    #[test]
    fn sort_marks_header() {
        let mut model = loaded(5);
        model.update(Message::MoveRight).unwrap();
        model.update(Message::SortByColumn).unwrap();
        let ui = model.get_uidata();
        assert_eq!(ui.headers[1].sort, Some(SortDirection::Ascending));
        assert_eq!(ui.headers[0].sort, None);
        assert_eq!(ui.rows[0][1], "Elko");
        model.update(Message::Enter).unwrap();
        assert_eq!(model.get_uidata().headers[1].sort, Some(SortDirection::Descending));
    }

    #[test]
    fn toggle_all_and_back() {
        let mut model = loaded(12);
        model.update(Message::LastPage).unwrap();
        model.update(Message::ToggleAll).unwrap();
        assert!(model.get_uidata().all_selected);
        assert_eq!(model.get_uidata().selected, vec![true, true]);
        model.update(Message::ToggleAll).unwrap();
        assert!(!model.get_uidata().all_selected);
    }

    #[test]
    fn copy_without_selection_does_nothing() {
        let mut model = loaded(5);
        model.update(Message::CopySelection).unwrap();
        assert_eq!(model.get_uidata().status_message, "Nothing selected");
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = loaded(3);
        model.update(Message::Help).unwrap();
        assert!(model.get_uidata().show_popup);
        model.update(Message::NextPage).unwrap();
        model.update(Message::Exit).unwrap();
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn cursor_stays_on_page() {
        let mut model = loaded(12);
        for _ in 0..15 {
            model.update(Message::MoveDown).unwrap();
        }
        assert_eq!(model.get_uidata().cursor_row, 9);
        model.update(Message::NextPage).unwrap();
        assert_eq!(model.get_uidata().cursor_row, 1);
    }

    #[test]
    fn csv_export_quotes_cells() {
        let a = Record::new().with("name", "Alice Smith").with("note", "say \"hi\"");
        let b = Record::new().with("name", "Bob").with("note", 3i64);
        let headers = vec!["name".to_string(), "note".to_string()];
        assert_eq!(
            selection_as_csv(&headers, &[&a, &b]),
            "name,note\n\"Alice Smith\",\"say \"\"hi\"\"\"\nBob,3"
        );
    }
}
