use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

use crate::paginator::PageSize;

pub const HELP_TEXT: &str = "\
Navigation
  ←/→          select column
  ↑/↓          select row
  n, PgDown    next page
  p, PgUp      previous page
  Home / End   first / last page
  :            jump to page (confirm with Enter)

Table
  s, Enter     sort by selected column (again to reverse)
  S            back to the original order
  /            search in all columns
  + / -        change rows per page
  Space        toggle row selection
  a            toggle selection of the whole page
  y            copy selected rows

  ?            show this help
  Esc          close popup / cancel input
  q            quit";

#[derive(Debug, Error)]
pub enum TVError {
    #[error("io error: {0}")]
    IoError(#[from] Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type")]
    UnknownFileType,
    #[error("not a page number: {0:?}")]
    InvalidPageNumber(String),
    #[error("unsupported page size {0}, expected one of 10, 20, 30, 50")]
    InvalidPageSize(usize),
    #[error("unknown column {0:?}")]
    UnknownColumn(String),
    #[error("row {index} is outside of the current page ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },
}

/// What the command line input is currently used for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    Search,
    JumpToPage,
}

#[derive(Debug)]
pub enum Message {
    Quit,
    Help,
    Exit,
    Enter,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    FirstPage,
    PrevPage,
    NextPage,
    LastPage,
    JumpToPage,
    Search,
    SortByColumn,
    ClearSort,
    IncreasePageSize,
    DecreasePageSize,
    ToggleRow,
    ToggleAll,
    CopySelection,
    RawKey(KeyEvent),
    DataArrived(String, Vec<crate::record::Record>),
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct TVConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub page_size: PageSize,
}

impl Default for TVConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
            page_size: PageSize::default(),
        }
    }
}
