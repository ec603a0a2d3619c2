//! Data sources.
//!
//! A data source delivers the complete dataset in one call. The fetch runs
//! on its own worker thread and hands its result to the UI loop as a
//! `Message::DataArrived`. A failing fetch is only logged.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, error, info, trace};

use crate::domain::{Message, TVError};
use crate::record::{Record, Value};

pub trait DataSource: Send + 'static {
    /// Short name shown as the table caption.
    fn name(&self) -> String;

    fn fetch(&self) -> Result<Vec<Record>, TVError>;
}

/// Runs `source.fetch()` in the background. On success the records are sent
/// as `Message::DataArrived`, on failure nothing is sent and the view stays
/// empty.
pub fn spawn_fetch(source: Box<dyn DataSource>, tx: Sender<Message>) -> JoinHandle<()> {
    thread::spawn(move || {
        let name = source.name();
        let start_time = Instant::now();
        match source.fetch() {
            Ok(records) => {
                info!(
                    "Fetched {} records from {name} in {}ms",
                    records.len(),
                    start_time.elapsed().as_millis()
                );
                if tx.send(Message::DataArrived(name, records)).is_err() {
                    debug!("Receiver is gone, dropping fetched records");
                }
            }
            Err(e) => error!("Fetching data from {name} failed: {e}"),
        }
    })
}

// ------------------------------ JSON ----------------------------------- //

/// Parses a JSON array of flat objects. Object key order is kept.
pub fn parse_json(text: &str) -> Result<Vec<Record>, TVError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        return Err(TVError::LoadingFailed("expected a JSON array".into()));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .fold(Record::new(), |record, (k, v)| record.with(k, json_scalar(v)))),
            _ => Err(TVError::LoadingFailed(format!(
                "array element {idx} is not an object"
            ))),
        })
        .collect()
}

fn json_scalar(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) => Value::Number(f),
            None => Value::Text(n.to_string()),
        },
        serde_json::Value::Bool(b) => Value::Text(b.to_string()),
        serde_json::Value::Null => Value::Text(String::new()),
        nested => {
            trace!("Nested JSON value flattened to text: {nested}");
            Value::Text(nested.to_string())
        }
    }
}

// ------------------------------ HTTP ----------------------------------- //

pub struct HttpSource {
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl DataSource for HttpSource {
    fn name(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Vec<Record>, TVError> {
        debug!("GET {}", self.url);
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("dtv/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let body = client.get(&self.url).send()?.error_for_status()?.text()?;
        trace!("Received {} bytes", body.len());
        parse_json(&body)
    }
}

// ------------------------------ Files ---------------------------------- //

#[derive(Debug, PartialEq)]
enum FileType {
    JSON,
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn detect_file_type(path: &Path) -> Result<FileType, TVError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("JSON") => Ok(FileType::JSON),
            Some("CSV") => Ok(FileType::CSV),
            Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
            Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
            _ => Err(TVError::UnknownFileType),
        }
    }

    fn check_file(path: &Path) -> Result<u64, TVError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TVError::FileNotFound,
            ErrorKind::PermissionDenied => TVError::PermissionDenied,
            _ => TVError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(TVError::LoadingFailed("Not a file!".into()));
        }
        Ok(metadata.len())
    }

    fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .finish()
    }

    fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
    }

    fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_ipc(
            PlPath::Local(path.into()),
            polars::io::ipc::IpcScanOptions,
            UnifiedScanArgs::default(),
        )
    }
}

impl DataSource for FileSource {
    fn name(&self) -> String {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string()
    }

    fn fetch(&self) -> Result<Vec<Record>, TVError> {
        let file_size = Self::check_file(&self.path)?;
        let file_type = Self::detect_file_type(&self.path)?;
        debug!("Loading {:?} ({file_type:?}, {file_size} bytes)", self.path);

        let frame = match file_type {
            FileType::JSON => return parse_json(&fs::read_to_string(&self.path)?),
            FileType::CSV => Self::load_csv(&self.path)?,
            FileType::PARQUET => Self::load_parquet(&self.path)?,
            FileType::ARROW => Self::load_arrow(&self.path)?,
        };
        Ok(frame_to_records(&frame.collect()?)?)
    }
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Converts one column to cell values. Numeric columns become numbers,
/// everything else is kept as text, nulls become empty text.
fn load_column(df: &DataFrame, col_name: &str) -> Result<Vec<Value>, PolarsError> {
    let numeric = is_numeric_type(df.column(col_name)?.dtype());

    let col = df.column(col_name)?.cast(&DataType::String)?;
    let series = col.str()?;
    let values = series
        .into_iter()
        .map(|value| match value {
            Some(s) if numeric => s
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::Text(s.to_string())),
            Some(s) => Value::Text(s.to_string()),
            None => Value::Text(String::new()),
        })
        .collect();
    Ok(values)
}

/// Builds records from a data frame, each column converted on its own thread.
fn frame_to_records(df: &DataFrame) -> Result<Vec<Record>, PolarsError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let columns = names
        .par_iter()
        .map(|name| load_column(df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = vec![Record::new(); df.height()];
    for (name, values) in names.iter().zip(columns) {
        for (record, value) in records.iter_mut().zip(values) {
            record.insert(name.as_str(), value);
        }
    }
    Ok(records)
}
