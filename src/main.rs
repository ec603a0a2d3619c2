use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver};

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{error, info, info_span};
use tracing_error::{ErrorLayer, SpanTrace};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod compare;
mod controller;
mod domain;
mod filter;
mod inputter;
mod model;
mod paginator;
mod record;
mod selection;
mod source;
mod ui;
mod view_state;

use controller::Controller;
use domain::{Message, TVConfig, TVError};
use model::{Model, Status};
use paginator::PageSize;
use source::{DataSource, FileSource, HttpSource, spawn_fetch};
use ui::TableUI;

/// Browse a dataset as a searchable, sortable and paginated table.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Data file to show (.json, .csv, .parquet, .arrow)
    #[arg(required_unless_present = "url", conflicts_with = "url")]
    path: Option<String>,

    /// Fetch a JSON array of objects from this URL
    #[arg(long)]
    url: Option<String>,

    /// Rows per page, one of 10, 20, 30, 50
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Maximum rendered column width
    #[arg(long, default_value_t = 40)]
    max_column_width: usize,

    /// Terminal event poll time in ms
    #[arg(long, default_value_t = 100)]
    event_poll_time: u64,

    /// Log file, defaults to dtv.log in the temp directory
    #[arg(long)]
    log_file: Option<String>,

    /// Log filter directive, RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn expand_path(path: &str) -> Result<PathBuf, TVError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| TVError::LoadingFailed(e.to_string()))
}

fn init_logging(args: &Args) -> Result<PathBuf, TVError> {
    let path = match &args.log_file {
        Some(p) => expand_path(p)?,
        None => std::env::temp_dir().join("dtv.log"),
    };
    let file = File::create(&path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // The terminal belongs to the UI, logs go to a file
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(path)
}

fn build_config(args: &Args) -> Result<TVConfig, TVError> {
    Ok(TVConfig::default()
        .with_event_poll_time(args.event_poll_time)
        .with_max_column_width(args.max_column_width)
        .with_page_size(PageSize::try_from(args.page_size)?))
}

fn data_source(args: &Args) -> Result<Box<dyn DataSource>, TVError> {
    match (&args.url, &args.path) {
        (Some(url), _) => Ok(Box::new(HttpSource::new(url.as_str()))),
        (None, Some(path)) => Ok(Box::new(FileSource::new(expand_path(path)?))),
        (None, None) => Err(TVError::LoadingFailed("No data source given".into())),
    }
}

fn run(args: Args) -> Result<(), TVError> {
    let log_path = init_logging(&args)?;
    let span = info_span!("dtv");
    let _enter = span.enter();
    info!("Starting dtv, logging to {log_path:?}");

    let config = build_config(&args)?;
    let source = data_source(&args)?;

    // The fetch runs in the background, the table stays empty until it is done
    let (tx, rx) = mpsc::channel();
    spawn_fetch(source, tx);

    let mut model = Model::init(&config);
    let mut ui = TableUI::new();
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut model, &mut ui, &controller, &rx);
    ratatui::restore();

    if let Err(e) = &result {
        error!("Stopped with error: {e}\n{}", SpanTrace::capture());
    }
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    model: &mut Model,
    ui: &mut TableUI,
    controller: &Controller,
    rx: &Receiver<Message>,
) -> Result<(), TVError> {
    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        // Data arriving from the fetch thread
        while let Ok(message) = rx.try_recv() {
            model.update(message)?;
        }

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(model)? {
            model.update(message)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn needs_exactly_one_source() {
        assert!(Args::try_parse_from(["dtv"]).is_err());
        assert!(Args::try_parse_from(["dtv", "data.json", "--url", "http://x"]).is_err());
        let args = Args::try_parse_from(["dtv", "--url", "http://localhost/data.json"]).unwrap();
        assert!(args.path.is_none());
        assert_eq!(data_source(&args).unwrap().name(), "http://localhost/data.json");
    }

    #[test]
    fn page_size_is_validated() {
        let args = Args::try_parse_from(["dtv", "data.csv", "--page-size", "30"]).unwrap();
        assert_eq!(build_config(&args).unwrap().page_size, PageSize::Thirty);
        let args = Args::try_parse_from(["dtv", "data.csv", "--page-size", "25"]).unwrap();
        assert!(matches!(
            build_config(&args),
            Err(TVError::InvalidPageSize(25))
        ));
    }
}
