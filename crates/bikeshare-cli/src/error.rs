use bikeshare_core::{
    AggregateError, ParseGranularityError, SessionError,
    demographics::ParseColumnError,
    hourly::ParseHourError,
    page::{PageError, PageId, ParsePageError},
};

use arrow::error::ArrowError;
use snafu::Snafu;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Invalid --granularity '{spec}': {source}"))]
    InvalidGranularity {
        spec: String,
        source: ParseGranularityError,
    },

    #[snafu(display("Invalid --hour '{spec}': {source}"))]
    InvalidHour {
        spec: String,
        source: ParseHourError,
    },

    #[snafu(display("Invalid --page '{spec}': {source}"))]
    InvalidPage {
        spec: String,
        source: ParsePageError,
    },

    #[snafu(display("Invalid --column '{spec}': {source}"))]
    InvalidColumn {
        spec: String,
        source: ParseColumnError,
    },

    #[snafu(display("Failed to open trip data: {source}"))]
    OpenSession {
        #[snafu(source(from(SessionError, Box::new)))]
        source: Box<SessionError>,
    },

    #[snafu(display("Reload failed; keeping the previous snapshot: {source}"))]
    Reload {
        #[snafu(source(from(SessionError, Box::new)))]
        source: Box<SessionError>,
    },

    #[snafu(display("Aggregation failed: {source}"))]
    Aggregate { source: AggregateError },

    #[snafu(display("Failed to render page '{page}': {source}"))]
    RenderPage { page: PageId, source: PageError },

    #[snafu(display("Failed to write output: {source}"))]
    WriteOutput { source: std::io::Error },

    #[snafu(display("Failed to write CSV output: {source}"))]
    WriteCsv { source: ArrowError },

    #[snafu(display("Failed to encode JSON output: {source}"))]
    EncodeJson { source: serde_json::Error },

    #[snafu(display("Failed to initialize readline: {source}"))]
    Readline {
        source: rustyline::error::ReadlineError,
    },

    #[snafu(display("Shell thread failed: {source}"))]
    ShellThread { source: tokio::task::JoinError },
}
