//! CLI front end for the bike-share trip dashboard.

mod error;
mod output;
mod shell;

use std::io::Write;
use std::path::{Path, PathBuf};

use bikeshare_core::{
    BucketGranularity, Session, aggregate,
    demographics::DemographicColumn,
    hourly::Hour,
    page::{DEFAULT_MAX_ROWS, PageControls, PageId, PageRegistry, RecordingSink},
    stations::{DEFAULT_TOP_N, station_counts},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use snafu::ResultExt;

use crate::{
    error::{
        AggregateSnafu, CliResult, InvalidColumnSnafu, InvalidGranularitySnafu, InvalidHourSnafu,
        InvalidPageSnafu, OpenSessionSnafu, RenderPageSnafu,
    },
    output::{
        OutputFormat, PageEntry, PageFormat, TerminalSink, aggregation_tabular, pages_tabular,
        stations_tabular, write_json, write_tabular,
    },
    shell::cmd_shell,
};

const DATA_ENV: &str = "BIKESHARE_DATA";

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormatArg {
    #[default]
    Table,
    Json,
    Csv,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(v: OutputFormatArg) -> Self {
        match v {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum PageFormatArg {
    #[default]
    Table,
    Json,
}

impl From<PageFormatArg> for PageFormat {
    fn from(v: PageFormatArg) -> Self {
        match v {
            PageFormatArg::Table => PageFormat::Table,
            PageFormatArg::Json => PageFormat::Json,
        }
    }
}

/// Selections that drive page output.
#[derive(Debug, Args)]
struct ControlArgs {
    /// Hour of day shown on the region maps (0-23)
    #[arg(long)]
    hour: Option<String>,

    /// Time resolution: date, month, week or day
    #[arg(long)]
    granularity: Option<String>,

    /// Start station to compare (repeatable)
    #[arg(long = "station")]
    stations: Vec<String>,

    /// Demographic column: subscriber_type, member_birth_year or member_gender
    #[arg(long)]
    column: Option<String>,

    /// Demographic value to filter on (default: first available value)
    #[arg(long)]
    value: Option<String>,

    /// How many top stations the station page offers
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// Preview row limit for tables
    #[arg(long, default_value_t = DEFAULT_MAX_ROWS)]
    max_rows: usize,
}

impl ControlArgs {
    fn into_controls(self) -> CliResult<PageControls> {
        let mut controls = PageControls {
            selected_stations: self.stations,
            demographic_value: self.value,
            top_n: self.top,
            max_rows: self.max_rows,
            ..PageControls::default()
        };
        if let Some(hour) = self.hour {
            controls.hour = parse_hour(&hour)?;
        }
        if let Some(granularity) = self.granularity {
            controls.granularity = parse_granularity(&granularity)?;
        }
        if let Some(column) = self.column {
            controls.demographic_column = parse_column(&column)?;
        }
        Ok(controls)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the dashboard pages
    Pages {
        #[arg(long, value_enum, default_value_t = OutputFormatArg::Table)]
        format: OutputFormatArg,
    },

    /// Count trips per time bucket
    Aggregate {
        /// Trip export (.parquet or .csv)
        #[arg(long, env = DATA_ENV)]
        data: PathBuf,

        /// date, month, week or day
        #[arg(long, default_value = "date")]
        granularity: String,

        #[arg(long, value_enum, default_value_t = OutputFormatArg::Table)]
        format: OutputFormatArg,
    },

    /// Render one dashboard page
    Render {
        /// Trip export (.parquet or .csv)
        #[arg(long, env = DATA_ENV)]
        data: PathBuf,

        /// geo, time, stations or demographics
        #[arg(long)]
        page: String,

        #[command(flatten)]
        controls: ControlArgs,

        #[arg(long, value_enum, default_value_t = PageFormatArg::Table)]
        format: PageFormatArg,
    },

    /// Rank start stations by number of trips
    Stations {
        /// Trip export (.parquet or .csv)
        #[arg(long, env = DATA_ENV)]
        data: PathBuf,

        /// Only show the busiest N stations
        #[arg(long)]
        top: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormatArg::Table)]
        format: OutputFormatArg,
    },

    /// Interactive shell (keeps one loaded session; supports reload)
    Shell {
        /// Trip export (.parquet or .csv)
        #[arg(long, env = DATA_ENV)]
        data: PathBuf,

        /// Optional history file path
        #[arg(long)]
        history: Option<PathBuf>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "bikeshare", version, about = "Bike-share trip dashboard")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

fn parse_granularity(spec: &str) -> CliResult<BucketGranularity> {
    spec.parse::<BucketGranularity>()
        .context(InvalidGranularitySnafu { spec })
}

fn parse_hour(spec: &str) -> CliResult<Hour> {
    spec.parse::<Hour>().context(InvalidHourSnafu { spec })
}

fn parse_page(spec: &str) -> CliResult<PageId> {
    spec.parse::<PageId>().context(InvalidPageSnafu { spec })
}

fn parse_column(spec: &str) -> CliResult<DemographicColumn> {
    spec.parse::<DemographicColumn>()
        .context(InvalidColumnSnafu { spec })
}

async fn open_session(data: &Path) -> CliResult<Session> {
    let session = Session::open(data).await.context(OpenSessionSnafu)?;
    log::debug!("opened {} with {} trips", data.display(), session.len());
    Ok(session)
}

/// Render `page` to `out` in the requested format.
fn write_page<W: Write>(
    registry: &PageRegistry,
    session: &Session,
    page: PageId,
    controls: &PageControls,
    format: PageFormat,
    out: &mut W,
) -> CliResult<()> {
    match format {
        PageFormat::Table => {
            let mut sink = TerminalSink::new(&mut *out);
            registry
                .render(page, session, controls, &mut sink)
                .context(RenderPageSnafu { page })
        }
        PageFormat::Json => {
            let mut sink = RecordingSink::new();
            registry
                .render(page, session, controls, &mut sink)
                .context(RenderPageSnafu { page })?;
            write_json(out, sink.elements())
        }
    }
}

fn cmd_pages(format: OutputFormat) -> CliResult<()> {
    let registry = PageRegistry::standard();
    let pages: Vec<PageEntry> = registry.pages().map(PageEntry::from).collect();
    let mut stdout = std::io::stdout().lock();
    write_tabular(&mut stdout, format, &pages_tabular(&pages), &pages)
}

async fn cmd_aggregate(data: &Path, granularity: &str, format: OutputFormat) -> CliResult<()> {
    let granularity = parse_granularity(granularity)?;
    let session = open_session(data).await?;
    let result = aggregate(session.records(), granularity).context(AggregateSnafu)?;

    let mut stdout = std::io::stdout().lock();
    write_tabular(&mut stdout, format, &aggregation_tabular(&result), &result)
}

async fn cmd_render(
    data: &Path,
    page: &str,
    controls: ControlArgs,
    format: PageFormat,
) -> CliResult<()> {
    let page = parse_page(page)?;
    let controls = controls.into_controls()?;
    let session = open_session(data).await?;

    let registry = PageRegistry::standard();
    let mut stdout = std::io::stdout().lock();
    write_page(&registry, &session, page, &controls, format, &mut stdout)
}

async fn cmd_stations(data: &Path, top: Option<usize>, format: OutputFormat) -> CliResult<()> {
    let session = open_session(data).await?;
    let mut counts = station_counts(session.records());
    if let Some(n) = top {
        counts.truncate(n);
    }

    let mut stdout = std::io::stdout().lock();
    write_tabular(&mut stdout, format, &stations_tabular(&counts), &counts)
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Pages { format } => cmd_pages(format.into()),

        Command::Aggregate {
            data,
            granularity,
            format,
        } => cmd_aggregate(&data, &granularity, format.into()).await,

        Command::Render {
            data,
            page,
            controls,
            format,
        } => cmd_render(&data, &page, controls, format.into()).await,

        Command::Stations { data, top, format } => cmd_stations(&data, top, format.into()).await,

        Command::Shell { data, history } => cmd_shell(data, history).await,
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run().await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
