//! Dashboard pages and the registry that dispatches to them.
//!
//! Every page is a plain function of the shared [`Session`], the current
//! [`PageControls`], and a [`PageSink`]. The [`PageRegistry`] maps page
//! identifiers to those functions so front ends can list and render pages
//! without knowing what each one does.

use std::{fmt, str::FromStr};

use serde::Serialize;
use snafu::prelude::*;

use crate::{
    aggregate::AggregateError, demographics::DemographicColumn, granularity::BucketGranularity,
    hourly::Hour, session::Session, stations::DEFAULT_TOP_N,
};

mod render;
pub mod sink;

pub use sink::{
    Chart, ChartKind, ChartPoint, Element, MapPanel, OptionList, PageSink, RecordingSink,
    TablePanel,
};

/// Default number of preview rows in table panels.
pub const DEFAULT_MAX_ROWS: usize = 10;

/// Errors raised while rendering a page.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PageError {
    /// The time aggregation rejected the data.
    #[snafu(display("time aggregation failed: {source}"))]
    Aggregate {
        /// Underlying aggregation error.
        source: AggregateError,
    },

    /// The sink failed to accept output.
    #[snafu(display("failed to write page output: {source}"))]
    Sink {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// No renderer is registered under this page.
    #[snafu(display("page '{page}' is not registered"))]
    NotRegistered {
        /// The requested page.
        page: PageId,
    },
}

/// Error returned when a page name is not recognised.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display("unknown page '{input}' (expected geo|time|stations|demographics)"))]
pub struct ParsePageError {
    input: String,
}

/// The dashboard's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageId {
    /// Region maps and the rides-per-hour distribution.
    Geographic,
    /// Trip counts over time at a selectable granularity.
    Time,
    /// Trip counts for selected busy start stations.
    StartStation,
    /// Demographic filtering and per-station totals.
    Demographics,
}

impl PageId {
    /// Pages in navigation order.
    pub const ALL: [PageId; 4] = [
        PageId::Geographic,
        PageId::Time,
        PageId::StartStation,
        PageId::Demographics,
    ];

    /// Short name used on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            PageId::Geographic => "geo",
            PageId::Time => "time",
            PageId::StartStation => "stations",
            PageId::Demographics => "demographics",
        }
    }

    /// Navigation title.
    pub fn title(&self) -> &'static str {
        match self {
            PageId::Geographic => "Geographical Analysis",
            PageId::Time => "Time Analysis",
            PageId::StartStation => "Start Station Analysis",
            PageId::Demographics => "User Demographics Comparison",
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PageId {
    type Err = ParsePageError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let key = trimmed.to_ascii_lowercase();
        for page in PageId::ALL {
            if key == page.slug() || key == page.title().to_ascii_lowercase() {
                return Ok(page);
            }
        }
        match key.as_str() {
            "geographic" | "geography" | "map" => Ok(PageId::Geographic),
            "station" | "start-station" | "start_station" => Ok(PageId::StartStation),
            "demo" | "users" => Ok(PageId::Demographics),
            _ => ParsePageSnafu { input: trimmed }.fail(),
        }
    }
}

/// User selections that drive page output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    /// Hour shown on the region maps.
    pub hour: Hour,
    /// Time resolution on the time page.
    pub granularity: BucketGranularity,
    /// Stations compared on the station page.
    pub selected_stations: Vec<String>,
    /// Column filtered on the demographics page.
    pub demographic_column: DemographicColumn,
    /// Raw filter value; `None` picks the first available option.
    pub demographic_value: Option<String>,
    /// How many top stations the station page offers.
    pub top_n: usize,
    /// Preview row limit for table panels.
    pub max_rows: usize,
}

impl Default for PageControls {
    fn default() -> Self {
        PageControls {
            hour: Hour::default(),
            granularity: BucketGranularity::default(),
            selected_stations: Vec::new(),
            demographic_column: DemographicColumn::default(),
            demographic_value: None,
            top_n: DEFAULT_TOP_N,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

/// Signature shared by every page renderer.
pub type RenderFn = fn(&Session, &PageControls, &mut dyn PageSink) -> Result<(), PageError>;

/// Ordered mapping from page to renderer.
#[derive(Clone, Default)]
pub struct PageRegistry {
    pages: Vec<(PageId, RenderFn)>,
}

impl fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.pages.iter().map(|(id, _)| id))
            .finish()
    }
}

impl PageRegistry {
    /// A registry with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// The four dashboard pages in navigation order.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(PageId::Geographic, render::geographic);
        registry.register(PageId::Time, render::time);
        registry.register(PageId::StartStation, render::start_station);
        registry.register(PageId::Demographics, render::demographics);
        registry
    }

    /// Register `render` for `page`, replacing any existing renderer while
    /// keeping its position.
    pub fn register(&mut self, page: PageId, render: RenderFn) {
        match self.pages.iter_mut().find(|(id, _)| *id == page) {
            Some(slot) => slot.1 = render,
            None => self.pages.push((page, render)),
        }
    }

    /// Registered pages in order.
    pub fn pages(&self) -> impl Iterator<Item = PageId> + '_ {
        self.pages.iter().map(|(id, _)| *id)
    }

    /// Renderer for `page`, if registered.
    pub fn get(&self, page: PageId) -> Option<RenderFn> {
        self.pages
            .iter()
            .find(|(id, _)| *id == page)
            .map(|(_, f)| *f)
    }

    /// Render `page` into `sink`.
    pub fn render(
        &self,
        page: PageId,
        session: &Session,
        controls: &PageControls,
        sink: &mut dyn PageSink,
    ) -> Result<(), PageError> {
        let render = self.get(page).context(NotRegisteredSnafu { page })?;
        log::debug!(
            "rendering page {page} over {} trips (generation {})",
            session.len(),
            session.generation()
        );
        render(session, controls, sink)
    }
}
