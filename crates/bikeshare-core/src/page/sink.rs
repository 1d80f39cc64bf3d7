//! Output elements produced by page renderers and the sink trait that
//! receives them.
//!
//! Renderers never draw anything themselves; they describe what to show as
//! a sequence of [`Element`]s. A front end implements [`PageSink`] to turn
//! those into terminal tables, JSON, or a web view.

use std::io;

use serde::Serialize;

use crate::{
    demographics::CategoryValue,
    hourly::Hour,
    region::{MapPoint, MapView},
};

/// How a chart should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Vertical bars.
    Bar,
    /// Horizontal bars sorted by value.
    HorizontalBar,
    /// Filled area.
    Area,
    /// Filled area with step-after interpolation.
    StepArea,
}

/// One labelled value on a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    /// Category label (x axis for vertical charts).
    pub label: String,
    /// Value (y axis for vertical charts).
    pub value: u64,
}

/// A single-series categorical chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chart {
    /// Drawing style.
    pub kind: ChartKind,
    /// Title of the category axis.
    pub label_title: String,
    /// Title of the value axis.
    pub value_title: String,
    /// Points in display order.
    pub points: Vec<ChartPoint>,
}

impl Chart {
    /// Build a chart from `(label, value)` pairs.
    pub fn from_series(
        kind: ChartKind,
        label_title: impl Into<String>,
        value_title: impl Into<String>,
        series: impl IntoIterator<Item = (String, u64)>,
    ) -> Self {
        Chart {
            kind,
            label_title: label_title.into(),
            value_title: value_title.into(),
            points: series
                .into_iter()
                .map(|(label, value)| ChartPoint { label, value })
                .collect(),
        }
    }
}

/// A map of trip start positions for one region at one hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPanel {
    /// Panel subtitle.
    pub title: String,
    /// Hour the points were taken from.
    pub hour: Hour,
    /// Camera position; `None` when the region has no coordinates.
    pub view: Option<MapView>,
    /// Start positions to bin into the hexagon layer.
    pub points: Vec<MapPoint>,
}

/// A preview of tabular rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablePanel {
    /// Column headers.
    pub columns: Vec<String>,
    /// Preview rows, at most the requested row limit.
    pub rows: Vec<Vec<String>>,
    /// Number of rows before truncation.
    pub total_rows: usize,
}

/// Choices offered by a selector control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionList {
    /// Selector caption.
    pub label: String,
    /// Available values in display order.
    pub values: Vec<String>,
}

impl OptionList {
    /// Options built from category values.
    pub fn from_categories(label: impl Into<String>, values: &[CategoryValue]) -> Self {
        OptionList {
            label: label.into(),
            values: values.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Something a page wants displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Element {
    /// Page title.
    Title(String),
    /// Section header.
    Header(String),
    /// Body text.
    Text(String),
    /// Informational notice.
    Info(String),
    /// Selector choices.
    Options(OptionList),
    /// A chart.
    Chart(Chart),
    /// A region map.
    Map(MapPanel),
    /// A table preview.
    Table(TablePanel),
}

/// Receiver for page output.
pub trait PageSink {
    /// Accept one element.
    fn emit(&mut self, element: Element) -> io::Result<()>;

    /// Emit a page title.
    fn title(&mut self, text: &str) -> io::Result<()> {
        self.emit(Element::Title(text.to_string()))
    }

    /// Emit a section header.
    fn header(&mut self, text: &str) -> io::Result<()> {
        self.emit(Element::Header(text.to_string()))
    }

    /// Emit body text.
    fn text(&mut self, text: &str) -> io::Result<()> {
        self.emit(Element::Text(text.to_string()))
    }

    /// Emit an informational notice.
    fn info(&mut self, text: &str) -> io::Result<()> {
        self.emit(Element::Info(text.to_string()))
    }
}

/// Sink that keeps every element in memory.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RecordingSink {
    elements: Vec<Element>,
}

impl RecordingSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements received so far, in order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Consume the sink, returning its elements.
    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    /// All charts received so far.
    pub fn charts(&self) -> impl Iterator<Item = &Chart> {
        self.elements.iter().filter_map(|e| match e {
            Element::Chart(c) => Some(c),
            _ => None,
        })
    }
}

impl PageSink for RecordingSink {
    fn emit(&mut self, element: Element) -> io::Result<()> {
        self.elements.push(element);
        Ok(())
    }
}
