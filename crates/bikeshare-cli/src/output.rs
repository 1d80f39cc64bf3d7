use std::{io::Write, sync::Arc};

use arrow::{
    array::{ArrayRef, RecordBatch, StringArray},
    datatypes::{DataType, Field, Schema},
};

use bikeshare_core::{
    AggregationResult,
    page::{Chart, ChartKind, Element, MapPanel, OptionList, PageId, PageSink, TablePanel},
    stations::StationCount,
};
use serde::Serialize;
use snafu::ResultExt;
use tabled::{
    builder::Builder,
    settings::{Style, object::Rows, style::LineText, width::MinWidth},
};

use crate::error::{CliResult, EncodeJsonSnafu, WriteCsvSnafu, WriteOutputSnafu};

const CAPTION_OFFSET: usize = 6;
const PREVIEW_LABEL: &str = "Preview output";

/// Output format for tabular commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Output format for rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    Table,
    Json,
}

/// Rows ready for the terminal or CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tabular {
    pub caption: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct PageEntry {
    pub page: &'static str,
    pub title: &'static str,
}

impl From<PageId> for PageEntry {
    fn from(page: PageId) -> Self {
        PageEntry {
            page: page.slug(),
            title: page.title(),
        }
    }
}

pub fn render_table(caption: Option<&str>, columns: &[String], rows: &[Vec<String>]) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let mut builder = Builder::default();
    builder.push_record(columns);
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());

    if let Some(caption) = caption {
        let min_width = CAPTION_OFFSET + caption.len() + 4;
        table.with(MinWidth::new(min_width));
        table.with(LineText::new(caption.to_string(), Rows::first()).offset(CAPTION_OFFSET));
        // LineText re-estimates dimensions, so re-apply MinWidth afterwards.
        table.with(MinWidth::new(min_width));
    }
    table.to_string()
}

/// Write `rows` under `columns` through the Arrow CSV writer.
pub fn write_csv<W: Write>(
    out: &mut W,
    columns: &[String],
    rows: &[Vec<String>],
) -> CliResult<()> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, false))
        .collect();
    let arrays: Vec<ArrayRef> = (0..columns.len())
        .map(|col| {
            let values = rows.iter().map(|row| row.get(col).map_or("", String::as_str));
            Arc::new(StringArray::from_iter_values(values)) as ArrayRef
        })
        .collect();
    let batch =
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context(WriteCsvSnafu)?;

    // An empty batch still writes the header line.
    let mut writer = arrow_csv::WriterBuilder::new().build(&mut *out);
    writer.write(&batch).context(WriteCsvSnafu)
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value).context(EncodeJsonSnafu)?;
    writeln!(out).context(WriteOutputSnafu)
}

/// Write `tabular` as a table or CSV, or `value` as JSON.
pub fn write_tabular<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    format: OutputFormat,
    tabular: &Tabular,
    value: &T,
) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            let rendered = render_table(tabular.caption.as_deref(), &tabular.columns, &tabular.rows);
            writeln!(out, "{rendered}").context(WriteOutputSnafu)?;
            if tabular.rows.is_empty() {
                writeln!(out, "(no rows)").context(WriteOutputSnafu)?;
            }
            Ok(())
        }
        OutputFormat::Csv => write_csv(out, &tabular.columns, &tabular.rows),
        OutputFormat::Json => write_json(out, value),
    }
}

pub fn aggregation_tabular(result: &AggregationResult) -> Tabular {
    let granularity = result.granularity();
    Tabular {
        caption: Some(granularity.label().to_string()),
        columns: vec![
            granularity.axis_title().to_string(),
            "Number of Rides".to_string(),
        ],
        rows: result
            .iter()
            .map(|b| vec![b.key.to_string(), b.count.to_string()])
            .collect(),
    }
}

pub fn stations_tabular(counts: &[StationCount]) -> Tabular {
    Tabular {
        caption: Some("Start stations".to_string()),
        columns: vec![
            "rank".to_string(),
            "start_station_name".to_string(),
            "trip_count".to_string(),
        ],
        rows: counts
            .iter()
            .enumerate()
            .map(|(i, c)| vec![(i + 1).to_string(), c.station.clone(), c.trip_count.to_string()])
            .collect(),
    }
}

pub fn pages_tabular(pages: &[PageEntry]) -> Tabular {
    Tabular {
        caption: None,
        columns: vec!["page".to_string(), "title".to_string()],
        rows: pages
            .iter()
            .map(|p| vec![p.page.to_string(), p.title.to_string()])
            .collect(),
    }
}

fn chart_caption(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Bar => "Bar chart",
        ChartKind::HorizontalBar => "Horizontal bar chart",
        ChartKind::Area => "Area chart",
        ChartKind::StepArea => "Step area chart",
    }
}

/// Page sink that draws elements as plain text and rounded tables.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        TerminalSink { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn underline(&mut self, text: &str, mark: char) -> std::io::Result<()> {
        let rule: String = std::iter::repeat_n(mark, text.chars().count()).collect();
        writeln!(self.out, "{text}")?;
        writeln!(self.out, "{rule}")
    }

    fn options(&mut self, options: &OptionList) -> std::io::Result<()> {
        writeln!(self.out, "{}:", options.label)?;
        if options.values.is_empty() {
            return writeln!(self.out, "  (none)");
        }
        for value in &options.values {
            writeln!(self.out, "  - {value}")?;
        }
        Ok(())
    }

    fn chart(&mut self, chart: &Chart) -> std::io::Result<()> {
        let columns = [chart.label_title.clone(), chart.value_title.clone()];
        let rows: Vec<Vec<String>> = chart
            .points
            .iter()
            .map(|p| vec![p.label.clone(), p.value.to_string()])
            .collect();
        writeln!(
            self.out,
            "{}",
            render_table(Some(chart_caption(chart.kind)), &columns, &rows)
        )?;
        if rows.is_empty() {
            writeln!(self.out, "(no data)")?;
        }
        Ok(())
    }

    fn map(&mut self, map: &MapPanel) -> std::io::Result<()> {
        writeln!(
            self.out,
            "{} at {:02}:00: {} trip starts",
            map.title,
            map.hour.get(),
            map.points.len()
        )?;
        match &map.view {
            Some(view) => writeln!(
                self.out,
                "  center {:.4}, {:.4} (zoom {}, pitch {})",
                view.latitude, view.longitude, view.zoom, view.pitch
            ),
            None => writeln!(self.out, "  no station coordinates for this area"),
        }
    }

    fn table(&mut self, table: &TablePanel) -> std::io::Result<()> {
        if table.total_rows == 0 {
            return writeln!(self.out, "(no rows)");
        }
        writeln!(
            self.out,
            "{}",
            render_table(Some(PREVIEW_LABEL), &table.columns, &table.rows)
        )?;
        if table.rows.len() < table.total_rows {
            writeln!(
                self.out,
                "(showing {} of {} rows)",
                table.rows.len(),
                table.total_rows
            )?;
        }
        Ok(())
    }
}

impl<W: Write> PageSink for TerminalSink<W> {
    fn emit(&mut self, element: Element) -> std::io::Result<()> {
        match &element {
            Element::Title(text) => self.underline(text, '='),
            Element::Header(text) => {
                writeln!(self.out)?;
                self.underline(text, '-')
            }
            Element::Text(text) => writeln!(self.out, "{text}"),
            Element::Info(text) => writeln!(self.out, "note: {text}"),
            Element::Options(options) => self.options(options),
            Element::Chart(chart) => self.chart(chart),
            Element::Map(map) => self.map(map),
            Element::Table(table) => self.table(table),
        }
    }
}
