use std::{
    io::Write,
    path::{Path, PathBuf},
};

use bikeshare_core::{
    Session, aggregate,
    page::{PageControls, PageId, PageRegistry},
};
use rustyline::{DefaultEditor, error::ReadlineError};
use snafu::ResultExt;
use tokio::runtime::Handle;

use crate::{
    error::{
        AggregateSnafu, CliError, CliResult, ReadlineSnafu, ReloadSnafu, ShellThreadSnafu,
        WriteOutputSnafu,
    },
    open_session,
    output::{OutputFormat, PageFormat, aggregation_tabular, write_tabular},
    parse_column, parse_granularity, parse_hour, parse_page, write_page,
};

const HISTORY_FILE: &str = ".bikeshare_history";

#[derive(Debug, PartialEq, Eq)]
enum CommandAction {
    Continue,
    Break,
}

struct ShellContext {
    session: Session,
    registry: PageRegistry,
    controls: PageControls,
    page: PageId,
}

impl ShellContext {
    fn new(session: Session) -> Self {
        ShellContext {
            session,
            registry: PageRegistry::standard(),
            controls: PageControls::default(),
            page: PageId::Geographic,
        }
    }
}

fn print_help<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        r#"commands:
  pages                         list pages (* marks the current one)
  page [<id>]                   switch page and render it (geo|time|stations|demographics)
  show                          render the current page
  set hour <0-23>
  set granularity <date|month|week|day>
  set column <subscriber_type|member_birth_year|member_gender>
  set value [<v>]               demographic value; no value picks the first option
  set top <n>
  set rows <n>                  preview row limit
  select <station>              add a station to the comparison
  unselect [<station>]          remove one station, or all of them
  aggregate [<granularity>]     trip counts per time bucket
  reload                        re-read the data file
  status
  help
  exit | quit"#
    )
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize, String> {
    raw.parse::<usize>()
        .map_err(|_| format!("{key} must be a non-negative integer (got '{raw}')"))
}

fn write_status<W: Write>(ctx: &ShellContext, out: &mut W) -> std::io::Result<()> {
    let session = &ctx.session;
    let controls = &ctx.controls;
    match session.source() {
        Some(path) => writeln!(out, "data: {}", path.display())?,
        None => writeln!(out, "data: (in memory)")?,
    }
    writeln!(
        out,
        "trips: {} (generation {}, loaded {} UTC)",
        session.len(),
        session.generation(),
        session.loaded_at().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(out, "page: {} ({})", ctx.page, ctx.page.title())?;
    writeln!(out, "hour: {}", controls.hour)?;
    writeln!(out, "granularity: {}", controls.granularity)?;
    writeln!(out, "column: {}", controls.demographic_column)?;
    writeln!(
        out,
        "value: {}",
        controls.demographic_value.as_deref().unwrap_or("(first option)")
    )?;
    writeln!(out, "top: {}", controls.top_n)?;
    writeln!(out, "rows: {}", controls.max_rows)?;
    if controls.selected_stations.is_empty() {
        writeln!(out, "stations: (none)")
    } else {
        writeln!(out, "stations: {}", controls.selected_stations.join(" | "))
    }
}

fn apply_setting<W: Write>(
    ctx: &mut ShellContext,
    key: &str,
    value: &str,
    out: &mut W,
) -> CliResult<()> {
    let controls = &mut ctx.controls;
    let message = match key {
        "hour" => {
            controls.hour = parse_hour(value)?;
            format!("hour: {}", controls.hour)
        }
        "granularity" => {
            controls.granularity = parse_granularity(value)?;
            format!("granularity: {}", controls.granularity.label())
        }
        "column" => {
            controls.demographic_column = parse_column(value)?;
            controls.demographic_value = None;
            format!("column: {}", controls.demographic_column.label())
        }
        "value" if value.is_empty() => {
            controls.demographic_value = None;
            "value: (first option)".to_string()
        }
        "value" => {
            controls.demographic_value = Some(value.to_string());
            format!("value: {value}")
        }
        "top" | "rows" => match parse_count(key, value) {
            Ok(n) => {
                if key == "top" {
                    controls.top_n = n;
                } else {
                    controls.max_rows = n;
                }
                format!("{key}: {n}")
            }
            Err(message) => message,
        },
        "" => "set requires a setting name. type 'help'.".to_string(),
        other => format!("unknown setting '{other}'. type 'help'."),
    };
    writeln!(out, "{message}").context(WriteOutputSnafu)
}

async fn process_command<W: Write>(
    ctx: &mut ShellContext,
    trimmed: &str,
    out: &mut W,
) -> CliResult<CommandAction> {
    let (command, rest) = split_word(trimmed);

    match command {
        "exit" | "quit" => return Ok(CommandAction::Break),

        "help" => print_help(out).context(WriteOutputSnafu)?,

        "pages" => {
            for page in ctx.registry.pages() {
                let marker = if page == ctx.page { "*" } else { " " };
                writeln!(out, "{marker} {:<13} {}", page.slug(), page.title())
                    .context(WriteOutputSnafu)?;
            }
        }

        "page" | "show" => {
            if command == "page" && !rest.is_empty() {
                ctx.page = parse_page(rest)?;
            }
            write_page(
                &ctx.registry,
                &ctx.session,
                ctx.page,
                &ctx.controls,
                PageFormat::Table,
                out,
            )?;
        }

        "set" => {
            let (key, value) = split_word(rest);
            apply_setting(ctx, key, value, out)?;
        }

        "select" if rest.is_empty() => {
            writeln!(out, "select requires a station name").context(WriteOutputSnafu)?;
        }

        "select" => {
            let stations = &mut ctx.controls.selected_stations;
            if !stations.iter().any(|s| s == rest) {
                stations.push(rest.to_string());
            }
            writeln!(out, "selected: {}", stations.join(" | ")).context(WriteOutputSnafu)?;
        }

        "unselect" => {
            let stations = &mut ctx.controls.selected_stations;
            if rest.is_empty() {
                stations.clear();
            } else {
                stations.retain(|s| s != rest);
            }
            if stations.is_empty() {
                writeln!(out, "selected: (none)").context(WriteOutputSnafu)?;
            } else {
                writeln!(out, "selected: {}", stations.join(" | ")).context(WriteOutputSnafu)?;
            }
        }

        "aggregate" => {
            let granularity = if rest.is_empty() {
                ctx.controls.granularity
            } else {
                parse_granularity(rest)?
            };
            let result = aggregate(ctx.session.records(), granularity).context(AggregateSnafu)?;
            write_tabular(out, OutputFormat::Table, &aggregation_tabular(&result), &result)?;
        }

        "reload" => {
            let count = ctx.session.reload().await.context(ReloadSnafu)?;
            writeln!(
                out,
                "reloaded {count} trips (generation {})",
                ctx.session.generation()
            )
            .context(WriteOutputSnafu)?;
        }

        "status" => write_status(ctx, out).context(WriteOutputSnafu)?,

        _ => writeln!(out, "unknown command. type 'help'.").context(WriteOutputSnafu)?,
    }

    Ok(CommandAction::Continue)
}

fn default_history_path(data: &Path) -> PathBuf {
    data.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(HISTORY_FILE)
}

fn shell_blocking(handle: Handle, data: PathBuf, history: Option<PathBuf>) -> CliResult<()> {
    let session = handle.block_on(open_session(&data))?;
    let mut ctx = ShellContext::new(session);

    let history_path = history.unwrap_or_else(|| default_history_path(&data));

    let mut rl = DefaultEditor::new().context(ReadlineSnafu)?;

    // history best-effort
    {
        let _ = rl.load_history(&history_path);
    }

    println!("bikeshare shell");
    println!("data: {} ({} trips)", data.display(), ctx.session.len());
    println!("type 'help' for commands\n");

    let mut stdout = std::io::stdout();
    loop {
        let prompt = format!("bikeshare[{}]> ", ctx.page);

        let line = match rl.readline(&prompt) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(e) => {
                println!("readline error: {e}");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let _ = rl.add_history_entry(trimmed);

        match handle.block_on(process_command(&mut ctx, trimmed, &mut stdout)) {
            Ok(CommandAction::Break) => break,
            Ok(CommandAction::Continue) => {}
            Err(e) => eprintln!("{e}"),
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        log::debug!("history not saved to {}: {e}", history_path.display());
    }

    Ok(())
}

/// Run an interactive shell in a blocking thread (rustyline is blocking).
pub async fn cmd_shell(data: PathBuf, history: Option<PathBuf>) -> CliResult<()> {
    let handle = Handle::current();

    tokio::task::spawn_blocking(move || shell_blocking(handle, data, history))
        .await
        .context(ShellThreadSnafu)?
}
