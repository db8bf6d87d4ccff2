//! termscroll - load log files into a bounded scrollback, then search or export them.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use termscroll::{Config, Console, ExportFormat, LineContext, LineMeta, LineStore, SearchOptions};
use tokio::io::{AsyncBufReadExt, BufReader};

fn cli() -> Command {
    Command::new("termscroll")
        .version(termscroll::VERSION)
        .about("Bounded scrollback buffer with search and multi-format export")
        .long_about(
            "termscroll reads one or more log files concurrently into a bounded \
             scrollback buffer (oldest lines are evicted first), then prints a \
             search report or exports a line range as plain text, ANSI, Markdown or HTML.",
        )
        .arg(
            Arg::new("files")
                .help("Log files to load; each is read by its own task")
                .required(true)
                .num_args(1..)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("max-lines")
                .long("max-lines")
                .short('n')
                .help("Lines to keep before evicting the oldest")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Export format: plain, ansi, markdown, html")
                .default_value("plain")
                .value_parser(|s: &str| s.parse::<ExportFormat>().map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("range")
                .long("range")
                .help("Inclusive line range START:END; empty or negative means open-ended")
                .value_name("START:END")
                .value_parser(parse_range),
        )
        .arg(
            Arg::new("meta")
                .long("meta")
                .help("Include timestamps (document header for Markdown)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write the export to this file instead of stdout")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("search")
                .long("search")
                .short('s')
                .value_name("PATTERN")
                .help("Print matching lines instead of exporting"),
        )
        .arg(
            Arg::new("regex")
                .long("regex")
                .short('E')
                .help("Treat the search pattern as a regular expression")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ignore-case")
                .long("ignore-case")
                .short('i')
                .help("Case-insensitive search")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("theme")
                .long("theme")
                .help("Color theme for ANSI export: default, monochrome, high-contrast"),
        )
}

/// Parse `START:END`, where an empty side means open-ended (-1)
fn parse_range(value: &str) -> std::result::Result<(i64, i64), String> {
    let (start, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", value))?;
    let side = |s: &str| -> std::result::Result<i64, String> {
        if s.trim().is_empty() {
            Ok(-1)
        } else {
            s.trim()
                .parse()
                .map_err(|_| format!("'{}' is not a line number", s))
        }
    };
    Ok((side(start)?, side(end)?))
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    #[cfg(feature = "config")]
    let mut config = Config::load()?;
    #[cfg(not(feature = "config"))]
    let mut config = Config::default();

    config.apply_env();
    if let Some(max_lines) = matches.get_one::<usize>("max-lines") {
        config.max_lines = *max_lines;
    }
    if let Some(theme) = matches.get_one::<String>("theme") {
        config.theme = theme.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Stream one file into the store, one line per append
async fn load_file(store: Arc<LineStore>, path: PathBuf) -> Result<usize> {
    let file = tokio::fs::File::open(&path)
        .await
        .with_context(|| format!("cannot open {}", path.display()))?;
    let tag = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut lines = BufReader::new(file).lines();
    let mut loaded = 0;
    while let Some(text) = lines
        .next_line()
        .await
        .with_context(|| format!("cannot read {}", path.display()))?
    {
        let meta = LineMeta::new(LineContext::detect(&text)).with_tag(tag.as_str());
        store.append(&text, Some(meta))?;
        loaded += 1;
    }
    log::debug!("loaded {} lines from {}", loaded, path.display());
    Ok(loaded)
}

fn print_search(console: &mut Console, pattern: &str, matches: &ArgMatches) -> Result<()> {
    let options = SearchOptions {
        regex_mode: matches.get_flag("regex"),
        case_sensitive: !matches.get_flag("ignore-case"),
        whole_word: false,
    };
    let found = console
        .search_with(pattern, &options)
        .with_context(|| format!("search for '{}' failed", pattern))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut last_line = None;
    for hit in console.search_engine().state().results() {
        if last_line == Some(hit.line) {
            continue;
        }
        last_line = Some(hit.line);
        if let Some(line) = console.line(hit.line) {
            let tag = line.tag().unwrap_or("-");
            writeln!(out, "{}:{}:{}: {}", tag, hit.line, hit.column, line.text())?;
        }
    }
    eprintln!("{} matches", found);
    Ok(())
}

fn export(console: &Console, matches: &ArgMatches) -> Result<()> {
    let format = matches
        .get_one::<ExportFormat>("format")
        .copied()
        .unwrap_or(ExportFormat::Plain);
    let (start, end) = matches
        .get_one::<(i64, i64)>("range")
        .copied()
        .unwrap_or((-1, -1));
    let include_meta = matches.get_flag("meta");

    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            console
                .export_to_file(path, format, start, end, include_meta)
                .with_context(|| format!("export to {} failed", path.display()))?;
            eprintln!("exported {} to {}", format, path.display());
        }
        None => {
            let bytes = console
                .export(format, start, end, include_meta)
                .context("export failed")?;
            std::io::stdout().lock().write_all(&bytes)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; silent unless RUST_LOG is set
    env_logger::init();

    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    let mut console = Console::new(config)?;

    let files: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default();
    for path in &files {
        if !Path::new(path).is_file() {
            anyhow::bail!("Path is not a regular file: {}", path.display());
        }
    }

    let loaders = files
        .into_iter()
        .map(|path| tokio::spawn(load_file(console.store(), path)));
    let loaded: usize = futures::future::try_join_all(loaders)
        .await?
        .into_iter()
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .sum();
    log::info!(
        "read {} lines, {} kept",
        loaded,
        console.line_count()
    );

    match matches.get_one::<String>("search") {
        Some(pattern) => print_search(&mut console, pattern, &matches)?,
        None => export(&console, &matches)?,
    }

    console.shutdown();
    Ok(())
}
