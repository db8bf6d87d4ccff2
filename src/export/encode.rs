//! Format encoders for scrollback exports.
//!
//! Each encoder writes into one `String` whose capacity is reserved up front
//! from the exact line lengths plus a fixed per-line overhead, so an oversized
//! export fails with `OutOfMemory` instead of aborting mid-way.

use crate::buffer::{Line, LineContext};
use crate::error::Result;
use crate::theme::Theme;
use chrono::{DateTime, Local};

/// `strftime` layout for every rendered timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_DIM: &str = "\x1b[2m";
/// Rendered width of `[YYYY-MM-DD HH:MM:SS] `
const STAMP_WIDTH: usize = 22;

const HTML_STYLE: &str = "\
body { background: #000; color: #fff; font-family: monospace; }
.error { color: #f00; font-weight: bold; }
.warning { color: #ff0; font-weight: bold; }
.success { color: #0f0; font-weight: bold; }
.info { color: #0ff; font-weight: bold; }
.meta { color: #888; font-size: 0.9em; }
";

/// Everything an encoder needs besides the lines themselves
pub(crate) struct EncodeContext<'a> {
    pub theme: &'a Theme,
    pub title: &'a str,
    pub include_meta: bool,
    /// Normalized inclusive range, for the Markdown header
    pub first: usize,
    pub last: usize,
}

/// Format a unix timestamp in local time
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
        None => "????-??-?? ??:??:??".to_string(),
    }
}

fn reserve(budget: usize) -> Result<String> {
    let mut out = String::new();
    out.try_reserve_exact(budget)?;
    Ok(out)
}

pub(crate) fn plain<'l>(
    lines: impl ExactSizeIterator<Item = &'l Line> + Clone,
    ctx: &EncodeContext<'_>,
) -> Result<String> {
    let per_line = 1 + if ctx.include_meta { STAMP_WIDTH } else { 0 };
    let budget = text_len(lines.clone()) + lines.len() * per_line;
    let mut out = reserve(budget)?;

    for line in lines {
        if ctx.include_meta {
            out.push('[');
            out.push_str(&format_timestamp(line.timestamp()));
            out.push_str("] ");
        }
        out.push_str(line.text());
        out.push('\n');
    }
    Ok(out)
}

pub(crate) fn ansi<'l>(
    lines: impl ExactSizeIterator<Item = &'l Line> + Clone,
    ctx: &EncodeContext<'_>,
) -> Result<String> {
    // Longest prefix the default themes produce is `\x1b[1;38;2;r;g;b;48;2;r;g;bm`
    let per_line = 40 + ANSI_RESET.len() + 1;
    let meta = if ctx.include_meta {
        ANSI_DIM.len() + STAMP_WIDTH + ANSI_RESET.len()
    } else {
        0
    };
    let budget = text_len(lines.clone()) + lines.len() * (per_line + meta);
    let mut out = reserve(budget)?;

    for line in lines {
        if ctx.include_meta {
            out.push_str(ANSI_DIM);
            out.push('[');
            out.push_str(&format_timestamp(line.timestamp()));
            out.push(']');
            out.push_str(ANSI_RESET);
            out.push(' ');
        }
        out.push_str(&ctx.theme.ansi_prefix(line.context()));
        out.push_str(line.text());
        out.push_str(ANSI_RESET);
        out.push('\n');
    }
    Ok(out)
}

pub(crate) fn markdown<'l>(
    lines: impl ExactSizeIterator<Item = &'l Line> + Clone,
    ctx: &EncodeContext<'_>,
) -> Result<String> {
    let fence = "`".repeat(longest_backtick_run(lines.clone()).max(2) + 1);
    let header = 64 + ctx.title.len() + 2 * fence.len();
    let budget = header + text_len(lines.clone()) + lines.len();
    let mut out = reserve(budget)?;

    out.push_str("# ");
    out.push_str(ctx.title);
    out.push_str("\n\n");
    if ctx.include_meta {
        let now = Local::now().format(TIMESTAMP_FORMAT);
        out.push_str(&format!("**Export Date**: {}\n\n", now));
        out.push_str(&format!("**Lines**: {}-{}\n\n", ctx.first, ctx.last));
    }
    out.push_str("## Output\n\n");
    out.push_str(&fence);
    out.push('\n');
    for line in lines {
        out.push_str(line.text());
        out.push('\n');
    }
    out.push_str(&fence);
    out.push('\n');
    Ok(out)
}

pub(crate) fn html<'l>(
    lines: impl ExactSizeIterator<Item = &'l Line> + Clone,
    ctx: &EncodeContext<'_>,
) -> Result<String> {
    let escaped: usize = lines.clone().map(|l| escaped_len(l.text())).sum();
    let per_line = 32 + if ctx.include_meta { 24 + STAMP_WIDTH } else { 0 };
    let budget = 256 + HTML_STYLE.len() + escaped_len(ctx.title) + escaped + lines.len() * per_line;
    let mut out = reserve(budget)?;

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<title>");
    escape_into(&mut out, ctx.title);
    out.push_str("</title>\n<style>\n");
    out.push_str(HTML_STYLE);
    out.push_str("</style>\n</head>\n<body>\n<pre>\n");

    for line in lines {
        if ctx.include_meta {
            out.push_str("<span class=\"meta\">[");
            out.push_str(&format_timestamp(line.timestamp()));
            out.push_str("]</span> ");
        }
        match css_class(line.context()) {
            Some(class) => {
                out.push_str("<span class=\"");
                out.push_str(class);
                out.push_str("\">");
                escape_into(&mut out, line.text());
                out.push_str("</span>\n");
            }
            None => {
                escape_into(&mut out, line.text());
                out.push('\n');
            }
        }
    }

    out.push_str("</pre>\n</body>\n</html>\n");
    Ok(out)
}

/// Stylesheet class for contexts the HTML export colors
fn css_class(context: LineContext) -> Option<&'static str> {
    match context {
        LineContext::Error => Some("error"),
        LineContext::Warning => Some("warning"),
        LineContext::Success => Some("success"),
        LineContext::Info => Some("info"),
        _ => None,
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}

fn escaped_len(text: &str) -> usize {
    text.bytes()
        .map(|b| match b {
            b'&' => 5,
            b'<' | b'>' => 4,
            _ => 1,
        })
        .sum()
}

fn text_len<'l>(lines: impl Iterator<Item = &'l Line>) -> usize {
    lines.map(|l| l.text().len()).sum()
}

fn longest_backtick_run<'l>(lines: impl Iterator<Item = &'l Line>) -> usize {
    lines
        .map(|line| {
            line.text()
                .split(|c| c != '`')
                .map(str::len)
                .max()
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0)
}
