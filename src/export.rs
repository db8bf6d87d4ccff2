//! Export encoder: renders a line range of the store as text, ANSI, Markdown or HTML.
//!
//! Encoding happens entirely under the store lock so every export is a
//! consistent snapshot. Writing to disk happens afterwards, with the lock
//! released, through a temporary file that is renamed into place.

mod encode;

pub use encode::{format_timestamp, TIMESTAMP_FORMAT};

use crate::buffer::LineStore;
use crate::error::{Result, TermscrollError};
use crate::theme::Theme;
use encode::EncodeContext;
use log::{debug, info};
use std::fmt;
use std::fs;
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;

/// Output format for [`Exporter::export`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Plain,
    Ansi,
    Markdown,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Plain, Self::Ansi, Self::Markdown, Self::Html];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Ansi => "ansi",
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Plain => "txt",
            Self::Ansi => "ansi",
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = TermscrollError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(Self::Plain),
            "ansi" => Ok(Self::Ansi),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            other => Err(TermscrollError::invalid_argument(format!(
                "unknown export format '{}'",
                other
            ))),
        }
    }
}

/// Document-level export settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Heading for Markdown and `<title>` for HTML
    pub title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: "Scrollback Export".to_string(),
        }
    }
}

/// Clamp a requested `start..=end` to a store of `len` lines
///
/// Negative `start` means the first line; negative or past-the-end `end`
/// means the last line.
///
/// # Errors
/// * `InvalidRange` if the normalized start lies after the normalized end,
///   which includes every request against an empty store
pub fn normalize_range(start: i64, end: i64, len: usize) -> Result<RangeInclusive<usize>> {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let start = start.max(0);
    let end = if end < 0 || end >= len_i { len_i - 1 } else { end };

    if start > end {
        return Err(TermscrollError::InvalidRange { start, end, len });
    }
    // 0 <= start <= end < len, so both fit in usize
    Ok(start as usize..=end as usize)
}

/// New export files get the same mode as `File::create` (0666 less umask), not the temp file's 0600
#[cfg(unix)]
fn default_permissions(builder: &mut tempfile::Builder<'_, '_>) {
    use std::os::unix::fs::PermissionsExt;
    builder.permissions(fs::Permissions::from_mode(0o666));
}

#[cfg(not(unix))]
fn default_permissions(_builder: &mut tempfile::Builder<'_, '_>) {}

/// Renders store contents with a theme and document settings
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
    theme: Theme,
}

impl Exporter {
    pub fn new(config: ExportConfig, theme: Theme) -> Self {
        Self { config, theme }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Encode lines `start..=end` of `store`
    ///
    /// # Arguments
    /// * `format` - Output format
    /// * `start` - First line, negative for the oldest line
    /// * `end` - Last line (inclusive), negative or out of range for the newest line
    /// * `include_meta` - Prefix per-line timestamps (document header for Markdown)
    ///
    /// # Returns
    /// * The encoded bytes, owned by the caller
    ///
    /// # Errors
    /// * `InvalidRange` for an inverted range or an empty store
    /// * `OutOfMemory` if the output buffer cannot be reserved
    /// * `NotInitialized` if the store was closed
    pub fn export(
        &self,
        store: &LineStore,
        format: ExportFormat,
        start: i64,
        end: i64,
        include_meta: bool,
    ) -> Result<Vec<u8>> {
        let encoded = store.scan(|snap| {
            let range = normalize_range(start, end, snap.len())?;
            let ctx = EncodeContext {
                theme: &self.theme,
                title: &self.config.title,
                include_meta,
                first: *range.start(),
                last: *range.end(),
            };
            let lines = snap.range(*range.start()..*range.end() + 1);
            match format {
                ExportFormat::Plain => encode::plain(lines, &ctx),
                ExportFormat::Ansi => encode::ansi(lines, &ctx),
                ExportFormat::Markdown => encode::markdown(lines, &ctx),
                ExportFormat::Html => encode::html(lines, &ctx),
            }
        })??;

        debug!("encoded {} export: {} bytes", format, encoded.len());
        Ok(encoded.into_bytes())
    }

    /// Encode like [`Exporter::export`] and write the result to `path`
    ///
    /// The bytes are written to a temporary file next to the target and
    /// renamed over it, so the target ends up holding either the old contents
    /// or the complete export. A symlinked `path` is resolved first and its
    /// target is replaced; an existing target keeps its permissions.
    ///
    /// # Errors
    /// * Everything [`Exporter::export`] returns, before any file is touched
    /// * `Io` if the file cannot be created, written or moved into place
    pub fn export_to_file(
        &self,
        store: &LineStore,
        path: impl AsRef<Path>,
        format: ExportFormat,
        start: i64,
        end: i64,
        include_meta: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.export(store, format, start, end, include_meta)?;

        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let existing = fs::metadata(&target).ok().map(|meta| meta.permissions());
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".termscroll-");
        if existing.is_none() {
            default_permissions(&mut builder);
        }
        let mut file = builder.tempfile_in(dir).map_err(|e| {
            TermscrollError::io(format!("cannot create file in {}", dir.display()), e)
        })?;
        if let Some(permissions) = existing {
            file.as_file().set_permissions(permissions).map_err(|e| {
                TermscrollError::io(format!("cannot copy permissions of {}", target.display()), e)
            })?;
        }
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|e| TermscrollError::io(format!("cannot write {}", target.display()), e))?;
        file.persist(&target).map_err(|e| {
            TermscrollError::io(format!("cannot replace {}", target.display()), e.error)
        })?;

        info!("exported {} bytes as {} to {}", bytes.len(), format, path.display());
        Ok(())
    }
}
