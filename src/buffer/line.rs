//! Line records stored in the scrollback buffer.
//!
//! A [`Line`] is immutable once it has been appended: the store hands out
//! clones, never references that outlive its lock.

use crate::error::{Result, TermscrollError};

/// Semantic category of a line, interpreted by renderers and exporters for styling.
///
/// The ten predefined contexts use codes 0-9. Caller-defined contexts start at
/// [`LineContext::USER_START`]; codes in between are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineContext {
    #[default]
    Normal,
    Error,
    Warning,
    Success,
    Info,
    Debug,
    /// Echo of user command input
    Command,
    Comment,
    Special,
    Search,
    /// Caller-defined context `n`, carried as code `USER_START + n`
    User(u16),
}

impl LineContext {
    /// First raw code available to caller-defined contexts
    pub const USER_START: u32 = 100;

    /// The predefined contexts in code order
    pub const PREDEFINED: [LineContext; 10] = [
        LineContext::Normal,
        LineContext::Error,
        LineContext::Warning,
        LineContext::Success,
        LineContext::Info,
        LineContext::Debug,
        LineContext::Command,
        LineContext::Comment,
        LineContext::Special,
        LineContext::Search,
    ];

    /// Raw numeric code of this context
    pub fn code(self) -> u32 {
        match self {
            LineContext::Normal => 0,
            LineContext::Error => 1,
            LineContext::Warning => 2,
            LineContext::Success => 3,
            LineContext::Info => 4,
            LineContext::Debug => 5,
            LineContext::Command => 6,
            LineContext::Comment => 7,
            LineContext::Special => 8,
            LineContext::Search => 9,
            LineContext::User(n) => Self::USER_START + u32::from(n),
        }
    }

    /// Resolve a raw code, rejecting the reserved range 10-99
    pub fn from_code(code: u32) -> Result<Self> {
        if let Some(context) = Self::PREDEFINED.get(code as usize) {
            return Ok(*context);
        }
        if code < Self::USER_START {
            return Err(TermscrollError::invalid_argument(format!(
                "context code {code} is reserved"
            )));
        }
        u16::try_from(code - Self::USER_START)
            .map(LineContext::User)
            .map_err(|_| {
                TermscrollError::invalid_argument(format!("context code {code} is out of range"))
            })
    }

    /// Whether this is a caller-defined context
    pub fn is_user(self) -> bool {
        matches!(self, LineContext::User(_))
    }

    /// Guess a context from common log-level markers in `text`
    pub fn detect(text: &str) -> Self {
        let upper = text.to_uppercase();
        if upper.contains("ERROR") || upper.contains("[E]") || upper.contains("ERR]") {
            LineContext::Error
        } else if upper.contains("WARN") || upper.contains("[W]") || upper.contains("WRN]") {
            LineContext::Warning
        } else if upper.contains("SUCCESS") || upper.contains("[OK]") {
            LineContext::Success
        } else if upper.contains("INFO") || upper.contains("[I]") || upper.contains("INF]") {
            LineContext::Info
        } else if upper.contains("DEBUG")
            || upper.contains("TRACE")
            || upper.contains("[D]")
            || upper.contains("DBG]")
        {
            LineContext::Debug
        } else {
            LineContext::Normal
        }
    }
}

impl TryFrom<u32> for LineContext {
    type Error = TermscrollError;

    fn try_from(code: u32) -> Result<Self> {
        Self::from_code(code)
    }
}

/// Per-line metadata: context, creation time and an optional tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMeta {
    pub context: LineContext,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub tag: Option<String>,
}

impl LineMeta {
    /// Metadata with the given context, stamped with the current time
    pub fn new(context: LineContext) -> Self {
        Self {
            context,
            timestamp: chrono::Utc::now().timestamp(),
            tag: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

impl Default for LineMeta {
    fn default() -> Self {
        Self::new(LineContext::Normal)
    }
}

/// A single buffered line of text with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: String,
    meta: LineMeta,
}

impl Line {
    /// Copy `text` into a new line, reporting allocation failure instead of aborting
    pub(crate) fn copy_from(text: &str, meta: LineMeta) -> Result<Self> {
        let mut owned = String::new();
        owned.try_reserve_exact(text.len())?;
        owned.push_str(text);
        Ok(Self { text: owned, meta })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn meta(&self) -> &LineMeta {
        &self.meta
    }

    pub fn context(&self) -> LineContext {
        self.meta.context
    }

    pub fn timestamp(&self) -> i64 {
        self.meta.timestamp
    }

    pub fn tag(&self) -> Option<&str> {
        self.meta.tag.as_deref()
    }
}
