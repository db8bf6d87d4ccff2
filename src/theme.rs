//! Color themes using ratatui styles
//!
//! A [`Theme`] maps each predefined [`LineContext`] to a ratatui [`Style`] and
//! carries the handful of UI symbols a renderer draws. Themes are plain values:
//! whoever needs one (console, exporter, renderer) receives it explicitly.

use crate::buffer::LineContext;
use crate::error::{Result, TermscrollError};
use ratatui::style::{Color, Modifier, Style};

/// UI glyphs a renderer may draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Prompt,
    MultilinePrompt,
    StatusSeparator,
    ScrollIndicator,
    SearchMatch,
}

impl Symbol {
    const COUNT: usize = 5;

    fn slot(self) -> usize {
        match self {
            Symbol::Prompt => 0,
            Symbol::MultilinePrompt => 1,
            Symbol::StatusSeparator => 2,
            Symbol::ScrollIndicator => 3,
            Symbol::SearchMatch => 4,
        }
    }
}

/// Per-context styles and symbols
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    name: String,
    /// Indexed by predefined context code
    styles: [Style; 10],
    symbols: [String; Symbol::COUNT],
}

impl Default for Theme {
    /// Bold red/yellow/green/cyan/magenta for the severity contexts
    fn default() -> Self {
        let bold = |color| Style::default().fg(color).add_modifier(Modifier::BOLD);
        Self {
            name: "default".to_string(),
            styles: [
                Style::default(),
                bold(Color::Red),
                bold(Color::Yellow),
                bold(Color::Green),
                bold(Color::Cyan),
                bold(Color::Magenta),
                Style::default().fg(Color::Yellow),
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Cyan),
                Style::default().fg(Color::Magenta),
            ],
            symbols: [
                "> ".to_string(),
                "... ".to_string(),
                " | ".to_string(),
                " [SCROLL] ".to_string(),
                ">".to_string(),
            ],
        }
    }
}

impl Theme {
    /// Names accepted by [`Theme::builtin`]
    pub const BUILTIN_NAMES: [&'static str; 3] = ["default", "monochrome", "high-contrast"];

    /// A new theme called `name`, starting from the default styles
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Look up a built-in theme by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "monochrome" => Some(Self::monochrome()),
            "high-contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    /// Like [`Theme::builtin`] but reports unknown names as an error
    pub fn from_name(name: &str) -> Result<Self> {
        Self::builtin(name).ok_or_else(|| {
            TermscrollError::config(format!(
                "unknown theme '{}' (expected one of: {})",
                name,
                Self::BUILTIN_NAMES.join(", ")
            ))
        })
    }

    /// Attributes only, for terminals without color support
    pub fn monochrome() -> Self {
        let mut theme = Self::new("monochrome");
        theme.styles = [Style::default(); 10];
        theme.styles[1] = Style::default().add_modifier(Modifier::BOLD);
        theme.styles[2] = Style::default().add_modifier(Modifier::BOLD);
        theme.styles[5] = Style::default().add_modifier(Modifier::DIM);
        theme.styles[9] = Style::default().add_modifier(Modifier::REVERSED);
        theme
    }

    /// Bright colors for accessibility
    pub fn high_contrast() -> Self {
        let mut theme = Self::new("high-contrast");
        let bright = |color| Style::default().fg(color).add_modifier(Modifier::BOLD);
        theme.styles = [
            Style::default().fg(Color::White),
            bright(Color::LightRed),
            bright(Color::LightYellow),
            bright(Color::LightGreen),
            bright(Color::LightCyan),
            bright(Color::LightMagenta),
            bright(Color::LightYellow),
            Style::default().fg(Color::LightGreen),
            Style::default().fg(Color::LightCyan),
            Style::default().fg(Color::Black).bg(Color::LightYellow),
        ];
        theme
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Style for `context`; caller-defined contexts use the Normal style
    pub fn style_for(&self, context: LineContext) -> Style {
        match context {
            LineContext::User(_) => self.styles[0],
            predefined => self.styles[predefined.code() as usize],
        }
    }

    /// Replace the style of a predefined context
    pub fn set_style(&mut self, context: LineContext, style: Style) -> Result<()> {
        if context.is_user() {
            return Err(TermscrollError::invalid_argument(
                "themes only style predefined contexts",
            ));
        }
        self.styles[context.code() as usize] = style;
        Ok(())
    }

    /// Set foreground and background colors, keeping modifiers
    pub fn set_colors(&mut self, context: LineContext, fg: Color, bg: Color) -> Result<()> {
        let style = self.style_for(context).fg(fg).bg(bg);
        self.set_style(context, style)
    }

    pub fn symbol(&self, symbol: Symbol) -> &str {
        &self.symbols[symbol.slot()]
    }

    pub fn set_symbol(&mut self, symbol: Symbol, value: impl Into<String>) {
        self.symbols[symbol.slot()] = value.into();
    }

    /// SGR escape sequence that switches a terminal to the style of `context`
    pub fn ansi_prefix(&self, context: LineContext) -> String {
        let style = self.style_for(context);
        let mut params = Vec::with_capacity(4);
        let modifiers = style.add_modifier;

        params.push(if modifiers.contains(Modifier::BOLD) { "1" } else { "0" }.to_string());
        for (modifier, code) in [
            (Modifier::DIM, "2"),
            (Modifier::ITALIC, "3"),
            (Modifier::UNDERLINED, "4"),
            (Modifier::REVERSED, "7"),
        ] {
            if modifiers.contains(modifier) {
                params.push(code.to_string());
            }
        }
        if let Some(fg) = style.fg {
            params.push(sgr_color(fg, false));
        }
        if let Some(bg) = style.bg {
            params.push(sgr_color(bg, true));
        }

        format!("\x1b[{}m", params.join(";"))
    }
}

fn sgr_color(color: Color, background: bool) -> String {
    let base = |code: u8| (if background { code + 10 } else { code }).to_string();
    match color {
        Color::Reset => base(39),
        Color::Black => base(30),
        Color::Red => base(31),
        Color::Green => base(32),
        Color::Yellow => base(33),
        Color::Blue => base(34),
        Color::Magenta => base(35),
        Color::Cyan => base(36),
        Color::Gray => base(37),
        Color::DarkGray => base(90),
        Color::LightRed => base(91),
        Color::LightGreen => base(92),
        Color::LightYellow => base(93),
        Color::LightBlue => base(94),
        Color::LightMagenta => base(95),
        Color::LightCyan => base(96),
        Color::White => base(97),
        Color::Indexed(n) => format!("{};5;{}", if background { 48 } else { 38 }, n),
        Color::Rgb(r, g, b) => format!("{};2;{};{};{}", if background { 48 } else { 38 }, r, g, b),
    }
}
