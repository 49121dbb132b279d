//! Markdown output for reports, rich via termimad or plain.
//!
//! Report lines are tinted by the status icon the core crate's `Display`
//! implementations put in front of each item, so failures stand out in a
//! long run.

use std::io::{self, Write};

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// How a markdown line of a report is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Heading,
    Success,
    Failure,
    Pending,
    Plain,
}

impl LineKind {
    fn of(line: &str) -> Self {
        if line.starts_with('#') {
            return LineKind::Heading;
        }
        if line.starts_with("Not attempted") || line.starts_with("Interrupted") {
            return LineKind::Failure;
        }
        match line.strip_prefix("- ").and_then(|item| item.chars().next()) {
            Some('✓') => LineKind::Success,
            Some('✗') => LineKind::Failure,
            Some('○' | '➤') => LineKind::Pending,
            _ => LineKind::Plain,
        }
    }
}

/// Prints markdown reports, styled when color is enabled.
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
    success: MadSkin,
    failure: MadSkin,
    pending: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.bold.set_fg(Color::Yellow);
        skin.inline_code.set_fg(Color::Cyan);
        skin.inline_code.set_bg(Color::AnsiValue(236));

        let tinted = |color| {
            let mut tinted = skin.clone();
            tinted.paragraph.set_fg(color);
            tinted
        };

        Self {
            rich_enabled,
            success: tinted(Color::Green),
            failure: tinted(Color::Red),
            pending: tinted(Color::DarkGrey),
            skin,
        }
    }

    /// Prints a markdown report to stdout.
    pub fn render(&self, markdown: &str) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.render_to(&mut out, markdown)?;
        out.flush()?;
        Ok(())
    }

    fn render_to<W: Write>(&self, out: &mut W, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            write!(out, "{markdown}")?;
            return Ok(());
        }

        for line in markdown.lines() {
            let skin = match LineKind::of(line) {
                LineKind::Heading => {
                    writeln!(out, "\x1b[1;34m{line}\x1b[0m")?;
                    continue;
                }
                LineKind::Success => &self.success,
                LineKind::Failure => &self.failure,
                LineKind::Pending => &self.pending,
                LineKind::Plain => &self.skin,
            };
            writeln!(out, "{}", skin.inline(line))?;
        }
        Ok(())
    }
}
