use crate::core::{EventOption, MatchListView};
use std::io::{self, Write};

/// Presentation capability consumed by the flows
///
/// Each call replaces whatever the renderer showed before for that region.
pub trait Renderer {
    fn render_events(&mut self, options: &[EventOption]) -> io::Result<()>;
    fn render_matches(&mut self, view: &MatchListView) -> io::Result<()>;
    fn alert(&mut self, message: &str) -> io::Result<()>;
}

/// Plain-text renderer for terminals and log files
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_events(&mut self, options: &[EventOption]) -> io::Result<()> {
        for option in options {
            writeln!(self.out, "{}", option.label)?;
        }
        self.out.flush()
    }

    fn render_matches(&mut self, view: &MatchListView) -> io::Result<()> {
        writeln!(self.out, "{}", view)?;
        self.out.flush()
    }

    fn alert(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "! {}", message)?;
        self.out.flush()
    }
}
