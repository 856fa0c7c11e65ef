//! Printers: colored status lines and box-drawn tables.

use std::io::{self, Write};

use owo_colors::OwoColorize;

pub mod table;

pub use table::{Cell, Table};

/// Status and progress output. Write failures are ignored.
pub struct Console<W: Write> {
    out: W,
    color: bool,
    verbose: bool,
}

impl Console<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color, verbose: false }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn title(&mut self, text: &str) {
        let _ = writeln!(self.out);
        if self.color {
            let _ = writeln!(self.out, "{}", text.bold());
        } else {
            let _ = writeln!(self.out, "{}", text);
        }
    }

    pub fn success(&mut self, text: &str) {
        if self.color {
            let _ = writeln!(self.out, "{}", text.green());
        } else {
            let _ = writeln!(self.out, "{}", text);
        }
    }

    pub fn info(&mut self, text: &str) {
        if self.color {
            let _ = writeln!(self.out, "{}", text.cyan());
        } else {
            let _ = writeln!(self.out, "{}", text);
        }
    }

    pub fn warn(&mut self, text: &str) {
        if self.color {
            let _ = writeln!(self.out, "{}", text.yellow());
        } else {
            let _ = writeln!(self.out, "{}", text);
        }
    }

    /// `✗ <text>`, red when colored.
    pub fn error(&mut self, text: &str) {
        let line = format!("✗ {}", text);
        if self.color {
            let _ = writeln!(self.out, "{}", line.red());
        } else {
            let _ = writeln!(self.out, "{}", line);
        }
    }

    /// Only printed with `--verbose`.
    pub fn detail(&mut self, text: &str) {
        if !self.verbose {
            return;
        }
        if self.color {
            let _ = writeln!(self.out, "  {}", text.dimmed());
        } else {
            let _ = writeln!(self.out, "  {}", text);
        }
    }

    pub fn table(&mut self, table: &Table) {
        let _ = write!(self.out, "{}", table.render());
    }

    pub fn flush(&mut self) {
        let _ = self.out.flush();
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
