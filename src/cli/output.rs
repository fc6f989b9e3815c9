//! Styled terminal output for Factorizer
//!
//! Consistent symbols and colours for command results. Logging goes through
//! `tracing` on stderr; this is only for what the user asked to see.

use console::style;

/// Output handler for consistent CLI formatting
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    /// Create a new output handler
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        // Errors are always shown, even in quiet mode
        eprintln!("{} {}", style("✖").red(), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    /// Print a verbose message (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            println!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    /// Print a key/value row
    pub fn table_row(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<20} {}", style(key).dim(), value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        println!("  • {item}");
    }

    /// Print a section separator
    pub fn separator(&self) {
        if !self.quiet {
            println!("{}", style("─".repeat(50)).dim());
        }
    }

    /// Print blank line
    pub fn blank_line(&self) {
        if !self.quiet {
            println!();
        }
    }
}
