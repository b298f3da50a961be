//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the Multiscout CLI.

use crate::activity::{ActivityEvent, EventKind};
use crate::types::ResearchResult;
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the startup banner
    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "multiscout".bright_cyan().bold(),
                version.dimmed(),
                "Multi-agent web research".bright_white()
            );
        } else {
            println!("\n   multiscout {}\n   Multi-agent web research\n", version);
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print one activity event as a timeline line
    pub fn event(&self, event: &ActivityEvent) {
        let time = event.timestamp.format("%H:%M:%S").to_string();
        if !self.colored {
            println!("  {} [{}] {}", time, event_label(event.kind), event.message);
            return;
        }

        let label = format!("{:<8}", event_label(event.kind));
        let label = match event.kind {
            EventKind::Start => label.bright_cyan().bold().to_string(),
            EventKind::Info => label.blue().to_string(),
            EventKind::Progress => label.bright_white().to_string(),
            EventKind::Source => label.green().to_string(),
            EventKind::Complete => label.bright_green().bold().to_string(),
            EventKind::Error => label.red().bold().to_string(),
        };
        println!("  {} {} {}", time.dimmed(), label, event.message);
    }

    /// Print the final research report
    pub fn report(&self, result: &ResearchResult, duration_ms: u64) {
        self.header("Report");
        println!();
        for line in result.synthesis.lines() {
            println!("  {}", line);
        }

        self.header("Subagents");
        for subtask in &result.subtask_results {
            self.list_item(&format!(
                "{}. {} ({} sources)",
                subtask.subtask,
                subtask.search_focus,
                subtask.sources.len()
            ));
            for source in &subtask.sources {
                let line = match &source.url {
                    Some(url) => format!("      {} <{}>", source.title, url),
                    None => format!("      {}", source.title),
                };
                if self.colored {
                    println!("{}", line.dimmed());
                } else {
                    println!("{}", line);
                }
            }
        }

        self.header("Summary");
        self.kv("Model", &result.model);
        self.kv("Sources", &result.total_sources.to_string());
        self.kv(
            "Complexity",
            &format!(
                "{}/5{}",
                result.analysis.complexity_score,
                if result.analysis.fallback {
                    " (default plan)"
                } else {
                    ""
                }
            ),
        );
        self.kv("Duration", &format!("{:.1}s", duration_ms as f64 / 1000.0));
        println!();
    }
}

fn event_label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Start => "start",
        EventKind::Info => "info",
        EventKind::Progress => "progress",
        EventKind::Source => "source",
        EventKind::Complete => "complete",
        EventKind::Error => "error",
    }
}
