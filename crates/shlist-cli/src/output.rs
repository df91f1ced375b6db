//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use shlist_core::{ListItem, ListSnapshot, ShlistError};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single list with its items
    pub fn print_list(&self, list: &ListItem) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", list.id);
                println!("Name:    {}", list.name);
                println!(
                    "Status:  {}",
                    if list.enabled { "active" } else { "completed" }
                );
                if let Some(created) = list.created_date {
                    println!("Created: {}", created.format("%Y-%m-%d %H:%M"));
                }
                println!();
                for item in &list.items {
                    println!("  - {}", item.name);
                }
            }
            OutputFormat::Json => {
                println!("{}", to_json(list));
            }
            OutputFormat::Quiet => {
                println!("{}", list.id);
            }
        }
    }

    /// Print the lists loaded by a view
    pub fn print_snapshot(&self, snapshot: &ListSnapshot) {
        match self.format {
            OutputFormat::Human => {
                if snapshot.lists.is_empty() {
                    println!("No {} lists.", snapshot.category);
                    return;
                }
                for list in &snapshot.lists {
                    let created = list
                        .created_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:>6} | {} | {} | {} item(s)",
                        list.id.to_string(),
                        created,
                        truncate(&list.name, 30),
                        list.items.len()
                    );
                }
                println!(
                    "\n{} of {} list(s){}",
                    snapshot.lists.len(),
                    snapshot.total_elements,
                    if snapshot.state.has_more {
                        " - more available"
                    } else {
                        ""
                    }
                );
            }
            OutputFormat::Json => {
                println!("{}", to_json(snapshot));
            }
            OutputFormat::Quiet => {
                for list in &snapshot.lists {
                    println!("{}", list.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning (always to stderr)
    pub fn warn(&self, msg: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", msg);
        }
    }

    /// Print an operation failure as a notification
    pub fn notify_error(&self, error: &ShlistError) {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "error",
                        "title": error.title(),
                        "message": error.user_message(),
                        "detail": error.to_string()
                    })
                );
            }
            _ => {
                eprintln!("✗ {}", error.title());
                for line in error.user_message().lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
