//! Printing of session state: files, suggestions, and the dashboard.

use colored::{ColoredString, Colorize};
use techdesk_application::{DashboardState, DashboardSummary};
use techdesk_core::maintenance::Priority;
use techdesk_core::prompts::SUGGESTED_QUERIES;
use techdesk_core::session::{MessageRole, Session};

use crate::render::render_line;

const BAR_WIDTH: usize = 30;

pub fn print_banner() {
    println!("{}", "=== Techdesk: maintenance manual assistant ===".bright_magenta().bold());
    println!(
        "{}",
        "Load a manual with '/upload <files>', then ask away. '/help' lists commands, 'quit' exits."
            .bright_black()
    );
    println!();
}

pub fn print_help() {
    let rows = [
        ("/upload <files>", "load PDF/PNG/JPEG/WEBP manuals (replaces the current set)"),
        ("/chat", "show the conversation"),
        ("/dash", "show the maintenance dashboard"),
        ("/code [CODE]", "look up a fault code (arms the next input when CODE is omitted)"),
        ("/suggest [N]", "list suggested queries, or send query N"),
        ("/files", "list loaded manuals"),
        ("/reset", "clear the session and start over"),
        ("quit", "exit"),
    ];
    for (command, description) in rows {
        println!("  {:<18} {}", command.bright_cyan(), description.bright_black());
    }
}

pub fn print_files(session: &Session) {
    println!(
        "{}",
        format!("Session {} (started {})", session.id(), session.created_at()).bright_black()
    );
    if session.files().is_empty() {
        println!("{}", "No manual loaded.".bright_black());
        return;
    }
    for file in session.files() {
        println!("  {} {}", file.name.bright_white(), format!("({})", file.mime_type).bright_black());
    }
}

pub fn print_suggestions() {
    println!("{}", "Suggested queries:".bright_yellow());
    for (i, query) in SUGGESTED_QUERIES.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).bright_cyan(), query);
    }
    println!("{}", "Send one with '/suggest N'.".bright_black());
}

/// Reprints the whole conversation.
pub fn print_conversation(session: &Session) {
    for message in session.messages() {
        match message.role {
            MessageRole::User => println!("{}", format!("> {}", message.text).green()),
            MessageRole::Assistant | MessageRole::System => {
                for line in message.text.lines() {
                    println!("{}", render_line(line));
                }
            }
        }
        println!();
    }
}

fn priority_label(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => priority.as_str().bright_red(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::Low => priority.as_str().green(),
    }
}

pub fn print_dashboard(summary: &DashboardSummary) {
    println!("{}", "Maintenance dashboard".bright_magenta().bold());
    match summary.state {
        DashboardState::Analyzing => {
            println!("{}", "Analyzing manual for maintenance tasks...".bright_black());
            return;
        }
        DashboardState::Empty => {
            println!("{}", "No maintenance data extracted.".bright_black());
            return;
        }
        DashboardState::Ready => {}
    }

    println!("{}", format!("{} tasks", summary.total()).bright_white());
    let max = summary.counts.iter().map(|c| c.count).max().unwrap_or(0).max(1);
    for bucket in &summary.counts {
        let width = bucket.count * BAR_WIDTH / max;
        println!(
            "  {:<8} {} {}",
            priority_label(bucket.priority),
            "█".repeat(width),
            bucket.count
        );
    }
    println!();

    for item in &summary.items {
        println!(
            "  [{}] {} {} {}",
            priority_label(item.priority),
            item.component.bright_white().bold(),
            format!("({})", item.interval).bright_black(),
            item.task
        );
    }
}
