//! Terminal rendering for the light markdown the assistant writes.

use colored::Colorize;

/// Buffers streamed fragments and renders each line once it is complete.
#[derive(Debug, Default)]
pub struct LineRenderer {
    pending: String,
    in_fence: bool,
}

impl LineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a fragment and returns the rendered lines it completed.
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        self.pending.push_str(fragment);
        let mut lines = Vec::new();
        while let Some(idx) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=idx).collect();
            if let Some(rendered) = self.render(line.trim_end_matches(['\n', '\r'])) {
                lines.push(rendered);
            }
        }
        lines
    }

    /// Renders whatever is left after the last newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.pending);
        let rendered = self.render(&line);
        self.in_fence = false;
        rendered
    }

    fn render(&mut self, line: &str) -> Option<String> {
        if line.trim_start().starts_with("```") {
            self.in_fence = !self.in_fence;
            return None;
        }
        if self.in_fence {
            return Some(format!("    {}", line.bright_black()));
        }
        Some(render_line(line))
    }
}

/// Renders one line outside a code fence.
pub fn render_line(line: &str) -> String {
    let trimmed = line.trim_start();

    for marker in ["### ", "## ", "# "] {
        if let Some(title) = trimmed.strip_prefix(marker) {
            return title.trim().bright_yellow().bold().to_string();
        }
    }

    if let Some(item) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return format!("  • {}", render_inline(item));
    }

    if let Some((number, item)) = split_numbered(trimmed) {
        return format!("  {}. {}", number.bright_cyan(), render_inline(item));
    }

    if let Some(rest) = trimmed.strip_prefix("**") {
        if let Some((label, tail)) = rest.split_once(":**") {
            let label = format!("{label}:");
            let label = if label.eq_ignore_ascii_case("error:") {
                label.bright_red().bold()
            } else {
                label.bright_white().bold()
            };
            return format!("{}{}", label, render_inline(tail));
        }
    }

    render_inline(line)
}

/// Bolds `**spans**`.
fn render_inline(text: &str) -> String {
    text.split("**")
        .enumerate()
        .map(|(i, segment)| {
            if i % 2 == 1 {
                segment.bold().to_string()
            } else {
                segment.to_string()
            }
        })
        .collect()
}

fn split_numbered(line: &str) -> Option<(&str, &str)> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let item = line[digits..].strip_prefix(". ")?;
    Some((&line[..digits], item))
}
