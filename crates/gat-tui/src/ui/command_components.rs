/// Command execution UI components
///
/// Provides rendering helpers for displaying command results and output.
use crate::message::CommandResult;

/// Command result modal renderer
pub struct CommandResultModal;

impl CommandResultModal {
    /// Render command result as formatted text
    /// Returns lines of formatted output suitable for display
    pub fn render(result: &CommandResult) -> Vec<String> {
        let mut lines = Vec::new();

        // Header box
        lines
            .push("╔════════════════════════════════════════════════════════════════╗".to_string());
        lines
            .push("║                    COMMAND EXECUTION RESULT                    ║".to_string());
        lines
            .push("╚════════════════════════════════════════════════════════════════╝".to_string());
        lines.push(String::new());

        // Command info
        lines.push("Command:".to_string());
        lines.push(format!("  {}", result.command));
        lines.push(String::new());

        // Exit code with color indicator
        let status_indicator = if result.exit_code == 0 {
            "✓ Success"
        } else if result.timed_out {
            "⏱ Timeout"
        } else {
            "✗ Failed"
        };
        lines.push(format!(
            "Status: {} (exit code: {})",
            status_indicator, result.exit_code
        ));

        // Duration
        let duration_sec = result.duration_ms as f64 / 1000.0;
        lines.push(format!("Duration: {:.2}s", duration_sec));

        // Timeout indicator
        if result.timed_out {
            lines.push("⚠ Command timed out".to_string());
        }

        lines.push(String::new());
        lines.push("─".repeat(66));
        lines.push(String::new());

        // Standard output section
        if !result.stdout.is_empty() {
            lines.push("STDOUT:".to_string());
            for line in result.stdout.lines() {
                lines.push(format!("  {}", line));
            }
            lines.push(String::new());
        }

        // Standard error section
        if !result.stderr.is_empty() {
            lines.push("STDERR:".to_string());
            for line in result.stderr.lines() {
                lines.push(format!("  {}", line));
            }
            lines.push(String::new());
        }

        // Empty output indicator
        if result.stdout.is_empty() && result.stderr.is_empty() {
            lines.push("(No output)".to_string());
            lines.push(String::new());
        }

        // Footer
        lines.push("─".repeat(66));
        lines.push("Press [Enter] to dismiss or [C] to copy output".to_string());

        lines
    }

    /// Render result as single formatted text block
    pub fn render_text(result: &CommandResult) -> String {
        Self::render(result).join("\n")
    }
}

/// Command output viewer with scrolling support
pub struct CommandOutputViewer {
    pub lines: Vec<String>,
    pub scroll_position: usize,
}

impl CommandOutputViewer {
    /// Create new viewer from lines
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            scroll_position: 0,
        }
    }

    /// Scroll up by one line
    pub fn scroll_up(&mut self) {
        if self.scroll_position > 0 {
            self.scroll_position -= 1;
        }
    }

    /// Scroll down by one line
    pub fn scroll_down(&mut self) {
        let max_scroll = self.lines.len().saturating_sub(1);
        if self.scroll_position < max_scroll {
            self.scroll_position += 1;
        }
    }

    /// Scroll to end of output
    pub fn scroll_to_end(&mut self) {
        self.scroll_position = self.lines.len().saturating_sub(1);
    }

    /// Render visible lines for display
    /// height: number of lines available for display
    pub fn render(&self, height: usize) -> Vec<String> {
        if self.lines.is_empty() {
            return vec!["(No output)".to_string()];
        }

        let start = self
            .scroll_position
            .min(self.lines.len().saturating_sub(height));
        let end = (start + height).min(self.lines.len());

        self.lines[start..end].to_vec()
    }

    /// Get total number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Check if at end of output
    pub fn is_at_end(&self) -> bool {
        self.scroll_position >= self.lines.len().saturating_sub(1)
    }

    /// Get current position as percentage (0-100)
    pub fn scroll_percentage(&self) -> u32 {
        if self.lines.is_empty() {
            return 100;
        }
        ((self.scroll_position * 100) / self.lines.len().saturating_sub(1)) as u32
    }
}
