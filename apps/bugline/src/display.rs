//! Output rendering and formatting

use bugline_config::Config;
use bugline_errors::UserFacingError;
use bugline_report::{ReportOutcome, ReportStatus, ReportUpdate};
use bugline_types::{ColorChoice, ReportState};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use console::{Style, Term};
use std::io;

/// Output renderer for CLI results
///
/// Progress and state changes go to stderr; final results go to stdout.
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal for progress output
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stderr(),
        }
    }

    /// Show one observer update on stderr
    pub fn render_update(&self, update: &ReportUpdate) {
        if self.json_output {
            return;
        }
        match update {
            ReportUpdate::State(status) => self.render_state(status),
            ReportUpdate::Progress(fraction) => self.render_progress(*fraction),
        }
    }

    fn render_state(&self, status: &ReportStatus) {
        let label = match status.state {
            ReportState::Initializing => "Preparing report",
            ReportState::Initialized => "Sending report",
            ReportState::ReportSubmitted => "Report accepted",
            ReportState::UploadingFiles => "Uploading attachments",
            ReportState::Succeeded => "Done",
            ReportState::Failed => "Failed",
        };
        let style = match status.state {
            ReportState::Succeeded => Style::new().green().bold(),
            ReportState::Failed => Style::new().red().bold(),
            _ => Style::new().cyan(),
        };

        let _ = self.term.clear_line();
        let _ = self
            .term
            .write_line(&format!("{} {label}", self.styled(&style, "==>")));
    }

    fn render_progress(&self, fraction: f32) {
        if !self.term.is_term() {
            return;
        }
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round();
        let _ = self.term.clear_line();
        let _ = self.term.write_str(&format!("    {percent:>3}% sent"));
    }

    /// Warning line on stderr, suppressed in JSON mode
    pub fn show_warning(&self, message: &str) {
        if self.json_output {
            return;
        }
        let _ = self.term.clear_line();
        let _ = self.term.write_line(&format!(
            "{} {message}",
            self.styled(&Style::new().yellow().bold(), "warning:")
        ));
    }

    /// Render the final outcome of a submission
    pub fn render_outcome(&self, outcome: &ReportOutcome) -> io::Result<()> {
        if self.json_output {
            let json = outcome_json(outcome);
            println!(
                "{}",
                serde_json::to_string_pretty(&json).map_err(io::Error::other)?
            );
            return Ok(());
        }

        match outcome {
            ReportOutcome::Succeeded(status) => {
                println!("[OK] Report {} submitted", status.report_id);
                if let Some(response) = status.response.as_ref().filter(|r| !is_empty(r)) {
                    println!("Response: {response}");
                }
            }
            ReportOutcome::Failed(status) => {
                println!("[ERROR] Report {} failed", status.report_id);
                if let Some(error) = status.error {
                    println!("  {}", error.user_message());
                    println!("  Code: {}", error.code());
                    if let Some(hint) = error.user_hint() {
                        println!("  Hint: {hint}");
                    }
                }
            }
            ReportOutcome::Cancelled => println!("Report cancelled"),
        }
        Ok(())
    }

    /// Render configuration as a table or JSON
    pub fn render_config(&self, config: &Config) -> io::Result<()> {
        if self.json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(config).map_err(io::Error::other)?
            );
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Setting").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        let token = if config.api.report_token.is_empty() {
            "(not set)".to_string()
        } else {
            config.api.report_token.clone()
        };
        let email = if config.report.user_email.is_empty() {
            "-".to_string()
        } else {
            config.report.user_email.clone()
        };
        let rows = [
            ("api.base_url", config.api.base_url.clone()),
            ("api.report_token", token),
            ("network.timeout", format!("{}s", config.network.timeout)),
            (
                "network.connect_timeout",
                format!("{}s", config.network.connect_timeout),
            ),
            ("network.user_agent", config.network.user_agent.clone()),
            (
                "report.default_severity",
                config.report.default_severity.to_string(),
            ),
            ("report.user_email", email),
        ];
        for (key, value) in rows {
            table.add_row(vec![Cell::new(key), Cell::new(value)]);
        }

        println!("{table}");
        Ok(())
    }

    fn styled(&self, style: &Style, text: &str) -> String {
        if self.supports_color() {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

fn is_empty(value: &serde_json::Value) -> bool {
    value.as_object().is_some_and(serde_json::Map::is_empty)
}

/// JSON document printed for `--json`
pub fn outcome_json(outcome: &ReportOutcome) -> serde_json::Value {
    match outcome {
        ReportOutcome::Succeeded(status) => serde_json::json!({
            "status": "succeeded",
            "report_id": status.report_id,
            "response": status.response,
        }),
        ReportOutcome::Failed(status) => serde_json::json!({
            "status": "failed",
            "report_id": status.report_id,
            "state": status.state,
            "error": status.error_code(),
        }),
        ReportOutcome::Cancelled => serde_json::json!({ "status": "cancelled" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugline_errors::ReportError;
    use bugline_types::Uuid;

    #[test]
    fn test_failed_outcome_json() {
        let status = ReportStatus {
            report_id: Uuid::nil(),
            state: ReportState::Failed,
            error: Some(ReportError::NoContent),
            progress: 0.0,
            response: None,
        };
        let json = outcome_json(&ReportOutcome::Failed(status));
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "NO_CONTENT");
        assert_eq!(json["state"], "failed");
    }
}
