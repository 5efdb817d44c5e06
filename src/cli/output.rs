//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::bitbucket::EnvironmentSummary;
use crate::resolver::DeploymentRecord;
use crate::schema::{DataSourceState, FieldMode, FieldSpec};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Environment row for table display.
#[derive(Tabled)]
struct EnvironmentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "UUID")]
    uuid: String,
}

/// Schema field row for table display.
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Attribute")]
    name: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a resolved deployment for display.
    #[must_use]
    pub fn format_record(&self, record: &DeploymentRecord) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&DataSourceState::from(record)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_record_text(record),
        }
    }

    /// Formats a record as text.
    fn format_record_text(record: &DeploymentRecord) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "\n{} Deployment environment {}",
            "✓".green(),
            record.name.bold()
        );
        let _ = writeln!(output, "   UUID:       {}", record.uuid);
        let _ = writeln!(output, "   Stage:      {}", Self::colorize_stage(&record.stage));
        let _ = writeln!(
            output,
            "   Repository: {}/{}",
            record.workspace, record.repository
        );

        output
    }

    /// Formats an environment list for display.
    #[must_use]
    pub fn format_environments(&self, environments: &[EnvironmentSummary]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(environments).unwrap_or_default(),
            OutputFormat::Text => Self::format_environments_text(environments),
        }
    }

    /// Formats an environment list as text.
    fn format_environments_text(environments: &[EnvironmentSummary]) -> String {
        if environments.is_empty() {
            return format!("{} No deployment environments found.\n", "!".yellow());
        }

        let rows: Vec<EnvironmentRow> = environments
            .iter()
            .enumerate()
            .map(|(i, e)| EnvironmentRow {
                index: i + 1,
                name: e.name.clone(),
                uuid: e.uuid.clone(),
            })
            .collect();

        let mut output = Table::new(rows).to_string();
        let _ = write!(output, "\n\n{} environment(s)\n", environments.len());
        output
    }

    /// Formats the data-source schema for display.
    #[must_use]
    pub fn format_schema(&self, fields: &[FieldSpec]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(fields).unwrap_or_default(),
            OutputFormat::Text => {
                let rows: Vec<FieldRow> = fields
                    .iter()
                    .map(|f| FieldRow {
                        name: f.name.to_string(),
                        mode: match f.mode {
                            FieldMode::Required => f.mode.to_string().cyan().to_string(),
                            FieldMode::Computed => f.mode.to_string().dimmed().to_string(),
                        },
                        description: f.description.to_string(),
                    })
                    .collect();
                let mut output = Table::new(rows).to_string();
                output.push('\n');
                output
            }
        }
    }

    /// Colors a stage name by how sensitive it usually is.
    fn colorize_stage(stage: &str) -> String {
        match stage.to_ascii_lowercase().as_str() {
            "production" => stage.red().bold().to_string(),
            "staging" => stage.yellow().to_string(),
            "test" => stage.green().to_string(),
            _ => stage.to_string(),
        }
    }
}
