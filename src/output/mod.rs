//! Output formatting and management

use crate::network::HostStatus;
use crate::scanner::{ProbeResult, ResultSet};
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::io::{self, Write};

/// Host column width of the text table
const HOST_COLUMN_WIDTH: usize = 16;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `host  is up` lines
    Text,
    /// `host,status` lines
    Csv,
    /// A single JSON document
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "table" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub colored: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            colored: true,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    results: Vec<&'a ProbeResult>,
    up: usize,
    total: usize,
    generated_at: DateTime<Utc>,
}

/// Main output manager
pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Render the whole report, summary included
    pub fn render(&self, results: &ResultSet) -> crate::Result<String> {
        match self.config.format {
            OutputFormat::Text => Ok(self.format_text(results)),
            OutputFormat::Csv => self.format_csv(results),
            OutputFormat::Json => self.format_json(results),
        }
    }

    /// Print the report to stdout
    pub fn print_results(&self, results: &ResultSet) -> crate::Result<()> {
        let report = self.render(results)?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(report.as_bytes())?;
        handle.flush()?;
        Ok(())
    }

    fn format_text(&self, results: &ResultSet) -> String {
        let mut output = String::new();
        for result in results {
            output.push_str(&format!(
                "{:<width$}  is {}\n",
                result.host(),
                self.paint(result.status()),
                width = HOST_COLUMN_WIDTH
            ));
        }
        output.push_str(&summary_line(results));
        output.push('\n');
        output
    }

    fn format_csv(&self, results: &ResultSet) -> crate::Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        for result in results {
            writer.write_record([result.host(), result.status().as_str()])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| crate::PingError::OutputError(e.to_string()))?;
        let mut output =
            String::from_utf8(bytes).map_err(|e| crate::PingError::OutputError(e.to_string()))?;

        output.push_str(&summary_line(results));
        output.push('\n');
        Ok(output)
    }

    fn format_json(&self, results: &ResultSet) -> crate::Result<String> {
        let report = JsonReport {
            results: results.iter().collect(),
            up: results.up_count(),
            total: results.len(),
            generated_at: Utc::now(),
        };

        let mut output = serde_json::to_string_pretty(&report)?;
        output.push('\n');
        Ok(output)
    }

    fn paint(&self, status: HostStatus) -> String {
        if !self.config.colored {
            return status.to_string();
        }

        match status {
            HostStatus::Up => status.as_str().bright_green().to_string(),
            HostStatus::Down => status.as_str().bright_red().to_string(),
        }
    }
}

/// `"{up}/{total} hosts are up"`
pub fn summary_line(results: &ResultSet) -> String {
    format!("{}/{} hosts are up", results.up_count(), results.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> ResultSet {
        let mut set = ResultSet::with_capacity(2);
        set.push(ProbeResult::new(0, "127.0.0.1".to_string(), HostStatus::Up));
        set.push(ProbeResult::new(1, "10.255.255.1".to_string(), HostStatus::Down));
        set
    }

    fn manager(format: OutputFormat) -> OutputManager {
        OutputManager::new(OutputConfig {
            format,
            colored: false,
        })
    }

    #[test]
    fn test_csv_output() {
        let report = manager(OutputFormat::Csv).render(&results()).unwrap();
        assert_eq!(report, "127.0.0.1,up\n10.255.255.1,down\n1/2 hosts are up\n");
    }

    #[test]
    fn test_csv_host_is_written_verbatim() {
        let mut set = ResultSet::with_capacity(1);
        set.push(ProbeResult::new(0, "odd\"host".to_string(), HostStatus::Down));
        let report = manager(OutputFormat::Csv).render(&set).unwrap();
        assert_eq!(report, "odd\"host,down\n0/1 hosts are up\n");
    }

    #[test]
    fn test_text_output_is_aligned() {
        let report = manager(OutputFormat::Text).render(&results()).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "127.0.0.1         is up");
        assert_eq!(lines[1], "10.255.255.1      is down");
        assert_eq!(lines[2], "1/2 hosts are up");
    }

    #[test]
    fn test_long_host_keeps_two_spaces() {
        let mut set = ResultSet::with_capacity(1);
        set.push(ProbeResult::new(0, "very-long-hostname.example.net".to_string(), HostStatus::Up));
        let report = manager(OutputFormat::Text).render(&set).unwrap();
        assert!(report.starts_with("very-long-hostname.example.net  is up\n"));
    }

    #[test]
    fn test_empty_summary() {
        let report = manager(OutputFormat::Csv).render(&ResultSet::default()).unwrap();
        assert_eq!(report, "0/0 hosts are up\n");
    }

    #[test]
    fn test_json_output() {
        let report = manager(OutputFormat::Json).render(&results()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["up"], 1);
        assert_eq!(value["total"], 2);
        assert_eq!(value["results"][1]["host"], "10.255.255.1");
        assert_eq!(value["results"][1]["status"], "down");
        assert!(value["results"][0].get("index").is_none());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
