//! File input utilities for reading the host list
//!
//! A host file is plain UTF-8 text with one host per line. Lines that are
//! blank after trimming, and lines whose first non-blank character is `#`,
//! are skipped. The list is built in a single filtering pass that keeps the
//! order of first appearance.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::PingConfig;

/// Upper bound on hosts taken from one file
pub const DEFAULT_MAX_HOSTS: usize = 100_000;

/// Reads host tokens from text input
#[derive(Debug, Clone)]
pub struct HostListLoader {
    max_hosts: usize,
    deduplicate: bool,
}

/// Host list loading statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub total_lines: usize,
    pub valid_hosts: usize,
    pub skipped_lines: usize,
    pub duplicates_removed: usize,
}

impl Default for HostListLoader {
    fn default() -> Self {
        Self {
            max_hosts: DEFAULT_MAX_HOSTS,
            deduplicate: true,
        }
    }
}

impl HostListLoader {
    /// Create a new loader
    pub fn new(max_hosts: usize, deduplicate: bool) -> Self {
        Self {
            max_hosts,
            deduplicate,
        }
    }

    /// Read hosts from a file
    pub fn read_hosts_from_file<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<(Vec<String>, LoadStats)> {
        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open file: {}", file_path.as_ref().display()))?;

        self.read_hosts(BufReader::new(file))
            .with_context(|| format!("Failed to read file: {}", file_path.as_ref().display()))
    }

    /// Read hosts from any buffered reader
    pub fn read_hosts<R: BufRead>(&self, reader: R) -> Result<(Vec<String>, LoadStats)> {
        let mut hosts = Vec::new();
        let mut seen = HashSet::new();
        let mut stats = LoadStats::default();

        for line in reader.lines() {
            let line = line?;
            stats.total_lines += 1;

            let host = match sanitize_line(&line) {
                Some(host) => host,
                None => {
                    stats.skipped_lines += 1;
                    continue;
                }
            };

            if self.deduplicate && !seen.insert(host.to_string()) {
                stats.duplicates_removed += 1;
                continue;
            }

            if hosts.len() >= self.max_hosts {
                log::warn!("Host limit of {} reached, ignoring the rest", self.max_hosts);
                break;
            }

            hosts.push(host.to_string());
        }

        stats.valid_hosts = hosts.len();
        if stats.duplicates_removed > 0 {
            log::warn!("Removed {} duplicate hosts", stats.duplicates_removed);
        }

        Ok((hosts, stats))
    }

    /// Validate file before processing
    pub fn validate_file<P: AsRef<Path>>(&self, file_path: P) -> Result<()> {
        let path = file_path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {}", path.display()));
        }

        if !path.is_file() {
            return Err(anyhow::anyhow!("Path is not a file: {}", path.display()));
        }

        Ok(())
    }
}

/// Host token carried by a line, if any
pub fn sanitize_line(line: &str) -> Option<&str> {
    let token = line.trim();
    if token.is_empty() || token.starts_with('#') {
        None
    } else {
        Some(token)
    }
}

/// Load the host list named by the configuration
pub fn hosts_from_file<P: AsRef<Path>>(file_path: P, config: &PingConfig) -> Result<Vec<String>> {
    let loader = HostListLoader::new(DEFAULT_MAX_HOSTS, config.deduplicate);

    loader.validate_file(&file_path)?;
    let (hosts, stats) = loader.read_hosts_from_file(&file_path)?;

    if hosts.is_empty() {
        log::warn!(
            "No hosts found in {} ({} lines read)",
            file_path.as_ref().display(),
            stats.total_lines
        );
    }

    eprintln!("File read OK");
    eprintln!("Loaded {} host IPs", hosts.len());

    Ok(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_plain_text_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "192.168.1.1").unwrap();
        writeln!(temp_file, "  router.lan  ").unwrap();
        writeln!(temp_file, "# Comment line").unwrap();
        writeln!(temp_file).unwrap();
        writeln!(temp_file, "example.com").unwrap();

        let loader = HostListLoader::default();
        let (hosts, stats) = loader.read_hosts_from_file(temp_file.path()).unwrap();

        assert_eq!(hosts, vec!["192.168.1.1", "router.lan", "example.com"]);
        assert_eq!(stats.valid_hosts, 3);
        assert_eq!(stats.skipped_lines, 2);
        assert_eq!(stats.total_lines, 5);
    }

    #[test]
    fn test_consecutive_skipped_lines_are_all_dropped() {
        let input = "\n\n# a\n# b\n   \nhost-1\n\n\nhost-2\n";
        let (hosts, _) = HostListLoader::default().read_hosts(Cursor::new(input)).unwrap();
        assert_eq!(hosts, vec!["host-1", "host-2"]);
    }

    #[test]
    fn test_indented_comment_is_skipped() {
        assert_eq!(sanitize_line("   # disabled.lan"), None);
        assert_eq!(sanitize_line("\t10.0.0.1\r"), Some("10.0.0.1"));
    }

    #[test]
    fn test_duplicate_removal() {
        let input = "192.168.1.1\n192.168.1.1\n192.168.1.2\n 192.168.1.1 \n";

        let (hosts, stats) = HostListLoader::new(1000, true).read_hosts(Cursor::new(input)).unwrap();
        assert_eq!(stats.duplicates_removed, 2);
        assert_eq!(hosts, vec!["192.168.1.1", "192.168.1.2"]);

        let (hosts, stats) = HostListLoader::new(1000, false).read_hosts(Cursor::new(input)).unwrap();
        assert_eq!(stats.duplicates_removed, 0);
        assert_eq!(hosts.len(), 4);
    }

    #[test]
    fn test_max_hosts() {
        let input = "a\nb\nc\nd\n";
        let (hosts, _) = HostListLoader::new(2, true).read_hosts(Cursor::new(input)).unwrap();
        assert_eq!(hosts, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_file() {
        let loader = HostListLoader::default();
        assert!(loader.validate_file("/nonexistent/hosts.txt").is_err());
        let err = loader.read_hosts_from_file("/nonexistent/hosts.txt").unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HostListLoader::default().validate_file(dir.path()).is_err());
    }

    #[test]
    fn test_comment_only_file_gives_empty_list() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "# nothing to see").unwrap();

        let hosts = hosts_from_file(temp_file.path(), &PingConfig::default()).unwrap();
        assert!(hosts.is_empty());
    }
}
