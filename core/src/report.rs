//! # Scan Report
//!
//! Collects the result sets of every scan in a run and renders them as the
//! plain-text `result.txt` export.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use maki_common::probe::{self, ProbeKind, ProbeResult};

pub const REPORT_FILE_NAME: &str = "result.txt";
const RULE_WIDTH: usize = 50;

pub struct ScanSection {
    pub kind: ProbeKind,
    pub results: Vec<ProbeResult>,
}

pub struct Report {
    pub subnet: String,
    pub timestamp: DateTime<Local>,
    pub scans: Vec<ScanSection>,
}

impl Report {
    pub fn new(subnet: &str) -> Self {
        Self {
            subnet: subnet.to_string(),
            timestamp: Local::now(),
            scans: Vec::new(),
        }
    }

    pub fn add_scan(&mut self, kind: ProbeKind, results: Vec<ProbeResult>) {
        self.scans.push(ScanSection { kind, results });
    }

    /// Writes the report to `dir/result.txt`, creating `dir` if needed.
    ///
    /// A leading `~` is expanded to the home directory.
    pub fn save_to_file(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let dir: PathBuf = expand_home(dir)?;
        std::fs::create_dir_all(&dir).with_context(|| format!("cannot create directory {}", dir.display()))?;

        let file_path: PathBuf = dir.join(REPORT_FILE_NAME);
        std::fs::write(&file_path, self.to_string())
            .with_context(|| format!("cannot write file {}", file_path.display()))?;

        Ok(file_path)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule: String = "-".repeat(RULE_WIDTH);

        writeln!(f, "Result of: {}", self.subnet)?;
        writeln!(f, "Scan time: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "{rule}\n")?;

        for scan in &self.scans {
            writeln!(f, "{}:", scan.kind.label())?;

            let mut alive = scan.results.iter().filter(|result| result.alive).peekable();
            if alive.peek().is_none() {
                writeln!(f, "No live hosts found")?;
            }
            for result in alive {
                if result.detail.is_empty() {
                    writeln!(f, "{}", result.address)?;
                } else {
                    writeln!(f, "{} ({})", result.address, result.detail)?;
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "{rule}")?;
        writeln!(f, "SUMMARY:")?;
        for scan in &self.scans {
            writeln!(
                f,
                "  {}: {} hosts alive",
                scan.kind.label(),
                probe::count_alive(&scan.results)
            )?;
        }
        Ok(())
    }
}

fn expand_home(path: &Path) -> anyhow::Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .context("cannot expand home directory")?;
    Ok(PathBuf::from(home).join(rest))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
