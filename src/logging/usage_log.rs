// Usage ledger
//
// One JSON line per successful completion, in a file per UTC day:
// <usage_dir>/YYYY-MM-DD.jsonl

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::config::ProviderKind;
use crate::providers::RawCompletion;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub timestamp: DateTime<Utc>,
    pub provider: ProviderKind,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost: f64,
    /// What the call was for ("card", "topics", ...)
    pub purpose: String,
}

impl UsageEntry {
    pub fn from_completion(completion: &RawCompletion, purpose: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            provider: completion.provider,
            model: completion.model.clone(),
            input_tokens: completion.usage.input_tokens,
            output_tokens: completion.usage.output_tokens,
            cost: completion.cost,
            purpose: purpose.to_string(),
        }
    }
}

/// Aggregate of one day's entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    pub calls: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
    pub calls_by_provider: BTreeMap<ProviderKind, usize>,
}

pub struct UsageLogger {
    usage_dir: PathBuf,
    // Serialises appends from concurrent callers
    write_lock: Mutex<()>,
}

impl UsageLogger {
    pub fn new(usage_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&usage_dir).with_context(|| {
            format!("Failed to create usage directory: {}", usage_dir.display())
        })?;

        Ok(Self {
            usage_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn file_for(&self, date: &str) -> PathBuf {
        self.usage_dir.join(format!("{}.jsonl", date))
    }

    /// Append an entry to the file for the entry's date.
    pub fn log(&self, entry: &UsageEntry) -> Result<()> {
        let log_file = self.file_for(&entry.timestamp.format("%Y-%m-%d").to_string());
        let json = serde_json::to_string(entry).context("Failed to serialize usage entry")?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Usage log lock poisoned"))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("Failed to open usage log: {}", log_file.display()))?;

        writeln!(file, "{}", json).context("Failed to write usage entry")?;
        Ok(())
    }

    /// Read every entry for a date (`YYYY-MM-DD`). Missing file means no usage.
    pub fn read_entries(&self, date: &str) -> Result<Vec<UsageEntry>> {
        let log_file = self.file_for(date);
        if !log_file.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&log_file)
            .with_context(|| format!("Failed to read usage log: {}", log_file.display()))?;

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to parse usage log")
    }

    pub fn summary_for(&self, date: &str) -> Result<UsageSummary> {
        let entries = self.read_entries(date)?;
        let mut summary = UsageSummary::default();
        for entry in &entries {
            summary.calls += 1;
            summary.input_tokens += u64::from(entry.input_tokens);
            summary.output_tokens += u64::from(entry.output_tokens);
            summary.cost += entry.cost;
            *summary.calls_by_provider.entry(entry.provider).or_insert(0) += 1;
        }
        Ok(summary)
    }

    pub fn today_summary(&self) -> Result<UsageSummary> {
        self.summary_for(&Utc::now().format("%Y-%m-%d").to_string())
    }
}
