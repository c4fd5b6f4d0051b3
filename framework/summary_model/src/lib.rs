use itertools::Itertools;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

/// Result of running one scenario once.
///
/// `error` is set if and only if the scenario did not pass. The constructors enforce this, and so
/// does deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawOutcome")]
pub struct Outcome {
    pass: bool,
    /// The error message followed by whatever trace context was captured with it.
    error: Option<String>,
    /// Wall-clock time spent in the scenario body, in milliseconds. Cleanup is not included.
    elapsed_ms: u64,
}

impl Outcome {
    pub fn passed(elapsed_ms: u64) -> Self {
        Self {
            pass: true,
            error: None,
            elapsed_ms,
        }
    }

    pub fn failed(error: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            pass: false,
            error: Some(error.into()),
            elapsed_ms,
        }
    }

    pub fn pass(&self) -> bool {
        self.pass
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

#[derive(Deserialize)]
struct RawOutcome {
    pass: bool,
    error: Option<String>,
    elapsed_ms: u64,
}

impl TryFrom<RawOutcome> for Outcome {
    type Error = String;

    fn try_from(raw: RawOutcome) -> Result<Self, Self::Error> {
        match (raw.pass, raw.error) {
            (true, None) => Ok(Outcome::passed(raw.elapsed_ms)),
            (false, Some(error)) => Ok(Outcome::failed(error, raw.elapsed_ms)),
            (true, Some(_)) => Err("a passing outcome must not carry an error".to_string()),
            (false, None) => Err("a failing outcome must carry an error".to_string()),
        }
    }
}

/// Outcomes of a batch run, keyed by run label, in the order the runs were executed.
///
/// Serializes as a JSON object whose keys are the labels, preserving execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    results: Vec<(String, Outcome)>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a run.
    ///
    /// Labels must be unique within a report, recording the same label twice is an error.
    pub fn record(&mut self, label: impl Into<String>, outcome: Outcome) -> anyhow::Result<()> {
        let label = label.into();
        if self.get(&label).is_some() {
            anyhow::bail!("Outcome for [{label}] is already recorded");
        }

        self.results.push((label, outcome));
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&Outcome> {
        self.results
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Outcome)> {
        self.results
            .iter()
            .map(|(label, outcome)| (label.as_str(), outcome))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// True if every recorded outcome passed. An empty report is a success.
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|(_, outcome)| outcome.pass())
    }

    /// Process exit status for this report: `0` if every run passed, `1` otherwise.
    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// One line description of the report, e.g. `7 passed, 1 failed (end_to_end_dummy)`.
    pub fn summary_line(&self) -> String {
        let failed = self
            .results
            .iter()
            .filter(|(_, outcome)| !outcome.pass())
            .map(|(label, _)| label)
            .collect::<Vec<_>>();
        let passed = self.results.len() - failed.len();

        if failed.is_empty() {
            format!("{passed} passed, 0 failed")
        } else {
            format!(
                "{passed} passed, {} failed ({})",
                failed.len(),
                failed.iter().join(", ")
            )
        }
    }

    /// Render the report as pretty JSON, indented by four spaces.
    pub fn to_pretty_json(&self) -> anyhow::Result<String> {
        let mut buf = Vec::new();
        store_report(self, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Write the report to `path`, replacing any previous report. Missing parent directories are
    /// created.
    pub fn persist(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::File::create(path)?;
        store_report(self, &mut file)?;
        file.write_all(b"\n")?;
        file.flush()?;

        Ok(())
    }
}

impl Serialize for BatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for (label, outcome) in &self.results {
            map.serialize_entry(label, outcome)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BatchReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BatchReportVisitor;

        impl<'de> Visitor<'de> for BatchReportVisitor {
            type Value = BatchReport;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of run labels to outcomes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut report = BatchReport::new();
                while let Some((label, outcome)) = access.next_entry::<String, Outcome>()? {
                    report
                        .record(label, outcome)
                        .map_err(serde::de::Error::custom)?;
                }
                Ok(report)
            }
        }

        deserializer.deserialize_map(BatchReportVisitor)
    }
}

/// Serialize the report to a writer as pretty JSON, indented by four spaces.
pub fn store_report<W: Write>(report: &BatchReport, writer: &mut W) -> anyhow::Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    report.serialize(&mut serializer)?;
    Ok(())
}

/// Load a report from a reader, as produced by [store_report] or [BatchReport::persist].
pub fn load_report<R: Read>(reader: R) -> anyhow::Result<BatchReport> {
    let reader = std::io::BufReader::new(reader);
    let report: BatchReport = serde_json::from_reader(reader)?;
    Ok(report)
}
