//! Band labels, time intervals and the tagged sequence produced by the
//! classifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{VocalSwapError, VocalSwapResult};

/// Tolerance used when checking that adjacent intervals touch.
const CONTIGUITY_EPSILON: f64 = 1e-9;

/// Dominant energy band of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Energy concentrated below the low threshold.
    Low,
    /// Energy concentrated between the two thresholds.
    Medium,
    /// Energy concentrated above the mid threshold.
    High,
}

impl Label {
    /// All labels, in library order.
    pub const ALL: [Label; 3] = [Label::Low, Label::Medium, Label::High];

    /// Returns the string identifier for this label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Low => "low",
            Label::Medium => "medium",
            Label::High => "high",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = VocalSwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Label::Low),
            "medium" => Ok(Label::Medium),
            "high" => Ok(Label::High),
            other => Err(VocalSwapError::invalid_input(format!(
                "unknown label '{}', expected one of: low, medium, high",
                other
            ))),
        }
    }
}

/// A half-open time range `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl TimeInterval {
    /// Creates an interval, requiring `start < end`.
    pub fn new(start: f64, end: f64) -> VocalSwapResult<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || start >= end {
            return Err(VocalSwapError::invalid_input(format!(
                "invalid interval [{}, {})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// One labelled interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedInterval {
    /// Dominant band.
    pub label: Label,
    /// Interval start in seconds.
    pub start: f64,
    /// Interval end in seconds.
    pub end: f64,
}

impl TaggedInterval {
    /// Returns the time interval.
    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start,
            end: self.end,
        }
    }
}

/// A tag entry whose label has not been validated yet, as read from a tags
/// file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTag {
    /// Label string, possibly unknown.
    pub label: String,
    /// Interval start in seconds.
    pub start: f64,
    /// Interval end in seconds.
    pub end: f64,
}

impl From<&TaggedInterval> for RawTag {
    fn from(tagged: &TaggedInterval) -> Self {
        Self {
            label: tagged.label.as_str().to_string(),
            start: tagged.start,
            end: tagged.end,
        }
    }
}

/// Ordered, contiguous, non-overlapping labelled intervals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaggedSequence {
    entries: Vec<TaggedInterval>,
}

impl TaggedSequence {
    /// Creates an empty sequence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a sequence from explicit entries, checking ordering and
    /// contiguity.
    pub fn from_entries(entries: Vec<TaggedInterval>) -> VocalSwapResult<Self> {
        for entry in &entries {
            TimeInterval::new(entry.start, entry.end)?;
        }
        for pair in entries.windows(2) {
            if (pair[0].end - pair[1].start).abs() > CONTIGUITY_EPSILON {
                return Err(VocalSwapError::invalid_input(format!(
                    "intervals are not contiguous: {} != {}",
                    pair[0].end, pair[1].start
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Folds a per-chunk label stream into merged intervals.
    ///
    /// Chunk `i` covers `[i * chunk_seconds, (i + 1) * chunk_seconds)`; a new
    /// interval starts only where the label changes. Boundaries are computed
    /// from chunk indices so adjacent intervals share exactly the same value.
    pub fn from_chunk_labels<I>(labels: I, chunk_samples: usize, sample_rate: u32) -> Self
    where
        I: IntoIterator<Item = Label>,
    {
        let time_at = |chunk: usize| (chunk * chunk_samples) as f64 / sample_rate as f64;

        let runs = labels
            .into_iter()
            .enumerate()
            .fold(Vec::<(Label, usize, usize)>::new(), |mut runs, (i, label)| {
                match runs.last_mut() {
                    Some((last, _, end)) if *last == label => *end = i + 1,
                    _ => runs.push((label, i, i + 1)),
                }
                runs
            });

        let entries = runs
            .into_iter()
            .map(|(label, first, last)| TaggedInterval {
                label,
                start: time_at(first),
                end: time_at(last),
            })
            .collect();

        Self { entries }
    }

    /// Returns the entries.
    pub fn entries(&self) -> &[TaggedInterval] {
        &self.entries
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no intervals.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, TaggedInterval> {
        self.entries.iter()
    }

    /// Total covered time in seconds.
    pub fn span_seconds(&self) -> f64 {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => last.end - first.start,
            _ => 0.0,
        }
    }

    /// Converts into raw tags for export.
    pub fn to_raw(&self) -> Vec<RawTag> {
        self.entries.iter().map(RawTag::from).collect()
    }
}

impl<'a> IntoIterator for &'a TaggedSequence {
    type Item = &'a TaggedInterval;
    type IntoIter = std::slice::Iter<'a, TaggedInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
