use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::{AsrUnit, DiarizationSegment, TimeInterval};

/// Failure at the input boundary. Everything past this boundary is total;
/// only reading and decoding external payloads can error.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed ASR payload")]
    MalformedAsr(#[source] serde_json::Error),
    #[error("malformed diarization payload")]
    MalformedDiarization(#[source] serde_json::Error),
}

/// Whisper-style ASR response: full text plus timed segments, optionally
/// with per-word timings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AsrResponse {
    #[serde(default)]
    pub text: String,
    pub segments: Vec<AsrSegment>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AsrSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Vec<AsrWord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AsrWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    /// Word-level recognition probability (0-1), when reported
    #[serde(default)]
    pub probability: Option<f64>,
}

/// Parse a Whisper-style ASR JSON string into assignable units.
///
/// A segment carrying word timings contributes one unit per word;
/// otherwise the segment itself becomes one unit. Empty texts are dropped,
/// so both granularities feed the assigner uniformly.
pub fn parse_asr_json(json: &str) -> Result<Vec<AsrUnit>, InputError> {
    let response: AsrResponse = serde_json::from_str(json).map_err(InputError::MalformedAsr)?;
    Ok(units_from_response(&response))
}

/// Parse an ASR JSON file into assignable units
pub fn read_asr_file(path: &Path) -> Result<Vec<AsrUnit>, InputError> {
    parse_asr_json(&read_file(path)?)
}

fn units_from_response(response: &AsrResponse) -> Vec<AsrUnit> {
    let mut units = Vec::new();

    for segment in &response.segments {
        if segment.words.is_empty() {
            push_unit(&mut units, segment.start, segment.end, &segment.text, None);
        } else {
            for word in &segment.words {
                push_unit(&mut units, word.start, word.end, &word.word, word.probability);
            }
        }
    }

    units
}

/// Append one validated unit; empty texts and bad time spans are dropped
fn push_unit(units: &mut Vec<AsrUnit>, start: f64, end: f64, text: &str, confidence: Option<f64>) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !valid_span(start, end) {
        warn!("dropping ASR unit with invalid span: start={start} end={end} text='{text}'");
        return;
    }
    units.push(AsrUnit {
        interval: TimeInterval::new(start, end),
        text: text.to_string(),
        confidence,
    });
}

fn valid_span(start: f64, end: f64) -> bool {
    start.is_finite() && end.is_finite() && start >= 0.0 && end >= start
}

/// One diarization row as emitted by the diarization provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiarizationRow {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
}

/// Parse diarization JSON (`[{start, end, speaker}]`) into validated
/// segments. Rows with non-finite, negative, or inverted times are dropped
/// with a warning; the remaining rows keep their supplied order.
pub fn parse_diarization_json(json: &str) -> Result<Vec<DiarizationSegment>, InputError> {
    let rows: Vec<DiarizationRow> =
        serde_json::from_str(json).map_err(InputError::MalformedDiarization)?;

    Ok(rows.into_iter().filter_map(validate_row).collect())
}

/// Parse a diarization JSON file into validated segments
pub fn read_diarization_file(path: &Path) -> Result<Vec<DiarizationSegment>, InputError> {
    parse_diarization_json(&read_file(path)?)
}

fn validate_row(row: DiarizationRow) -> Option<DiarizationSegment> {
    if !valid_span(row.start, row.end) {
        warn!(
            "dropping invalid diarization row: start={} end={} speaker='{}'",
            row.start, row.end, row.speaker
        );
        return None;
    }
    Some(DiarizationSegment {
        interval: TimeInterval::new(row.start, row.end),
        speaker_id: row.speaker,
    })
}

/// Read raw caption-track text for the caption parser
pub fn read_caption_file(path: &Path) -> Result<String, InputError> {
    read_file(path)
}

fn read_file(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })
}
