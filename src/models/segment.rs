use serde::{Deserialize, Serialize};

use super::TimeInterval;

/// One interval of the audio timeline attributed to an anonymous speaker
/// by the diarization provider. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationSegment {
    #[serde(flatten)]
    pub interval: TimeInterval,
    /// Opaque anonymous label, e.g. "SPEAKER_00"
    pub speaker_id: String,
}

impl DiarizationSegment {
    pub fn new(start: f64, end: f64, speaker_id: impl Into<String>) -> Self {
        Self {
            interval: TimeInterval::new(start, end),
            speaker_id: speaker_id.into(),
        }
    }
}

/// A timed span of recognized text. Either a single word or a coarser
/// segment depending on which ASR backend supplied it; the assigner treats
/// both uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsrUnit {
    #[serde(flatten)]
    pub interval: TimeInterval,
    pub text: String,
    /// Recognition confidence (0-1), when the backend reports one
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl AsrUnit {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            interval: TimeInterval::new(start, end),
            text: text.into(),
            confidence: None,
        }
    }
}

/// A maximal run of consecutive ASR units attributed to one speaker.
/// Text is the single-space join of the unit texts; start/end come from
/// the first/last unit in the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptPhrase {
    /// Unique identifier for this phrase (UUID)
    pub phrase_id: String,
    #[serde(flatten)]
    pub interval: TimeInterval,
    /// Anonymous diarization label until reconciliation, a participant
    /// name afterwards
    pub speaker: String,
    pub text: String,
}

impl TranscriptPhrase {
    /// Duration of this phrase in seconds
    pub fn duration(&self) -> f64 {
        self.interval.duration()
    }
}
