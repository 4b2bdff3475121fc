use serde::{Deserialize, Serialize};

use super::TimeInterval;

/// One timed, named utterance extracted from a caption track. Read-only
/// reference input to the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCue {
    #[serde(flatten)]
    pub interval: TimeInterval,
    /// Participant name as written in the caption voice tag. May be empty
    /// for malformed tags; the reconciler substitutes "Unknown".
    pub speaker_name: String,
    pub text: String,
}

impl ReferenceCue {
    pub fn new(start: f64, end: f64, speaker_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            interval: TimeInterval::new(start, end),
            speaker_name: speaker_name.into(),
            text: text.into(),
        }
    }
}
