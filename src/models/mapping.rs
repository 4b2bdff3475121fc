use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Report of one reconciliation run: which anonymous speakers resolved to
/// which participant names, with aggregate counts. Derived per run, never
/// persisted by the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerMapping {
    /// Anonymous label -> resolved name, `None` when no cue matched
    pub mapping: HashMap<String, Option<String>>,
    /// Number of distinct anonymous speakers seen in the input
    pub total_speakers: usize,
    /// Number of speakers that resolved to a name
    pub matched: usize,
    /// Resolved names in resolution (first-appearance) order
    pub speaker_names: Vec<String>,
    /// Anonymous labels that resolved to nothing, in resolution order
    pub unmatched_speakers: Vec<String>,
}

impl SpeakerMapping {
    /// The resolved name for an anonymous label, if any
    pub fn resolved(&self, speaker_id: &str) -> Option<&str> {
        self.mapping.get(speaker_id).and_then(|name| name.as_deref())
    }

    /// Fraction of anonymous speakers that resolved, in [0, 1]
    pub fn match_rate(&self) -> f64 {
        if self.total_speakers == 0 {
            0.0
        } else {
            self.matched as f64 / self.total_speakers as f64
        }
    }
}
