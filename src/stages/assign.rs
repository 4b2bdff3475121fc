use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{AsrUnit, DiarizationSegment, TranscriptPhrase};

/// Speaker label used when no diarization is available for a unit
pub const UNKNOWN_SPEAKER: &str = "UNKNOWN";

/// Merge ASR units with diarization intervals into speaker-labeled phrases.
///
/// Each unit is attributed to a speaker, then consecutive same-speaker
/// units are grouped: a speaker change closes the open phrase, an unchanged
/// speaker extends its end and appends the unit text after a single space.
/// Output phrases are chronologically ordered and no unit is dropped.
pub fn assign(diarization: &[DiarizationSegment], units: &[AsrUnit]) -> Vec<TranscriptPhrase> {
    if diarization.is_empty() && !units.is_empty() {
        warn!("no diarization segments; attributing all speech to {UNKNOWN_SPEAKER}");
    }

    let mut phrases: Vec<TranscriptPhrase> = Vec::new();

    for unit in units {
        let speaker = attribute_unit(diarization, unit);
        match phrases.last_mut() {
            Some(open) if open.speaker == speaker => {
                open.interval.end = unit.interval.end;
                open.text.push(' ');
                open.text.push_str(&unit.text);
            }
            _ => phrases.push(TranscriptPhrase {
                phrase_id: Uuid::new_v4().to_string(),
                interval: unit.interval,
                speaker,
                text: unit.text.clone(),
            }),
        }
    }

    debug!("grouped {} units into {} phrases", units.len(), phrases.len());
    phrases
}

/// Pick the speaker for a single unit. Containment wins: the first
/// supplied segment whose interval fully contains the unit. Otherwise the
/// segment whose start is nearest the unit's start, first candidate on
/// ties. Empty diarization falls back to the UNKNOWN sentinel.
fn attribute_unit(diarization: &[DiarizationSegment], unit: &AsrUnit) -> String {
    if let Some(segment) = diarization
        .iter()
        .find(|segment| segment.interval.contains(&unit.interval))
    {
        return segment.speaker_id.clone();
    }

    diarization
        .iter()
        .min_by(|a, b| {
            let dist_a = (a.interval.start - unit.interval.start).abs();
            let dist_b = (b.interval.start - unit.interval.start).abs();
            dist_a
                .partial_cmp(&dist_b)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|segment| segment.speaker_id.clone())
        .unwrap_or_else(|| UNKNOWN_SPEAKER.to_string())
}
