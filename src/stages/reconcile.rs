use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::models::{ReferenceCue, SpeakerMapping, TranscriptPhrase};

/// Name substituted for cues whose voice tag carried no usable name
pub const UNNAMED_PARTICIPANT: &str = "Unknown";

/// How anonymous speakers compete for reference names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Each anonymous speaker independently takes its best-scoring name.
    /// Two speakers may both win the same name.
    Greedy,
    /// One-to-one assignment: (speaker, name) pairs are consumed in
    /// descending score order, each speaker and each name used at most once.
    Exclusive,
}

/// Configuration for one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Symmetric expansion of each cue interval, in seconds, when testing
    /// whether it is a candidate for a phrase
    pub tolerance: f64,
    /// Minimum measured overlap duration, in seconds, for a cue to score
    pub min_overlap: f64,
    pub strategy: MatchStrategy,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.7,
            min_overlap: 0.02,
            strategy: MatchStrategy::Greedy,
        }
    }
}

/// Result of a reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileResult {
    /// Relabeled copy of the input phrases; text and timing untouched
    pub phrases: Vec<TranscriptPhrase>,
    pub mapping: SpeakerMapping,
}

/// Align the anonymous speaker labels of `phrases` against the named
/// `cues`, returning a relabeled phrase sequence and match statistics.
///
/// For every distinct anonymous speaker (in first-appearance order), the
/// overlap duration between its phrases and each cue is accumulated into a
/// per-name score table; candidacy uses the cue interval expanded by
/// `tolerance` on both ends, but the scored overlap is measured on the
/// unexpanded intervals and only counted at or above `min_overlap`. The
/// winning name is the one with the highest accumulated score, first-seen
/// name on ties; speakers with an empty table stay anonymous.
///
/// Inputs are never mutated. Membership is captured on the original labels
/// up front, so a later speaker can never re-match phrases a previous one
/// won. An empty cue sequence is a normal input: every speaker ends up
/// unmatched. The phrase x cue scan is O(P*C); callers batching very long
/// recordings should pre-bucket both sides by time window.
pub fn reconcile(
    phrases: &[TranscriptPhrase],
    cues: &[ReferenceCue],
    config: &ReconcileConfig,
) -> ReconcileResult {
    let speaker_order = distinct_speakers(phrases);
    let cues = normalize_cues(cues);

    if cues.is_empty() {
        warn!("no usable reference cues; all speakers stay anonymous");
    }

    let tables: Vec<ScoreTable> = speaker_order
        .iter()
        .map(|speaker| score_table(phrases, speaker, &cues, config))
        .collect();

    let winners = match config.strategy {
        MatchStrategy::Greedy => greedy_winners(&speaker_order, &tables),
        MatchStrategy::Exclusive => exclusive_winners(&speaker_order, &tables),
    };

    let mut mapping = HashMap::new();
    let mut speaker_names = Vec::new();
    let mut unmatched_speakers = Vec::new();
    for speaker in &speaker_order {
        match winners.get(speaker) {
            Some(name) => {
                mapping.insert(speaker.clone(), Some(name.clone()));
                speaker_names.push(name.clone());
            }
            None => {
                mapping.insert(speaker.clone(), None);
                unmatched_speakers.push(speaker.clone());
            }
        }
    }

    let mapping = SpeakerMapping {
        mapping,
        total_speakers: speaker_order.len(),
        matched: speaker_names.len(),
        speaker_names,
        unmatched_speakers,
    };

    let phrases = phrases
        .iter()
        .map(|phrase| {
            let mut phrase = phrase.clone();
            if let Some(name) = winners.get(&phrase.speaker) {
                phrase.speaker = name.clone();
            }
            phrase
        })
        .collect();

    info!(
        "mapped {}/{} speakers",
        mapping.matched, mapping.total_speakers
    );

    ReconcileResult { phrases, mapping }
}

/// Rewrite phrase labels in place from an existing mapping report.
/// Compatibility helper for callers that want the historical in-place
/// behavior; `reconcile` itself never mutates its inputs.
pub fn apply_mapping(phrases: &mut [TranscriptPhrase], mapping: &SpeakerMapping) {
    for phrase in phrases.iter_mut() {
        if let Some(name) = mapping.resolved(&phrase.speaker) {
            phrase.speaker = name.to_string();
        }
    }
}

/// Accumulated overlap per candidate name, first-seen order preserved
type ScoreTable = Vec<(String, f64)>;

fn distinct_speakers(phrases: &[TranscriptPhrase]) -> Vec<String> {
    let mut order = Vec::new();
    for phrase in phrases {
        if !order.contains(&phrase.speaker) {
            order.push(phrase.speaker.clone());
        }
    }
    order
}

/// Copy cues into scoring form: blank names become the "Unknown" sentinel,
/// cues with non-finite times are dropped.
fn normalize_cues(cues: &[ReferenceCue]) -> Vec<ReferenceCue> {
    cues.iter()
        .filter_map(|cue| {
            if !cue.interval.is_finite() {
                warn!(
                    "dropping cue with non-finite interval for '{}'",
                    cue.speaker_name
                );
                return None;
            }
            let mut cue = cue.clone();
            if cue.speaker_name.trim().is_empty() {
                cue.speaker_name = UNNAMED_PARTICIPANT.to_string();
            }
            Some(cue)
        })
        .collect()
}

/// Build the per-name score table for one anonymous speaker: summed
/// unexpanded overlap across all of the speaker's phrases and every
/// candidate cue that clears `min_overlap`.
fn score_table(
    phrases: &[TranscriptPhrase],
    speaker: &str,
    cues: &[ReferenceCue],
    config: &ReconcileConfig,
) -> ScoreTable {
    let mut table: ScoreTable = Vec::new();

    for phrase in phrases.iter().filter(|p| p.speaker == speaker) {
        for cue in cues {
            if !cue
                .interval
                .intersects_within(&phrase.interval, config.tolerance)
            {
                continue;
            }
            let overlap = phrase.interval.overlap_duration(&cue.interval);
            if overlap < config.min_overlap {
                continue;
            }
            match table.iter_mut().find(|(name, _)| name == &cue.speaker_name) {
                Some((_, score)) => *score += overlap,
                None => table.push((cue.speaker_name.clone(), overlap)),
            }
        }
    }

    table
}

/// Each speaker independently takes the top entry of its own table
fn greedy_winners(speaker_order: &[String], tables: &[ScoreTable]) -> HashMap<String, String> {
    speaker_order
        .iter()
        .zip(tables)
        .filter_map(|(speaker, table)| {
            best_entry(table).map(|name| (speaker.clone(), name.to_string()))
        })
        .collect()
}

/// Highest accumulated score; the first-seen name wins ties
fn best_entry(table: &ScoreTable) -> Option<&str> {
    let mut best: Option<(&str, f64)> = None;
    for (name, score) in table {
        match best {
            Some((_, top)) if *score <= top => {}
            _ => best = Some((name.as_str(), *score)),
        }
    }
    best.map(|(name, _)| name)
}

/// One-to-one assignment: flatten all (speaker, name, score) entries, take
/// them in descending score order, and skip any entry whose speaker or
/// name is already spoken for. The sort is stable, so equal scores fall
/// back to resolution order.
fn exclusive_winners(speaker_order: &[String], tables: &[ScoreTable]) -> HashMap<String, String> {
    let mut entries: Vec<(usize, &str, f64)> = Vec::new();
    for (index, table) in tables.iter().enumerate() {
        for (name, score) in table {
            entries.push((index, name.as_str(), *score));
        }
    }
    entries.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

    let mut taken_speakers: HashSet<usize> = HashSet::new();
    let mut taken_names: HashSet<&str> = HashSet::new();
    let mut winners = HashMap::new();

    for (index, name, _) in entries {
        if taken_speakers.contains(&index) || taken_names.contains(name) {
            continue;
        }
        taken_speakers.insert(index);
        taken_names.insert(name);
        winners.insert(speaker_order[index].clone(), name.to_string());
    }

    winners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeInterval;

    fn phrase(start: f64, end: f64, speaker: &str, text: &str) -> TranscriptPhrase {
        TranscriptPhrase {
            phrase_id: format!("p_{start}"),
            interval: TimeInterval::new(start, end),
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }

    fn cue(start: f64, end: f64, name: &str) -> ReferenceCue {
        ReferenceCue::new(start, end, name, "")
    }

    #[test]
    fn test_accumulated_overlap_picks_winner() {
        // SPEAKER_00 overlaps Alice for 5s and Bob for 1s
        let phrases = vec![phrase(0.0, 6.0, "SPEAKER_00", "hello")];
        let cues = vec![cue(0.0, 5.0, "Alice"), cue(5.0, 6.0, "Bob")];

        let result = reconcile(&phrases, &cues, &ReconcileConfig::default());

        assert_eq!(result.phrases[0].speaker, "Alice");
        assert_eq!(result.mapping.matched, 1);
        assert_eq!(result.mapping.resolved("SPEAKER_00"), Some("Alice"));
        assert_eq!(result.mapping.speaker_names, vec!["Alice"]);
    }

    #[test]
    fn test_score_accumulates_across_phrases() {
        // Bob wins a single long overlap, but Alice accumulates more
        // across two separate phrases
        let phrases = vec![
            phrase(0.0, 3.0, "SPEAKER_00", "a"),
            phrase(10.0, 13.0, "SPEAKER_00", "b"),
            phrase(20.0, 24.0, "SPEAKER_00", "c"),
        ];
        let cues = vec![
            cue(0.0, 3.0, "Alice"),
            cue(10.0, 13.0, "Alice"),
            cue(20.0, 24.0, "Bob"),
        ];

        let result = reconcile(&phrases, &cues, &ReconcileConfig::default());

        assert_eq!(result.mapping.resolved("SPEAKER_00"), Some("Alice"));
    }

    #[test]
    fn test_proximity_without_overlap_does_not_score() {
        // gap of 0.5s is inside the 0.7s tolerance, so the cue is a
        // candidate, but the measured overlap is zero and must not count
        let phrases = vec![phrase(10.0, 12.0, "SPEAKER_00", "hello")];
        let cues = vec![cue(12.5, 13.0, "Alice")];

        let result = reconcile(&phrases, &cues, &ReconcileConfig::default());

        assert_eq!(result.mapping.resolved("SPEAKER_00"), None);
        assert_eq!(result.mapping.matched, 0);
        assert_eq!(result.phrases[0].speaker, "SPEAKER_00");
    }

    #[test]
    fn test_overlap_below_min_threshold_does_not_score() {
        let phrases = vec![phrase(0.0, 10.0, "SPEAKER_00", "hello")];
        let cues = vec![cue(9.99, 12.0, "Alice")];

        let config = ReconcileConfig {
            min_overlap: 0.02,
            ..Default::default()
        };
        let result = reconcile(&phrases, &cues, &config);

        assert_eq!(result.mapping.matched, 0);
    }

    #[test]
    fn test_no_cues_leaves_everyone_unmatched() {
        let phrases = vec![
            phrase(0.0, 1.0, "SPEAKER_00", "a"),
            phrase(1.0, 2.0, "SPEAKER_01", "b"),
        ];

        let result = reconcile(&phrases, &[], &ReconcileConfig::default());

        assert_eq!(result.mapping.total_speakers, 2);
        assert_eq!(result.mapping.matched, 0);
        assert_eq!(result.mapping.resolved("SPEAKER_00"), None);
        assert_eq!(result.mapping.resolved("SPEAKER_01"), None);
        assert_eq!(
            result.mapping.unmatched_speakers,
            vec!["SPEAKER_00", "SPEAKER_01"]
        );
        assert_eq!(result.phrases[0].speaker, "SPEAKER_00");
        assert_eq!(result.phrases[1].speaker, "SPEAKER_01");
    }

    #[test]
    fn test_inputs_never_mutated() {
        let phrases = vec![phrase(0.0, 5.0, "SPEAKER_00", "hello")];
        let cues = vec![cue(0.0, 5.0, "Alice")];

        let result = reconcile(&phrases, &cues, &ReconcileConfig::default());

        assert_eq!(phrases[0].speaker, "SPEAKER_00");
        assert_eq!(result.phrases[0].speaker, "Alice");
        // text and timing survive the relabel untouched
        assert_eq!(result.phrases[0].text, phrases[0].text);
        assert_eq!(result.phrases[0].interval, phrases[0].interval);
    }

    #[test]
    fn test_rerun_on_reconciled_output_is_idempotent() {
        let phrases = vec![
            phrase(0.0, 5.0, "SPEAKER_00", "hello"),
            phrase(5.0, 9.0, "SPEAKER_01", "there"),
        ];
        let cues = vec![cue(0.0, 5.0, "Alice"), cue(5.0, 9.0, "Bob")];
        let config = ReconcileConfig::default();

        let first = reconcile(&phrases, &cues, &config);
        let second = reconcile(&first.phrases, &cues, &config);

        let labels: Vec<&str> = second.phrases.iter().map(|p| p.speaker.as_str()).collect();
        assert_eq!(labels, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_tie_goes_to_first_seen_name() {
        let phrases = vec![phrase(0.0, 4.0, "SPEAKER_00", "hello")];
        // identical overlap for both names; Alice appears first
        let cues = vec![cue(0.0, 2.0, "Alice"), cue(2.0, 4.0, "Bob")];

        let result = reconcile(&phrases, &cues, &ReconcileConfig::default());

        assert_eq!(result.mapping.resolved("SPEAKER_00"), Some("Alice"));
    }

    #[test]
    fn test_blank_cue_name_becomes_unknown() {
        let phrases = vec![phrase(0.0, 5.0, "SPEAKER_00", "hello")];
        let cues = vec![cue(0.0, 5.0, "  ")];

        let result = reconcile(&phrases, &cues, &ReconcileConfig::default());

        assert_eq!(
            result.mapping.resolved("SPEAKER_00"),
            Some(UNNAMED_PARTICIPANT)
        );
    }

    #[test]
    fn test_greedy_allows_shared_name() {
        // both anonymous speakers overlap Alice most; greedy lets both win
        let phrases = vec![
            phrase(0.0, 5.0, "SPEAKER_00", "a"),
            phrase(6.0, 10.0, "SPEAKER_01", "b"),
        ];
        let cues = vec![cue(0.0, 10.0, "Alice")];

        let result = reconcile(&phrases, &cues, &ReconcileConfig::default());

        assert_eq!(result.mapping.resolved("SPEAKER_00"), Some("Alice"));
        assert_eq!(result.mapping.resolved("SPEAKER_01"), Some("Alice"));
        assert_eq!(result.mapping.matched, 2);
    }

    #[test]
    fn test_exclusive_forbids_shared_name() {
        // SPEAKER_01 overlaps Alice longer, so it takes her under the
        // exclusive strategy; SPEAKER_00 falls back to Bob
        let phrases = vec![
            phrase(0.0, 3.0, "SPEAKER_00", "a"),
            phrase(4.0, 10.0, "SPEAKER_01", "b"),
        ];
        let cues = vec![cue(0.0, 10.0, "Alice"), cue(0.0, 2.0, "Bob")];

        let config = ReconcileConfig {
            strategy: MatchStrategy::Exclusive,
            ..Default::default()
        };
        let result = reconcile(&phrases, &cues, &config);

        assert_eq!(result.mapping.resolved("SPEAKER_01"), Some("Alice"));
        assert_eq!(result.mapping.resolved("SPEAKER_00"), Some("Bob"));
        assert_eq!(result.mapping.matched, 2);
    }

    #[test]
    fn test_exclusive_leaves_loser_unmatched_when_no_alternative() {
        let phrases = vec![
            phrase(0.0, 3.0, "SPEAKER_00", "a"),
            phrase(4.0, 10.0, "SPEAKER_01", "b"),
        ];
        let cues = vec![cue(0.0, 10.0, "Alice")];

        let config = ReconcileConfig {
            strategy: MatchStrategy::Exclusive,
            ..Default::default()
        };
        let result = reconcile(&phrases, &cues, &config);

        assert_eq!(result.mapping.resolved("SPEAKER_01"), Some("Alice"));
        assert_eq!(result.mapping.resolved("SPEAKER_00"), None);
        assert_eq!(result.mapping.unmatched_speakers, vec!["SPEAKER_00"]);
    }

    #[test]
    fn test_later_speaker_cannot_rematch_renamed_phrases() {
        // SPEAKER_00 resolves to Alice; SPEAKER_01 sits far outside the
        // cue window, so it must stay unmatched rather than chase the
        // phrases already renamed to Alice
        let phrases = vec![
            phrase(0.0, 5.0, "SPEAKER_00", "a"),
            phrase(100.0, 101.0, "SPEAKER_01", "b"),
        ];
        let cues = vec![cue(0.0, 5.0, "Alice")];

        let result = reconcile(&phrases, &cues, &ReconcileConfig::default());

        assert_eq!(result.mapping.resolved("SPEAKER_00"), Some("Alice"));
        assert_eq!(result.mapping.resolved("SPEAKER_01"), None);
    }

    #[test]
    fn test_pipeline_from_captions_to_names() {
        use crate::captions::parse_cues;
        use crate::models::{AsrUnit, DiarizationSegment};
        use crate::stages::assign;

        let diarization = vec![
            DiarizationSegment::new(0.0, 4.0, "SPEAKER_00"),
            DiarizationSegment::new(4.0, 8.0, "SPEAKER_01"),
        ];
        let units = vec![
            AsrUnit::new(0.5, 1.0, "good"),
            AsrUnit::new(1.1, 1.6, "morning"),
            AsrUnit::new(4.5, 5.0, "morning"),
            AsrUnit::new(5.1, 5.6, "all"),
        ];
        let captions = "WEBVTT\n\
            \n\
            00:00:00.000 --> 00:00:04.000\n\
            <v Alice Chen>Good morning.</v>\n\
            \n\
            00:00:04.000 --> 00:00:08.000\n\
            <v Bob Smith>Morning all.</v>\n";

        let phrases = assign(&diarization, &units);
        let cues = parse_cues(captions);
        let result = reconcile(&phrases, &cues, &ReconcileConfig::default());

        let labels: Vec<&str> = result.phrases.iter().map(|p| p.speaker.as_str()).collect();
        assert_eq!(labels, vec!["Alice Chen", "Bob Smith"]);
        assert_eq!(result.phrases[0].text, "good morning");
        assert_eq!(result.phrases[1].text, "morning all");
        assert_eq!(result.mapping.matched, 2);
    }

    #[test]
    fn test_apply_mapping_rewrites_in_place() {
        let mut phrases = vec![
            phrase(0.0, 5.0, "SPEAKER_00", "a"),
            phrase(5.0, 9.0, "SPEAKER_01", "b"),
        ];
        let cues = vec![cue(0.0, 5.0, "Alice")];

        let result = reconcile(&phrases, &cues, &ReconcileConfig::default());
        apply_mapping(&mut phrases, &result.mapping);

        assert_eq!(phrases[0].speaker, "Alice");
        // unmatched labels stay untouched
        assert_eq!(phrases[1].speaker, "SPEAKER_01");
    }
}
