use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{SpeakerMapping, TranscriptPhrase};

/// Machine-readable output of one reconciliation run
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledTranscript {
    /// Phrases with final speaker labels
    pub phrases: Vec<RenderedPhrase>,
    /// Speaker resolution report
    pub mapping: SpeakerMapping,
    /// Metadata about the run
    pub metadata: RunMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPhrase {
    pub phrase_id: String,
    pub start: f64,
    pub end: f64,
    pub speaker: String,
    pub original_speaker: String,
    pub was_relabeled: bool,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub total_units: usize,
    pub total_phrases: usize,
    pub total_cues: usize,
    pub total_speakers: usize,
    pub speakers_matched: usize,
    pub duration_seconds: f64,
}

impl ReconciledTranscript {
    /// Pair the reconciled phrases with their pre-reconciliation labels
    pub fn from_run(
        reconciled: &[TranscriptPhrase],
        original: &[TranscriptPhrase],
        mapping: &SpeakerMapping,
        metadata: RunMetadata,
    ) -> Self {
        let phrases: Vec<RenderedPhrase> = reconciled
            .iter()
            .zip(original.iter())
            .map(|(phrase, before)| RenderedPhrase {
                phrase_id: phrase.phrase_id.clone(),
                start: phrase.interval.start,
                end: phrase.interval.end,
                speaker: phrase.speaker.clone(),
                original_speaker: before.speaker.clone(),
                was_relabeled: phrase.speaker != before.speaker,
                text: phrase.text.clone(),
            })
            .collect();

        Self {
            phrases,
            mapping: mapping.clone(),
            metadata,
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable transcript format
pub struct HumanTranscript<'a> {
    phrases: &'a [TranscriptPhrase],
}

impl<'a> HumanTranscript<'a> {
    pub fn new(phrases: &'a [TranscriptPhrase]) -> Self {
        Self { phrases }
    }

    /// Format the transcript as human-readable text
    pub fn format(&self) -> String {
        let mut output = String::new();

        for phrase in self.phrases {
            let start_time = format_timestamp(phrase.interval.start);
            output.push_str(&format!("[{}] {}:\n", start_time, phrase.speaker));
            output.push_str(&wrap_text(&phrase.text, 80));
            output.push_str("\n\n");
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Format seconds as MM:SS.mmm
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let secs = total_ms / 1000;
    let millis = total_ms % 1000;
    let minutes = secs / 60;
    let secs = secs % 60;
    format!("{:02}:{:02}.{:03}", minutes, secs, millis)
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}
