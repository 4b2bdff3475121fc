use tracing::warn;

use crate::models::{ReferenceCue, TimeInterval};

use super::timestamp::parse_timestamp;

/// Parser position within a caption block. At most one unconsumed timing
/// line is held; a timing line followed by two voice lines attaches only
/// to the first.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ParserState {
    /// No timing line pending
    AwaitingTiming,
    /// A timing line was seen and waits for its voice line
    AwaitingCue(TimeInterval),
}

/// Parse caption-track text (WebVTT-like, as produced by meeting caption
/// exports) into an ordered sequence of named, timed cues.
///
/// Single forward pass over lines:
/// - a line containing `-->` sets the pending interval, replacing any
///   unconsumed one;
/// - a `<v Name>text</v>` line consumes the pending interval into a cue,
///   or is dropped when none is pending;
/// - every other line (headers, cue numbers, styling, blanks) is ignored.
///
/// Never fails: malformed lines are skipped with a warning, and an input
/// with no usable cues yields an empty sequence.
pub fn parse_cues(raw_text: &str) -> Vec<ReferenceCue> {
    let mut cues = Vec::new();
    let mut state = ParserState::AwaitingTiming;

    for raw in raw_text.lines() {
        let line = raw.trim();

        if line.contains("-->") {
            state = match parse_timing_line(line) {
                Some(interval) => ParserState::AwaitingCue(interval),
                None => ParserState::AwaitingTiming,
            };
        } else if let Some(tag_body) = line.strip_prefix("<v ") {
            match parse_voice_line(tag_body) {
                Some((name, text)) => {
                    if let ParserState::AwaitingCue(interval) = state {
                        cues.push(ReferenceCue {
                            interval,
                            speaker_name: name,
                            text,
                        });
                        state = ParserState::AwaitingTiming;
                    }
                }
                None => warn!("cannot parse voice line '{}'", line),
            }
        }
    }

    if cues.is_empty() {
        warn!("no cues found in caption text");
    }
    cues
}

/// Split a timing line on `-->` and parse both halves. Exactly two halves
/// are required; anything else invalidates the line.
fn parse_timing_line(line: &str) -> Option<TimeInterval> {
    let halves: Vec<&str> = line.split("-->").collect();
    if halves.len() != 2 {
        warn!("bad timing line '{}'", line);
        return None;
    }
    Some(TimeInterval::new(
        parse_timestamp(halves[0]),
        parse_timestamp(halves[1]),
    ))
}

/// Extract (name, text) from the body of a voice tag, i.e. everything
/// after `<v `. The name runs up to the first `>`; the text is the rest
/// with a trailing `</v>` stripped.
fn parse_voice_line(tag_body: &str) -> Option<(String, String)> {
    let (name, rest) = tag_body.split_once('>')?;
    let text = rest.trim();
    let text = text.strip_suffix("</v>").unwrap_or(text).trim_end();
    Some((name.trim().to_string(), text.to_string()))
}
