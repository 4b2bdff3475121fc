use tracing::warn;

/// Convert a caption timecode into seconds.
///
/// Accepts `HH:MM:SS.mmm`, `MM:SS.mmm`, or a bare numeric string. Caption
/// files are frequently hand-edited, so a bad timecode must not abort
/// parsing of the rest of the file: failures log a warning and yield `0.0`.
pub fn parse_timestamp(text: &str) -> f64 {
    match try_parse(text) {
        Some(seconds) => seconds,
        None => {
            warn!("cannot parse timestamp '{}'", text.trim());
            0.0
        }
    }
}

fn try_parse(text: &str) -> Option<f64> {
    let tokens: Vec<&str> = text
        .trim()
        .split(':')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();

    match tokens.as_slice() {
        [hours, minutes, seconds] => {
            let hours: i64 = hours.parse().ok()?;
            let minutes: i64 = minutes.parse().ok()?;
            let seconds: f64 = seconds.parse().ok()?;
            Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
        }
        [minutes, seconds] => {
            let minutes: i64 = minutes.parse().ok()?;
            let seconds: f64 = seconds.parse().ok()?;
            Some(minutes as f64 * 60.0 + seconds)
        }
        [seconds] => seconds.parse().ok(),
        _ => None,
    }
}
