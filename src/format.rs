//! Formato de duraciones para mostrar (`M:SS` / `H:MM:SS`) y parser de las
//! duraciones ISO-8601 que devuelve YouTube API (`PT4M13S`).

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::MalformedDurationError;

/// Formatea una duración truncando a segundos enteros.
///
/// ```
/// use std::time::Duration;
/// assert_eq!(sabbeats::format::format_duration(Duration::from_secs(125)), "2:05");
/// assert_eq!(sabbeats::format::format_duration(Duration::from_secs(3725)), "1:02:05");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (minutes, seconds) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Igual que [`format_duration`] pero desde los segundos (posiblemente
/// fraccionarios) que reporta yt-dlp. Valores negativos o NaN cuentan como cero.
pub fn format_seconds(seconds: Option<f64>) -> String {
    let secs = seconds
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| s.trunc() as u64)
        .unwrap_or(0);
    format_duration(Duration::from_secs(secs))
}

fn iso8601_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
        )
        .expect("regex ISO-8601 válida")
    })
}

/// Parsea duraciones ISO-8601 (`PT1H2M3S`, `P1DT2H`, `PT0S`).
///
/// Años y meses no tienen duración fija y se rechazan, igual que los
/// designadores vacíos (`P`, `PT`).
pub fn parse_iso8601_duration(input: &str) -> Result<Duration, MalformedDurationError> {
    let malformed = || MalformedDurationError {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    if trimmed == "P" || trimmed.ends_with('T') {
        return Err(malformed());
    }

    let caps = iso8601_regex().captures(trimmed).ok_or_else(malformed)?;

    let whole = |idx: usize| -> Result<u64, MalformedDurationError> {
        caps.get(idx)
            .map(|m| m.as_str().parse::<u64>().map_err(|_| malformed()))
            .unwrap_or(Ok(0))
    };

    let weeks = whole(1)?;
    let days = whole(2)?;
    let hours = whole(3)?;
    let minutes = whole(4)?;
    let seconds = caps
        .get(5)
        .map(|m| m.as_str().parse::<f64>().map_err(|_| malformed()))
        .unwrap_or(Ok(0.0))?;

    let whole_secs = weeks
        .checked_mul(7 * 86_400)
        .and_then(|w| w.checked_add(days.checked_mul(86_400)?))
        .and_then(|t| t.checked_add(hours.checked_mul(3_600)?))
        .and_then(|t| t.checked_add(minutes.checked_mul(60)?))
        .ok_or_else(malformed)?;

    let fractional = Duration::try_from_secs_f64(seconds).map_err(|_| malformed())?;
    Duration::from_secs(whole_secs)
        .checked_add(fractional)
        .ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_short_durations() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0:00");
        assert_eq!(format_duration(Duration::from_secs(9)), "0:09");
        assert_eq!(format_duration(Duration::from_secs(125)), "2:05");
        assert_eq!(format_duration(Duration::from_secs(3599)), "59:59");
    }

    #[test]
    fn test_format_hour_durations() {
        assert_eq!(format_duration(Duration::from_secs(3600)), "1:00:00");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1:02:05");
        assert_eq!(format_duration(Duration::from_secs(36_061)), "10:01:01");
    }

    #[test]
    fn test_format_seconds_truncates_and_defaults() {
        assert_eq!(format_seconds(Some(125.9)), "2:05");
        assert_eq!(format_seconds(None), "0:00");
        assert_eq!(format_seconds(Some(-3.0)), "0:00");
        assert_eq!(format_seconds(Some(f64::NAN)), "0:00");
    }

    #[test]
    fn test_parse_iso8601() {
        assert_eq!(parse_iso8601_duration("PT1M30S").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_iso8601_duration("PT2M1S").unwrap(), Duration::from_secs(121));
        assert_eq!(parse_iso8601_duration("PT1H2M5S").unwrap(), Duration::from_secs(3725));
        assert_eq!(parse_iso8601_duration("P1DT1S").unwrap(), Duration::from_secs(86_401));
        assert_eq!(parse_iso8601_duration("PT0S").unwrap(), Duration::ZERO);
        assert_eq!(parse_iso8601_duration("P0D").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_iso8601_rejects_garbage() {
        for input in ["", "P", "PT", "4:13", "PT5X", "P1Y", "P1M", "PTS", "PT99999999999999999999999S"] {
            assert!(
                parse_iso8601_duration(input).is_err(),
                "debería rechazar {:?}",
                input
            );
        }
    }
}
