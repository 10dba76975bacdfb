// ABOUTME: Canonical date normalization with a fixed time-of-day policy per phrase class.
// ABOUTME: Wraps NaturalDateParser and always returns timestamps in the configured zone.

use chrono::{DateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::parser::{localize, NaturalDateParser, ParserSettings, PhraseClass};

/// Explicit clock fragment in the raw text ("10:11", "T08:11:00Z", "9 pm").
static TIME_FRAGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^\d:])\d{1,2}:\d{2}(?::\d{2})?(?:[^\d:]|$)|\b\d{1,2}\s?(?:am|pm)\b")
        .unwrap()
});

/// Reports whether `raw` carries an explicit clock time.
pub fn has_explicit_time(raw: &str) -> bool {
    TIME_FRAGMENT_RE.is_match(raw)
}

/// Classifies a raw date phrase for the time-of-day policy.
pub fn classify(raw: &str) -> PhraseClass {
    NaturalDateParser::default().classify(raw)
}

/// Converts free-text publish dates into canonical timestamps in one zone.
///
/// The time of day follows a fixed policy:
///
/// - text with an explicit clock keeps the parsed time;
/// - "yesterday" phrases (`yesterday`, `wczoraj`, `przedwczoraj`) are pinned to midnight;
/// - other relative phrases ("2 days ago", "za 3 godziny", "last friday") keep the
///   time carried over from the reference instant;
/// - plain calendar dates are pinned to midnight.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    parser: NaturalDateParser,
}

impl DateNormalizer {
    pub fn new(zone: Tz) -> Self {
        Self {
            parser: NaturalDateParser::new(ParserSettings {
                zone,
                ..ParserSettings::default()
            }),
        }
    }

    pub fn with_parser(parser: NaturalDateParser) -> Self {
        Self { parser }
    }

    pub fn zone(&self) -> Tz {
        self.parser.settings().zone
    }

    pub fn normalize<Z: TimeZone>(
        &self,
        raw: Option<&str>,
        reference: &DateTime<Z>,
    ) -> Option<DateTime<Tz>> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
        let zone = self.zone();

        let Some(parsed) = self.parser.parse_detailed(raw, reference) else {
            debug!(raw, "date text not recognized");
            return None;
        };
        let value = parsed.value.with_timezone(&zone);

        if parsed.explicit_time {
            return Some(value);
        }

        match parsed.class {
            PhraseClass::Relative => Some(value),
            PhraseClass::Yesterday | PhraseClass::Absolute => {
                localize(&zone, value.date_naive().and_time(NaiveTime::MIN))
            }
        }
    }
}

/// Normalizes `raw` against `reference` into `zone`. See [`DateNormalizer`].
pub fn normalize<Z: TimeZone>(
    raw: Option<&str>,
    reference: &DateTime<Z>,
    zone: Tz,
) -> Option<DateTime<Tz>> {
    DateNormalizer::new(zone).normalize(raw, reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_time_detection() {
        assert!(has_explicit_time("14.10.2024 10:11"));
        assert!(has_explicit_time("at 9PM"));
        assert!(has_explicit_time("10:11:05"));
        assert!(has_explicit_time("2024-10-14T08:11:00Z"));
        assert!(has_explicit_time("2024-10-14T08:11Z"));
        assert!(has_explicit_time("2024-10-14T08:11:00.000+02:00"));
        assert!(!has_explicit_time("14.10.2024"));
        assert!(!has_explicit_time("2 days ago"));
        assert!(!has_explicit_time("2024-10-14"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("Yesterday"), PhraseClass::Yesterday);
        assert_eq!(classify("wczoraj"), PhraseClass::Yesterday);
        assert_eq!(classify("przedwczoraj"), PhraseClass::Yesterday);
        assert_eq!(classify("2 days ago"), PhraseClass::Relative);
        assert_eq!(classify("3 dni temu"), PhraseClass::Relative);
        assert_eq!(classify("za 2 godziny"), PhraseClass::Relative);
        assert_eq!(classify("in 3 weeks"), PhraseClass::Relative);
        assert_eq!(classify("w zeszły piątek"), PhraseClass::Relative);
        assert_eq!(classify("Monday"), PhraseClass::Relative);
        assert_eq!(classify("14.10.2024"), PhraseClass::Absolute);
        assert_eq!(classify("October 14, 2024"), PhraseClass::Absolute);
        assert_eq!(classify("Mon, 14 Oct 2024"), PhraseClass::Absolute);
        assert_eq!(classify("Last updated 14.10.2024"), PhraseClass::Absolute);
        assert_eq!(classify("Next edition: October 14, 2024"), PhraseClass::Absolute);
        assert_eq!(classify("today 10:15"), PhraseClass::Relative);
        assert_eq!(classify("lorem ipsum"), PhraseClass::Absolute);
    }

    #[test]
    fn test_timestamp_keeps_clock() {
        let now = chrono::Utc::now();
        let normalizer = DateNormalizer::default();
        let got = normalizer
            .normalize(Some("2024-10-14T08:11:00Z"), &now)
            .unwrap();
        assert_eq!(got.to_rfc3339(), "2024-10-14T10:11:00+02:00");
    }

    #[test]
    fn test_blank_input_is_none() {
        let now = chrono::Utc::now();
        let normalizer = DateNormalizer::default();
        assert!(normalizer.normalize(None, &now).is_none());
        assert!(normalizer.normalize(Some(""), &now).is_none());
        assert!(normalizer.normalize(Some("  \n"), &now).is_none());
    }
}
