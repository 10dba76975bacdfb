// ABOUTME: Layered natural-language date parser for English and Polish date text.
// ABOUTME: Handles ISO/RFC3339, relative phrases, numeric DMY dates, month names and bare times.

//! Natural-language date parsing.
//!
//! Layers are tried in order and the first one producing a date wins:
//!
//! 1. RFC 3339 / ISO-8601 timestamps (with or without an offset).
//! 2. Relative phrases: "yesterday", "2 days ago", "za 3 godziny", "last monday".
//! 3. Numeric dates: `14.10.2024`, `14/10/24`, `2024-10-14`.
//! 4. Month-name dates: `October 14, 2024`, `14 października 2024`.
//! 5. Bare clock times: `10:11`, `9 pm` (on the reference date).
//! 6. The `dateparser` crate for anything else.
//!
//! Every layer works on the wall clock of the configured zone. A clock fragment
//! found anywhere in the text is split off first and re-applied to whatever date
//! the remaining words describe.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::normalize::has_explicit_time;
use crate::vocab::{self, Unit};

/// Order of day and month in all-numeric dates such as `03.04.2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    /// Day first: `14.10.2024` is 14 October.
    #[default]
    Dmy,
    /// Month first: `10/14/2024` is 14 October.
    Mdy,
}

/// Direction used to resolve ambiguous dates like a bare weekday or a date without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferDates {
    #[default]
    Past,
    Future,
}

/// Settings for [`NaturalDateParser`].
#[derive(Debug, Clone, Copy)]
pub struct ParserSettings {
    pub zone: Tz,
    pub prefer: PreferDates,
    pub order: DateOrder,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            zone: chrono_tz::Europe::Warsaw,
            prefer: PreferDates::Past,
            order: DateOrder::Dmy,
        }
    }
}

/// How a date phrase decides its time of day when it carries no clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseClass {
    /// "yesterday" and its relatives: midnight.
    Yesterday,
    /// Other relative phrases: the time computed from the reference instant.
    Relative,
    /// Calendar dates and timestamps: midnight unless a clock was given.
    Absolute,
}

/// A parsed date with what the parser learned about the text on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub value: DateTime<Tz>,
    pub class: PhraseClass,
    /// A clock time was read from the text. Full timestamps always count.
    pub explicit_time: bool,
}

/// Clock fragment with an optional connector in front of it ("at 9:30 pm", "godz. 10:15").
static CLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\b(?:at|o|godz\.?|g\.)\s*)?\b(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s?(am|pm))?\b")
        .unwrap()
});

/// Hour with a meridiem and no minutes ("9 pm", "11am").
static MERIDIEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\b(?:at|o)\s+)?\b(\d{1,2})\s?(am|pm)\b").unwrap());

static YMD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})[./-](\d{1,2})[./-](\d{1,2})\b").unwrap());

static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[./-](\d{1,2})[./-](\d{4}|\d{2})\b").unwrap());

/// Day and month without a year ("14.10").
static SHORT_NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})$").unwrap());

/// Timestamp layouts with an explicit offset, tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M%z",
];

/// Timestamp layouts without an offset, read as wall clock time in the configured zone.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Words carrying no date information in any layer.
const FILLERS: &[&str] = &["at", "on", "o", "w", "we", "the", "of"];

/// Words ignored by the month-name layer only ("14 października 2024 r.").
const DATE_FILLERS: &[&str] = &["r", "roku", "dnia"];

const LAST_WORDS: &[&str] = &[
    "last",
    "previous",
    "zeszły",
    "zeszła",
    "zeszłe",
    "zeszłym",
    "ubiegły",
    "ubiegła",
    "ubiegłe",
    "ubiegłym",
    "poprzedni",
    "poprzednia",
    "poprzednie",
];

const NEXT_WORDS: &[&str] = &[
    "next",
    "przyszły",
    "przyszła",
    "przyszłe",
    "przyszłym",
    "następny",
    "następna",
    "następne",
];

/// Free-text date parser configured for one zone, day/month order and resolution direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalDateParser {
    settings: ParserSettings,
}

impl NaturalDateParser {
    pub fn new(settings: ParserSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    /// Parses `text` relative to `reference`, returning a timestamp in the configured zone.
    ///
    /// Returns `None` when no layer recognizes the text. Never panics on malformed input.
    pub fn parse<Z: TimeZone>(&self, text: &str, reference: &DateTime<Z>) -> Option<DateTime<Tz>> {
        self.parse_detailed(text, reference).map(|parsed| parsed.value)
    }

    /// Like [`parse`](Self::parse), also reporting the phrase class and whether a
    /// clock time was read from the text.
    pub fn parse_detailed<Z: TimeZone>(
        &self,
        text: &str,
        reference: &DateTime<Z>,
    ) -> Option<ParsedDate> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let zone = self.settings.zone;
        let reference = reference.with_timezone(&zone);

        if let Some(value) = parse_timestamp(trimmed, &zone) {
            return Some(ParsedDate {
                value,
                class: PhraseClass::Absolute,
                explicit_time: true,
            });
        }

        let lowered = trimmed.to_lowercase();
        let (time, rest) = split_time(&lowered);
        let explicit_time = time.is_some();
        let tokens = tokenize(&rest);

        if tokens.is_empty() {
            // Bare clock time: today in the target zone.
            let value = time.and_then(|t| localize(&zone, reference.date_naive().and_time(t)))?;
            return Some(ParsedDate {
                value,
                class: PhraseClass::Relative,
                explicit_time,
            });
        }

        if let Some((dt, class)) = self.parse_relative(&tokens, &reference) {
            let value = match time {
                Some(t) => localize(&zone, dt.date_naive().and_time(t))?,
                None => dt,
            };
            return Some(ParsedDate {
                value,
                class,
                explicit_time,
            });
        }

        let date = self
            .parse_numeric(&tokens, &reference)
            .or_else(|| self.parse_month_name(&tokens, &reference));
        if let Some(date) = date {
            let value = localize(&zone, date.and_time(time.unwrap_or(NaiveTime::MIN)))?;
            return Some(ParsedDate {
                value,
                class: PhraseClass::Absolute,
                explicit_time,
            });
        }

        let value = self.parse_fallback(trimmed)?;
        Some(ParsedDate {
            value,
            class: PhraseClass::Absolute,
            explicit_time: has_explicit_time(trimmed),
        })
    }

    /// Classifies `text` by the layer that reads it. Unreadable text is [`PhraseClass::Absolute`].
    pub fn classify(&self, text: &str) -> PhraseClass {
        let reference = Utc
            .with_ymd_and_hms(2000, 1, 1, 12, 0, 0)
            .single()
            .map(|dt| dt.with_timezone(&self.settings.zone));
        reference
            .and_then(|reference| self.parse_detailed(text, &reference))
            .map_or(PhraseClass::Absolute, |parsed| parsed.class)
    }

    fn parse_relative(
        &self,
        tokens: &[String],
        reference: &DateTime<Tz>,
    ) -> Option<(DateTime<Tz>, PhraseClass)> {
        let words: Vec<&str> = tokens.iter().map(String::as_str).collect();

        let yesterday = match words.join(" ").as_str() {
            "yesterday" | "wczoraj" => shift(reference, Unit::Day, -1),
            "day before yesterday" | "przedwczoraj" => shift(reference, Unit::Day, -2),
            _ => None,
        };
        if let Some(dt) = yesterday {
            return Some((dt, PhraseClass::Yesterday));
        }

        self.parse_offset(&words, reference)
            .map(|dt| (dt, PhraseClass::Relative))
    }

    /// Relative phrases other than "yesterday": today, N units ago, in N units, next/last X, weekdays.
    fn parse_offset(&self, words: &[&str], reference: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        match words.join(" ").as_str() {
            "now" | "right now" | "just now" | "teraz" | "przed chwilą" | "today" | "dziś"
            | "dzisiaj" => {
                return Some(reference.clone())
            }
            "tomorrow" | "jutro" => return shift(reference, Unit::Day, 1),
            "day after tomorrow" | "pojutrze" => return shift(reference, Unit::Day, 2),
            _ => {}
        }

        match words {
            [n, unit, "ago"] | [n, unit, "temu"] => {
                let amount = amount(n)?;
                shift(reference, vocab::unit(unit)?, -amount)
            }
            // "godzinę temu", "tydzień temu"
            [unit, "temu"] => shift(reference, vocab::unit(unit)?, -1),
            ["in", n, unit] | ["za", n, unit] => {
                let amount = amount(n)?;
                shift(reference, vocab::unit(unit)?, amount)
            }
            ["za", unit] => shift(reference, vocab::unit(unit)?, 1),
            [n, unit, "from", "now"] => {
                let amount = amount(n)?;
                shift(reference, vocab::unit(unit)?, amount)
            }
            [direction, target] => {
                let step = if LAST_WORDS.contains(direction) {
                    -1
                } else if NEXT_WORDS.contains(direction) {
                    1
                } else {
                    return None;
                };
                if let Some(day) = vocab::weekday(target) {
                    return resolve_weekday(reference, day, Some(step));
                }
                shift(reference, vocab::unit(target)?, step)
            }
            [single] => {
                let day = vocab::weekday(single)?;
                let step = match self.settings.prefer {
                    PreferDates::Past => None,
                    PreferDates::Future => Some(0),
                };
                resolve_weekday(reference, day, step)
            }
            _ => None,
        }
    }

    fn parse_numeric(&self, tokens: &[String], reference: &DateTime<Tz>) -> Option<NaiveDate> {
        let joined = tokens.join(" ");

        if let Some(caps) = YMD_RE.captures(&joined) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        if let Some(caps) = NUMERIC_RE.captures(&joined) {
            let first: u32 = caps[1].parse().ok()?;
            let second: u32 = caps[2].parse().ok()?;
            let year = expand_year(caps[3].parse().ok()?);
            let (day, month) = self.day_month(first, second);
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        let caps = SHORT_NUMERIC_RE.captures(&joined)?;
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let (day, month) = self.day_month(first, second);
        self.resolve_year(month, day, reference)
    }

    fn parse_month_name(&self, tokens: &[String], reference: &DateTime<Tz>) -> Option<NaiveDate> {
        let tokens: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| !DATE_FILLERS.contains(t) && vocab::weekday(t).is_none())
            .collect();

        let idx = tokens.iter().position(|t| vocab::month(t).is_some())?;
        let month = vocab::month(tokens[idx])?;
        let number = |i: usize| tokens.get(i).and_then(|t| parse_number(t));

        let before = idx.checked_sub(1).and_then(number);
        let after = number(idx + 1);

        let (day, year) = match before.filter(|d| (1..=31).contains(d)) {
            // "14 października 2024"
            Some(day) => (Some(day), after.filter(|y| *y > 31)),
            None => match after {
                // "October 14, 2024"
                Some(day) if day <= 31 => (Some(day), number(idx + 2)),
                // "October 2024"
                Some(year) => (None, Some(year)),
                None => (None, None),
            },
        };

        if day.is_none() && year.is_none() {
            return None;
        }

        let day = day.unwrap_or(1);
        match year {
            Some(year) => NaiveDate::from_ymd_opt(expand_year(year), month, day),
            None => self.resolve_year(month, day, reference),
        }
    }

    fn parse_fallback(&self, text: &str) -> Option<DateTime<Tz>> {
        // dateparser reads bare digit runs as Unix timestamps.
        if text.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        match dateparser::parse_with(text, &self.settings.zone, NaiveTime::MIN) {
            Ok(dt) => Some(dt.with_timezone(&self.settings.zone)),
            Err(err) => {
                debug!(text, error = %err, "no date parser layer matched");
                None
            }
        }
    }

    fn day_month(&self, first: u32, second: u32) -> (u32, u32) {
        match self.settings.order {
            DateOrder::Dmy => (first, second),
            DateOrder::Mdy => (second, first),
        }
    }

    /// Picks the year for a date written without one, honouring the preferred direction.
    fn resolve_year(&self, month: u32, day: u32, reference: &DateTime<Tz>) -> Option<NaiveDate> {
        let today = reference.date_naive();
        let candidate = NaiveDate::from_ymd_opt(today.year(), month, day)?;
        match self.settings.prefer {
            PreferDates::Past if candidate > today => {
                NaiveDate::from_ymd_opt(today.year() - 1, month, day)
            }
            PreferDates::Future if candidate < today => {
                NaiveDate::from_ymd_opt(today.year() + 1, month, day)
            }
            _ => Some(candidate),
        }
    }
}

/// Parses RFC 3339 and ISO-8601 shaped timestamps, keeping any explicit offset.
fn parse_timestamp(text: &str, zone: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(zone));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(zone));
    }

    // chrono's %z does not read a "Z" designator.
    let with_offset = match text.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{}+0000", rest),
        None => text.to_string(),
    };
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, fmt) {
            return Some(dt.with_timezone(zone));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return localize(zone, naive);
        }
    }

    None
}

/// Splits the first clock fragment off `text`, returning it and the remaining text.
fn split_time(text: &str) -> (Option<NaiveTime>, String) {
    if let Some(caps) = CLOCK_RE.captures(text) {
        let hour: u32 = caps[1].parse().unwrap_or(99);
        let minute: u32 = caps[2].parse().unwrap_or(99);
        let second: u32 = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        let meridiem = caps.get(4).map(|m| m.as_str());
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let time = with_meridiem(hour, meridiem).and_then(|h| NaiveTime::from_hms_opt(h, minute, second));
        if time.is_some() {
            return (time, remove_range(text, whole));
        }
    }

    if let Some(caps) = MERIDIEM_RE.captures(text) {
        let hour: u32 = caps[1].parse().unwrap_or(99);
        let meridiem = caps.get(2).map(|m| m.as_str());
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let time = with_meridiem(hour, meridiem).and_then(|h| NaiveTime::from_hms_opt(h, 0, 0));
        if time.is_some() {
            return (time, remove_range(text, whole));
        }
    }

    (None, text.to_string())
}

fn remove_range(text: &str, range: std::ops::Range<usize>) -> String {
    format!("{} {}", &text[..range.start], &text[range.end..])
}

fn with_meridiem(hour: u32, meridiem: Option<&str>) -> Option<u32> {
    match meridiem {
        None if hour < 24 => Some(hour),
        Some("am") if (1..=12).contains(&hour) => Some(hour % 12),
        Some("pm") if (1..=12).contains(&hour) => Some(hour % 12 + 12),
        _ => None,
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        // labels such as "opublikowano:" or "published:"
        .filter(|tok| !tok.ends_with(':'))
        .map(vocab::strip_token)
        .filter(|tok| !tok.is_empty() && !FILLERS.contains(tok))
        .map(str::to_string)
        .collect()
}

fn amount(token: &str) -> Option<i64> {
    match token {
        "a" | "an" | "one" | "jeden" | "jedna" | "jedną" => Some(1),
        "two" | "dwa" | "dwie" => Some(2),
        "three" | "trzy" => Some(3),
        "four" | "cztery" => Some(4),
        "five" | "pięć" => Some(5),
        _ => token.parse::<u32>().ok().map(i64::from),
    }
}

/// Parses a day or year number, accepting English ordinal suffixes ("14th").
fn parse_number(token: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .unwrap_or(token);
    digits.parse().ok()
}

fn expand_year(year: u32) -> i32 {
    let year = year as i32;
    if year < 100 {
        2000 + year
    } else {
        year
    }
}

/// Moves `reference` by `amount` units. Calendar units keep the wall clock time.
fn shift(reference: &DateTime<Tz>, unit: Unit, amount: i64) -> Option<DateTime<Tz>> {
    let exact = match unit {
        Unit::Second => Duration::try_seconds(amount),
        Unit::Minute => Duration::try_minutes(amount),
        Unit::Hour => Duration::try_hours(amount),
        _ => None,
    };
    if let Some(delta) = exact {
        return reference.checked_add_signed(delta);
    }

    let local = reference.naive_local();
    let shifted = match unit {
        Unit::Day => local.checked_add_signed(Duration::try_days(amount)?)?,
        Unit::Week => local.checked_add_signed(Duration::try_weeks(amount)?)?,
        Unit::Month => add_months(local, amount)?,
        Unit::Year => add_months(local, amount.checked_mul(12)?)?,
        Unit::Second | Unit::Minute | Unit::Hour => return None,
    };
    localize(&reference.timezone(), shifted)
}

fn add_months(local: NaiveDateTime, amount: i64) -> Option<NaiveDateTime> {
    let months = Months::new(u32::try_from(amount.unsigned_abs()).ok()?);
    if amount >= 0 {
        local.checked_add_months(months)
    } else {
        local.checked_sub_months(months)
    }
}

/// Resolves a weekday relative to `reference`.
///
/// `step` of `None` picks the most recent such day (today included), `Some(0)` the
/// nearest upcoming one (today included), `Some(-1)` / `Some(1)` the previous / next
/// one strictly before / after today.
fn resolve_weekday(
    reference: &DateTime<Tz>,
    day: Weekday,
    step: Option<i64>,
) -> Option<DateTime<Tz>> {
    let today = i64::from(reference.weekday().num_days_from_monday());
    let target = i64::from(day.num_days_from_monday());
    let back = (today - target).rem_euclid(7);
    let forward = (target - today).rem_euclid(7);

    let days = match step {
        None => -back,
        Some(0) => forward,
        Some(s) if s < 0 => -(if back == 0 { 7 } else { back }),
        Some(_) => {
            if forward == 0 {
                7
            } else {
                forward
            }
        }
    };
    shift(reference, Unit::Day, days)
}

/// Attaches `zone` to a wall clock time. Ambiguous times take the earlier instant and
/// times inside a DST gap move forward by an hour.
pub(crate) fn localize(zone: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let moved = naive.checked_add_signed(Duration::try_hours(1)?)?;
            zone.from_local_datetime(&moved).earliest()
        }
    }
}
