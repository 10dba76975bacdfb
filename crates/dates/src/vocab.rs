// ABOUTME: English and Polish vocabulary for month names, weekdays and relative time units.
// ABOUTME: Lookups take lower-cased tokens with surrounding punctuation already stripped.

use chrono::Weekday;

/// A calendar or clock unit used in relative phrases ("3 days ago", "za 2 godziny").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("styczeń", 1),
    ("stycznia", 1),
    ("sty", 1),
    ("february", 2),
    ("feb", 2),
    ("luty", 2),
    ("lutego", 2),
    ("lut", 2),
    ("march", 3),
    ("mar", 3),
    ("marzec", 3),
    ("marca", 3),
    ("april", 4),
    ("apr", 4),
    ("kwiecień", 4),
    ("kwietnia", 4),
    ("kwi", 4),
    ("may", 5),
    ("maj", 5),
    ("maja", 5),
    ("june", 6),
    ("jun", 6),
    ("czerwiec", 6),
    ("czerwca", 6),
    ("cze", 6),
    ("july", 7),
    ("jul", 7),
    ("lipiec", 7),
    ("lipca", 7),
    ("lip", 7),
    ("august", 8),
    ("aug", 8),
    ("sierpień", 8),
    ("sierpnia", 8),
    ("sie", 8),
    ("september", 9),
    ("sep", 9),
    ("sept", 9),
    ("wrzesień", 9),
    ("września", 9),
    ("wrz", 9),
    ("october", 10),
    ("oct", 10),
    ("październik", 10),
    ("października", 10),
    ("paź", 10),
    ("november", 11),
    ("nov", 11),
    ("listopad", 11),
    ("listopada", 11),
    ("lis", 11),
    ("december", 12),
    ("dec", 12),
    ("grudzień", 12),
    ("grudnia", 12),
    ("gru", 12),
];

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("mon", Weekday::Mon),
    ("poniedziałek", Weekday::Mon),
    ("pon", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("tue", Weekday::Tue),
    ("tues", Weekday::Tue),
    ("wtorek", Weekday::Tue),
    ("wt", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("wed", Weekday::Wed),
    ("środa", Weekday::Wed),
    ("środę", Weekday::Wed),
    ("śr", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("thu", Weekday::Thu),
    ("thurs", Weekday::Thu),
    ("czwartek", Weekday::Thu),
    ("czw", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("fri", Weekday::Fri),
    ("piątek", Weekday::Fri),
    ("pt", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sat", Weekday::Sat),
    ("sobota", Weekday::Sat),
    ("sobotę", Weekday::Sat),
    ("sob", Weekday::Sat),
    ("sunday", Weekday::Sun),
    ("sun", Weekday::Sun),
    ("niedziela", Weekday::Sun),
    ("niedzielę", Weekday::Sun),
    ("niedz", Weekday::Sun),
    ("nd", Weekday::Sun),
];

const UNITS: &[(&str, Unit)] = &[
    ("s", Unit::Second),
    ("sec", Unit::Second),
    ("secs", Unit::Second),
    ("second", Unit::Second),
    ("seconds", Unit::Second),
    ("sek", Unit::Second),
    ("sekunda", Unit::Second),
    ("sekundę", Unit::Second),
    ("sekundy", Unit::Second),
    ("sekund", Unit::Second),
    ("min", Unit::Minute),
    ("mins", Unit::Minute),
    ("minute", Unit::Minute),
    ("minutes", Unit::Minute),
    ("minuta", Unit::Minute),
    ("minutę", Unit::Minute),
    ("minuty", Unit::Minute),
    ("minut", Unit::Minute),
    ("h", Unit::Hour),
    ("hr", Unit::Hour),
    ("hrs", Unit::Hour),
    ("hour", Unit::Hour),
    ("hours", Unit::Hour),
    ("godz", Unit::Hour),
    ("godzina", Unit::Hour),
    ("godzinę", Unit::Hour),
    ("godziny", Unit::Hour),
    ("godzin", Unit::Hour),
    ("day", Unit::Day),
    ("days", Unit::Day),
    ("dzień", Unit::Day),
    ("dni", Unit::Day),
    ("week", Unit::Week),
    ("weeks", Unit::Week),
    ("wk", Unit::Week),
    ("tydzień", Unit::Week),
    ("tygodnie", Unit::Week),
    ("tygodni", Unit::Week),
    ("tyg", Unit::Week),
    ("tygodniu", Unit::Week),
    ("month", Unit::Month),
    ("months", Unit::Month),
    ("miesiąc", Unit::Month),
    ("miesiące", Unit::Month),
    ("miesięcy", Unit::Month),
    ("mies", Unit::Month),
    ("miesiącu", Unit::Month),
    ("year", Unit::Year),
    ("years", Unit::Year),
    ("yr", Unit::Year),
    ("yrs", Unit::Year),
    ("rok", Unit::Year),
    ("lata", Unit::Year),
    ("lat", Unit::Year),
    ("roku", Unit::Year),
];

/// Looks up a month number (1-12) by English or Polish name or abbreviation.
pub fn month(token: &str) -> Option<u32> {
    lookup(MONTHS, token)
}

/// Looks up a weekday by English or Polish name or abbreviation.
pub fn weekday(token: &str) -> Option<Weekday> {
    lookup(WEEKDAYS, token)
}

/// Looks up a relative-time unit by English or Polish name, including inflected forms.
pub fn unit(token: &str) -> Option<Unit> {
    lookup(UNITS, token)
}

fn lookup<T: Copy>(table: &[(&str, T)], token: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, value)| *value)
}

/// Strips punctuation that commonly trails or wraps date tokens ("14,", "paź.", "(wtorek)").
pub fn strip_token(token: &str) -> &str {
    token.trim_matches(|c: char| matches!(c, ',' | '.' | ';' | '(' | ')' | '|' | '–' | '—'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_lookup_covers_both_languages() {
        assert_eq!(month("october"), Some(10));
        assert_eq!(month("października"), Some(10));
        assert_eq!(month("paź"), Some(10));
        assert_eq!(month("maja"), Some(5));
        assert_eq!(month("octobre"), None);
    }

    #[test]
    fn test_weekday_lookup() {
        assert_eq!(weekday("poniedziałek"), Some(Weekday::Mon));
        assert_eq!(weekday("sunday"), Some(Weekday::Sun));
        assert_eq!(weekday("środę"), Some(Weekday::Wed));
    }

    #[test]
    fn test_unit_lookup_inflections() {
        assert_eq!(unit("godziny"), Some(Unit::Hour));
        assert_eq!(unit("godzin"), Some(Unit::Hour));
        assert_eq!(unit("dni"), Some(Unit::Day));
        assert_eq!(unit("days"), Some(Unit::Day));
        assert_eq!(unit("fortnight"), None);
    }

    #[test]
    fn test_strip_token() {
        assert_eq!(strip_token("14,"), "14");
        assert_eq!(strip_token("paź."), "paź");
        assert_eq!(strip_token("(wtorek)"), "wtorek");
    }
}
