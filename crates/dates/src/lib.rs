// ABOUTME: Date normalization for publisher pages written in English and Polish.
// ABOUTME: Exposes DateNormalizer, the layered NaturalDateParser and their settings.

//! Turns free-text publish dates ("wczoraj, 10:15", "2 days ago", "14.10.2024",
//! "October 14, 2024") into timezone-aware timestamps.
//!
//! ```
//! use chrono::TimeZone;
//! use chrono_tz::Europe::Warsaw;
//! use kronika_dates::DateNormalizer;
//!
//! let reference = Warsaw.with_ymd_and_hms(2024, 11, 5, 15, 45, 10).unwrap();
//! let normalizer = DateNormalizer::new(Warsaw);
//!
//! let date = normalizer.normalize(Some("14.10.2024"), &reference).unwrap();
//! assert_eq!(date, Warsaw.with_ymd_and_hms(2024, 10, 14, 0, 0, 0).unwrap());
//! ```

mod normalize;
mod parser;
mod vocab;

pub use normalize::{classify, has_explicit_time, normalize, DateNormalizer};
pub use parser::{DateOrder, NaturalDateParser, ParsedDate, ParserSettings, PhraseClass, PreferDates};
pub use vocab::Unit;

/// Default zone for publisher dates.
pub const DEFAULT_ZONE: chrono_tz::Tz = chrono_tz::Europe::Warsaw;
