//! Free-form date normalization.
//!
//! Users type dates in either the Gregorian or the Jalali calendar, with
//! ASCII, Persian, or Arabic-Indic digits and any common separator. This
//! module folds all of that into one canonical representation: a Gregorian
//! date rendered `DD.MM.YYYY`, which is the only form ever persisted so
//! that countdown arithmetic downstream needs no calendar awareness.

use chrono::NaiveDate;
use thiserror::Error;

use crate::utils::jalali;

/// Raw input longer than this is rejected before any processing.
pub const MAX_RAW_DATE_LEN: usize = 20;

/// Why a raw date string failed to normalize. Callers surface all variants
/// as one "invalid date" response; the split exists for logging and tests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Not three numeric components, or no component that looks like a year.
    #[error("expected three numbers with a four-digit year")]
    Malformed,
    /// Year falls in the 1500..=1900 band where neither calendar is plausible.
    #[error("year {0} is ambiguous between the Gregorian and Jalali calendars")]
    AmbiguousYear(i32),
    /// Shape was fine but the date does not exist in the selected calendar.
    #[error("{0}-{1}-{2} is not a valid calendar date")]
    InvalidCalendarDate(i32, u32, u32),
}

/// A validated Gregorian date in the one persisted representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Parses a string already in canonical `DD.MM.YYYY` form, as stored.
    pub fn from_stored(value: &str) -> Option<Self> {
        NaiveDate::parse_from_str(value, "%d.%m.%Y").ok().map(Self)
    }

    /// The stored date re-expressed in the Jalali calendar, `YYYY/MM/DD`,
    /// for display to Persian-calendar users.
    pub fn to_shamsi_string(&self) -> String {
        use chrono::Datelike;
        let (jy, jm, jd) = jalali::gregorian_to_jalali(self.0.year(), self.0.month(), self.0.day());
        format!("{jy:04}/{jm:02}/{jd:02}")
    }
}

impl std::fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%d.%m.%Y"))
    }
}

/// Maps Persian (U+06F0..U+06F9) and Arabic-Indic (U+0660..U+0669) digit
/// glyphs to their ASCII equivalents; every other character passes through.
fn fold_digit(c: char) -> char {
    let ascii = match c {
        '\u{06F0}'..='\u{06F9}' => c as u32 - 0x06F0,
        '\u{0660}'..='\u{0669}' => c as u32 - 0x0660,
        _ => return c,
    };
    char::from_digit(ascii, 10).unwrap_or(c)
}

fn is_separator(c: char) -> bool {
    matches!(c, '.' | '/' | '-' | ',') || c.is_whitespace()
}

/// Normalizes a free-form date string into a [`CanonicalDate`].
///
/// Disambiguation rules, applied to the three numeric components `p1.p2.p3`:
/// a component over 1000 marks the year position (`p1` wins over `p3`);
/// years above 1900 are read as Gregorian, years below 1500 as Jalali and
/// converted, and the 1500..=1900 band is rejected outright.
pub fn normalize(raw: &str) -> Result<CanonicalDate, DateError> {
    if raw.chars().count() > MAX_RAW_DATE_LEN {
        return Err(DateError::Malformed);
    }

    let folded: String = raw.chars().map(fold_digit).collect();

    let mut parts = Vec::with_capacity(3);
    for token in folded.split(is_separator).filter(|t| !t.is_empty()) {
        if !token.chars().all(|c| c.is_ascii_digit()) {
            return Err(DateError::Malformed);
        }
        let value: i64 = token.parse().map_err(|_| DateError::Malformed)?;
        parts.push(value);
    }

    let [p1, p2, p3]: [i64; 3] = parts.try_into().map_err(|_| DateError::Malformed)?;

    let (year, month, day) = if p1 > 1000 {
        (p1, p2, p3)
    } else if p3 > 1000 {
        (p3, p2, p1)
    } else {
        return Err(DateError::Malformed);
    };

    let year = i32::try_from(year).map_err(|_| DateError::Malformed)?;
    let month = u32::try_from(month).map_err(|_| DateError::Malformed)?;
    let day = u32::try_from(day).map_err(|_| DateError::Malformed)?;

    if year > 1900 {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(DateError::InvalidCalendarDate(year, month, day))?;
        Ok(CanonicalDate(date))
    } else if year < 1500 {
        if !jalali::is_valid_jalali_date(year, month, day) {
            return Err(DateError::InvalidCalendarDate(year, month, day));
        }
        let (gy, gm, gd) = jalali::jalali_to_gregorian(year, month, day);
        NaiveDate::from_ymd_opt(gy, gm, gd)
            .map(CanonicalDate)
            .ok_or(DateError::InvalidCalendarDate(year, month, day))
    } else {
        Err(DateError::AmbiguousYear(year))
    }
}
