//! Years, dates, times of day, and time-slot menus.
//!
//! Dates are stored as `YYYY-MM-DD` and times as 24-hour `HH:MM`; both
//! accept a local (US) form on input.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::choice::Choices;
use crate::config::ParseContext;
use crate::error::FormError;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2}|[0-9]{4})$").expect("static pattern"));
static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([01]?[0-9])-([0-3]?[0-9])$").expect("static pattern")
});
static LOCAL_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]?[0-9])[-/ ]([0-3]?[0-9])[-/ ]([0-9]{2}|[0-9]{4})$")
        .expect("static pattern")
});
static ISO_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-2][0-9]):([0-5][0-9])(?::[0-5][0-9])?$").expect("static pattern")
});
static LOCAL_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-2]?[0-9])(?::?([0-5][0-9]))?\s*(?:([aApP])\.?(?:[mM]\.?)?)?$")
        .expect("static pattern")
});

/// `YYYY` or `YY`; two-digit years take the context's century.
pub(super) fn year(s: &str, ctx: &ParseContext) -> Option<String> {
    let caps = YEAR_RE.captures(s)?;
    let digits = &caps[1];
    let year: i32 = digits.parse().ok()?;
    let year = if digits.len() == 2 {
        ctx.expand_year(year)
    } else {
        year
    };
    Some(format!("{year:04}"))
}

/// ISO `YYYY-M-D` or local `M/D/YY(YY)`. With `four_digit_year`, the
/// local form must spell out the year.
pub(super) fn date(s: &str, ctx: &ParseContext, four_digit_year: bool) -> Option<String> {
    let (year, month, day) = if let Some(caps) = ISO_DATE_RE.captures(s) {
        (caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
    } else if let Some(caps) = LOCAL_DATE_RE.captures(s) {
        let digits = &caps[3];
        if four_digit_year && digits.len() != 4 {
            return None;
        }
        let year: i32 = digits.parse().ok()?;
        let year = if digits.len() == 2 {
            ctx.expand_year(year)
        } else {
            year
        };
        (year, caps[1].parse().ok()?, caps[2].parse().ok()?)
    } else {
        return None;
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(iso_date(date))
}

fn iso_date(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// ISO `HH:MM[:SS]` (seconds dropped) or local `H[:MM] [am|pm]`.
pub(super) fn daytime(s: &str) -> Option<String> {
    if let Some(caps) = ISO_TIME_RE.captures(s) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        return (hour < 24).then(|| format!("{hour:02}:{minute:02}"));
    }
    let caps = LOCAL_TIME_RE.captures(s)?;
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
    if let Some(meridian) = caps.get(3) {
        if !(1..=12).contains(&hour) {
            return None;
        }
        hour %= 12;
        if meridian.as_str().eq_ignore_ascii_case("p") {
            hour += 12;
        }
    }
    (hour < 24 && minute < 60).then(|| format!("{hour:02}:{minute:02}"))
}

/// `2014-03-05` as `3/5/2014`.
pub(super) fn local_date(iso: &str) -> Option<String> {
    use chrono::Datelike;
    let date = NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()?;
    Some(format!("{}/{}/{}", date.month(), date.day(), date.year()))
}

/// `17:30` as `5:30 pm`.
pub(super) fn local_time(iso: &str) -> Option<String> {
    let (hour, minute) = iso.split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    let meridian = if hour < 12 { "am" } else { "pm" };
    let shown = if hour % 12 == 0 { 12 } else { hour % 12 };
    Some(format!("{shown}:{minute:02} {meridian}"))
}

/// Slots from `start` to `end` (inclusive) every `interval`, all in hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
    pub interval: f64,
}

impl TimeRange {
    #[must_use]
    pub fn new(start: f64, end: f64, interval: f64) -> Self {
        Self {
            start,
            end,
            interval,
        }
    }

    /// Minutes past midnight of every slot; empty for an unusable range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn slots(&self) -> Vec<u32> {
        let usable = self.start.is_finite()
            && self.end.is_finite()
            && self.interval.is_finite()
            && self.interval > 0.0
            && self.start >= 0.0
            && self.start <= self.end
            && self.end < 24.0;
        if !usable {
            return Vec::new();
        }
        let start = (self.start * 60.0).round() as u32;
        let end = (self.end * 60.0).round() as u32;
        let step = ((self.interval * 60.0).round() as u32).max(1);
        (start..=end).step_by(step as usize).collect()
    }

    /// 24-hour `HH:MM` of the slot at `index`.
    #[must_use]
    pub fn time_at(&self, index: usize) -> Option<String> {
        self.slots()
            .get(index)
            .map(|m| format!("{:02}:{:02}", m / 60, m % 60))
    }

    /// Menu labels (`5:00am`, `12:15pm`) keyed by slot index.
    pub(super) fn choices(&self, field: &str) -> Result<Choices, FormError> {
        let slots = self.slots();
        if slots.is_empty() {
            return Err(FormError::BadTimeRange {
                field: field.to_string(),
            });
        }
        Ok(Choices::from_list(slots.into_iter().map(slot_label)))
    }
}

fn slot_label(minutes: u32) -> String {
    let hour = minutes / 60;
    let meridian = if hour < 12 { "am" } else { "pm" };
    let shown = if hour % 12 == 0 { 12 } else { hour % 12 };
    format!("{shown}:{:02}{meridian}", minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::ChoiceKey;
    use crate::config::{FixedYear, FormConfig};

    fn ctx() -> ParseContext {
        ParseContext::new(&FormConfig::default(), &FixedYear(2026))
    }

    #[test]
    fn years() {
        assert_eq!(year("14", &ctx()).as_deref(), Some("2014"));
        assert_eq!(year("1999", &ctx()).as_deref(), Some("1999"));
        assert!(year("199", &ctx()).is_none());
        assert!(year("'99", &ctx()).is_none());
    }

    #[test]
    fn local_dates_expand_two_digit_years() {
        assert_eq!(date("3/5/14", &ctx(), false).as_deref(), Some("2014-03-05"));
        assert_eq!(date("03-05-2014", &ctx(), false).as_deref(), Some("2014-03-05"));
        assert_eq!(date("12 31 99", &ctx(), false).as_deref(), Some("2099-12-31"));
    }

    #[test]
    fn iso_dates_are_padded() {
        assert_eq!(date("2014-3-5", &ctx(), false).as_deref(), Some("2014-03-05"));
        assert_eq!(date("2014-03-05", &ctx(), false).as_deref(), Some("2014-03-05"));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert!(date("2/30/2014", &ctx(), false).is_none());
        assert!(date("2014-13-01", &ctx(), false).is_none());
        assert_eq!(date("2/29/2024", &ctx(), false).as_deref(), Some("2024-02-29"));
    }

    #[test]
    fn birthdates_need_four_digit_years() {
        assert!(date("3/5/64", &ctx(), true).is_none());
        assert_eq!(date("3/5/1964", &ctx(), true).as_deref(), Some("1964-03-05"));
        assert_eq!(date("1964-3-5", &ctx(), true).as_deref(), Some("1964-03-05"));
    }

    #[test]
    fn times_of_day() {
        assert_eq!(daytime("17:30").as_deref(), Some("17:30"));
        assert_eq!(daytime("17:30:59").as_deref(), Some("17:30"));
        assert_eq!(daytime("5:30 pm").as_deref(), Some("17:30"));
        assert_eq!(daytime("5pm").as_deref(), Some("17:00"));
        assert_eq!(daytime("12:15 a.m.").as_deref(), Some("00:15"));
        assert_eq!(daytime("12 PM").as_deref(), Some("12:00"));
        assert_eq!(daytime("930").as_deref(), Some("09:30"));
        assert!(daytime("24:00").is_none());
        assert!(daytime("13pm").is_none());
        assert!(daytime("noon").is_none());
    }

    #[test]
    fn local_renderings() {
        assert_eq!(local_date("2014-03-05").as_deref(), Some("3/5/2014"));
        assert_eq!(local_time("17:30").as_deref(), Some("5:30 pm"));
        assert_eq!(local_time("00:05").as_deref(), Some("12:05 am"));
    }

    #[test]
    fn time_menu_slots() {
        let range = TimeRange::new(5.0, 22.0, 0.25);
        let choices = range.choices("t").unwrap();
        assert_eq!(choices.len(), 69);
        let first = choices.get(&ChoiceKey::Int(0)).unwrap();
        assert_eq!(first.presentation(), "5:00am");
        let last = choices.get(&ChoiceKey::Int(68)).unwrap();
        assert_eq!(last.presentation(), "10:00pm");
        assert_eq!(range.time_at(1).as_deref(), Some("05:15"));
        assert_eq!(range.time_at(68).as_deref(), Some("22:00"));
    }

    #[test]
    fn unusable_ranges() {
        assert!(TimeRange::new(9.0, 8.0, 1.0).choices("t").is_err());
        assert!(TimeRange::new(9.0, 17.0, 0.0).choices("t").is_err());
    }
}
