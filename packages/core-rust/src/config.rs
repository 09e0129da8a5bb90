//! Presentation flags and the reference clock used by date heuristics.

use chrono::Datelike;

/// Form-wide configuration.
///
/// Replaces the browser-sniffed globals of older form libraries: whether
/// dates render in ISO form and whether HTML5 input types are emitted are
/// decided by the caller, not inferred from a request header.
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Present dates and times in ISO form (`2014-03-05`, `17:30`).
    pub iso_dates: bool,
    /// Emit HTML5 input types and attributes.
    pub html5: bool,
    /// Pinned century for 2-digit year expansion (`20` turns `14` into
    /// `2014`). `None` uses the century of the current UTC year.
    pub century: Option<i32>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            iso_dates: false,
            html5: true,
            century: None,
        }
    }
}

/// Source of the current calendar year.
///
/// Injected so the 2-digit-year heuristic can be tested deterministically.
pub trait YearSource {
    fn current_year(&self) -> i32;
}

/// Reads the year from the system clock (UTC).
#[derive(Debug, Clone, Copy)]
pub struct SystemYear;

impl YearSource for SystemYear {
    fn current_year(&self) -> i32 {
        chrono::Utc::now().year()
    }
}

/// Always reports the same year.
#[derive(Debug, Clone, Copy)]
pub struct FixedYear(pub i32);

impl YearSource for FixedYear {
    fn current_year(&self) -> i32 {
        self.0
    }
}

/// Per-parse snapshot of everything canonicalization may depend on.
///
/// Built once at the start of a parse so every field of a submission sees
/// the same reference year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    /// Century prefix applied to 2-digit years (`20` for 2000-2099).
    pub century: i32,
}

impl ParseContext {
    #[must_use]
    pub fn new(config: &FormConfig, years: &dyn YearSource) -> Self {
        let century = config
            .century
            .unwrap_or_else(|| years.current_year().div_euclid(100));
        Self { century }
    }

    /// Expands a year that was entered with fewer than three digits.
    #[must_use]
    pub fn expand_year(&self, year: i32) -> i32 {
        if year < 100 {
            self.century * 100 + year
        } else {
            year
        }
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new(&FormConfig::default(), &SystemYear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_config_defaults() {
        let config = FormConfig::default();
        assert!(!config.iso_dates);
        assert!(config.html5);
        assert!(config.century.is_none());
    }

    #[test]
    fn century_follows_year_source() {
        let ctx = ParseContext::new(&FormConfig::default(), &FixedYear(2026));
        assert_eq!(ctx.century, 20);
        assert_eq!(ctx.expand_year(14), 2014);
        assert_eq!(ctx.expand_year(1999), 1999);

        let ctx = ParseContext::new(&FormConfig::default(), &FixedYear(2101));
        assert_eq!(ctx.expand_year(14), 2114);
    }

    #[test]
    fn pinned_century_overrides_clock() {
        let config = FormConfig {
            century: Some(19),
            ..FormConfig::default()
        };
        let ctx = ParseContext::new(&config, &FixedYear(2026));
        assert_eq!(ctx.expand_year(64), 1964);
    }
}
