//! Rules for free-text kinds. Each takes trimmed, non-blank input and
//! returns the canonical form if the input is valid.

use std::sync::LazyLock;

use regex::Regex;

use super::NumberRange;
use crate::country;
use crate::escape::is_numeric;

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?|ftp)://").expect("static pattern"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[_a-z0-9-]+(\.[_a-z0-9-]+)*@[a-z0-9-]+(\.[a-z0-9-]+)*(\.[a-z]{2,})$")
        .expect("static pattern")
});
static PASSWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S{8,}$").expect("static pattern"));
static STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{2})$").expect("static pattern"));
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{5})-?([0-9]{4})?$").expect("static pattern"));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?([0-9]{3})\)?[-. ]?([0-9]{3})[-. ]?([0-9]{4})$").expect("static pattern")
});
static INTL_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[0-9 ().-]+$").expect("static pattern"));

/// Address rejected even though it is well formed.
const SAMPLE_EMAIL: &str = "sample@email.tst";

pub(super) fn looks_like_uri(s: &str) -> bool {
    URI_RE.is_match(s)
}

pub(super) fn within_length(s: &str, maxlength: Option<usize>) -> bool {
    maxlength.is_none_or(|max| s.chars().count() <= max)
}

pub(super) fn email(s: &str) -> Option<String> {
    (EMAIL_RE.is_match(s) && !s.eq_ignore_ascii_case(SAMPLE_EMAIL)).then(|| s.to_string())
}

pub(super) fn password(s: &str) -> Option<String> {
    PASSWORD_RE.is_match(s).then(|| s.to_string())
}

pub(super) fn number(s: &str, range: &NumberRange) -> Option<String> {
    if !is_numeric(s) {
        return None;
    }
    let n: f64 = s.parse().ok().filter(|n: &f64| n.is_finite())?;
    let above_min = range.min.is_none_or(|min| n >= min);
    let below_max = range.max.is_none_or(|max| n <= max);
    (above_min && below_max).then(|| s.to_string())
}

pub(super) fn pattern(re: &Regex, s: &str) -> Option<String> {
    re.is_match(s).then(|| s.to_string())
}

pub(super) fn state(s: &str) -> Option<String> {
    STATE_RE
        .captures(s)
        .map(|caps| caps[1].to_ascii_uppercase())
}

/// Resolves names and codes to an alpha-2 code. A well-formed code that is
/// not assigned still passes.
pub(super) fn country(s: &str) -> Option<String> {
    let code = state(&country::heuristicate(s))?;
    if !country::is_country_code(&code) {
        tracing::debug!(code = %code, "accepting unassigned country code");
    }
    Some(code)
}

pub(super) fn zip(s: &str) -> Option<String> {
    ZIP_RE.captures(s).map(|caps| caps[1].to_string())
}

pub(super) fn phone(s: &str) -> Option<String> {
    PHONE_RE
        .captures(s)
        .map(|caps| format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

/// US numbers as for [`phone`]; otherwise `+` and 7 to 15 digits in groups,
/// normalized to single-space separated groups.
pub(super) fn international_phone(s: &str) -> Option<String> {
    if let Some(us) = phone(s) {
        return Some(us);
    }
    if !INTL_PHONE_RE.is_match(s) {
        return None;
    }
    let groups: Vec<&str> = s[1..]
        .split(|c: char| !c.is_ascii_digit())
        .filter(|g| !g.is_empty())
        .collect();
    let digits: usize = groups.iter().map(|g| g.len()).sum();
    (7..=15)
        .contains(&digits)
        .then(|| format!("+{}", groups.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_detection() {
        assert!(looks_like_uri("see HTTP://x.org"));
        assert!(looks_like_uri("ftp://files"));
        assert!(!looks_like_uri("http:/broken"));
        assert!(!looks_like_uri("mailto:me@x.org"));
    }

    #[test]
    fn emails() {
        assert_eq!(email("Ann.Lee@Example.COM").as_deref(), Some("Ann.Lee@Example.COM"));
        assert!(email("ann@localhost").is_none());
        assert!(email("ann lee@example.com").is_none());
        assert!(email("Sample@Email.tst").is_none());
    }

    #[test]
    fn passwords_need_eight_non_space_characters() {
        assert!(password("hunter22").is_some());
        assert!(password("hunter2").is_none());
        assert!(password("hunter 22").is_none());
    }

    #[test]
    fn numbers_respect_inclusive_bounds() {
        let range = NumberRange {
            min: Some(0.0),
            max: Some(10.0),
            step: None,
        };
        assert_eq!(number("10", &range).as_deref(), Some("10"));
        assert_eq!(number("0", &range).as_deref(), Some("0"));
        assert!(number("10.5", &range).is_none());
        assert!(number("-1", &range).is_none());
        assert!(number("ten", &range).is_none());
        assert_eq!(number("2.5e1", &NumberRange::default()).as_deref(), Some("2.5e1"));
    }

    #[test]
    fn states_uppercase() {
        assert_eq!(state("ma").as_deref(), Some("MA"));
        assert!(state("Mass").is_none());
    }

    #[test]
    fn countries_heuristicate() {
        assert_eq!(country("United Kingdom").as_deref(), Some("GB"));
        assert_eq!(country("usa").as_deref(), Some("US"));
        assert_eq!(country("zz").as_deref(), Some("ZZ"));
        assert!(country("Atlantis").is_none());
    }

    #[test]
    fn zips_keep_five_digits() {
        assert_eq!(zip("02138-1234").as_deref(), Some("02138"));
        assert_eq!(zip("021381234").as_deref(), Some("02138"));
        assert_eq!(zip("02138").as_deref(), Some("02138"));
        assert!(zip("2138").is_none());
    }

    #[test]
    fn us_phones() {
        assert_eq!(phone("555.123.4567").as_deref(), Some("555-123-4567"));
        assert_eq!(phone("(555) 123-4567").as_deref(), Some("555-123-4567"));
        assert_eq!(phone("5551234567").as_deref(), Some("555-123-4567"));
        assert!(phone("555-1234").is_none());
    }

    #[test]
    fn international_phones() {
        assert_eq!(
            international_phone("+44 20 7946 0958").as_deref(),
            Some("+44 20 7946 0958")
        );
        assert_eq!(
            international_phone("+44 (20)  7946-0958").as_deref(),
            Some("+44 20 7946 0958")
        );
        assert_eq!(
            international_phone("555.123.4567").as_deref(),
            Some("555-123-4567")
        );
        assert!(international_phone("+12 34").is_none());
        assert!(international_phone("+1234567890123456").is_none());
        assert!(international_phone("44 20 7946 0958").is_none());
    }
}
