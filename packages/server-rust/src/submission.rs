//! `application/x-www-form-urlencoded` decoding into [`Submission`]s.

use url::form_urlencoded;

use formwork_core::Submission;

/// Decodes a query string or urlencoded body.
///
/// Keys ending in `[]` collect every occurrence into a list under the bare
/// name (`pets[]=1&pets[]=3` becomes `pets: ["1", "3"]`). For other keys
/// the last occurrence wins. A leading `?` is ignored.
#[must_use]
pub fn decode(input: &str) -> Submission {
    let input = input.strip_prefix('?').unwrap_or(input);
    let mut submission = Submission::new();
    for (key, value) in form_urlencoded::parse(input.as_bytes()) {
        match key.strip_suffix("[]") {
            Some(name) => submission.push(name, value.into_owned()),
            None => submission.insert(key.into_owned(), value.into_owned()),
        }
    }
    submission
}

/// The query part of a URL or request target, without the `?`.
#[must_use]
pub fn query_of(target: &str) -> &str {
    target.split_once('?').map_or("", |(_, query)| query)
}

/// `base?key=value` with the value urlencoded, appended with `&` when
/// `base` already has a query.
#[must_use]
pub fn with_query(base: &str, key: &str, value: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish();
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_core::Submitted;
    use proptest::prelude::*;

    #[test]
    fn scalars_and_lists() {
        let source = decode("name=Ann+Lee&pets%5B%5D=1&pets[]=3&note=a%26b");
        assert_eq!(source.get("name"), Some(&Submitted::Text("Ann Lee".into())));
        assert_eq!(
            source.get("pets"),
            Some(&Submitted::List(vec!["1".into(), "3".into()]))
        );
        assert_eq!(source.get("note"), Some(&Submitted::Text("a&b".into())));
    }

    #[test]
    fn last_scalar_wins() {
        let source = decode("?color=red&color=blue");
        assert_eq!(source.get("color"), Some(&Submitted::Text("blue".into())));
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(decode("").is_empty());
    }

    #[test]
    fn query_helpers() {
        assert_eq!(query_of("/edit?id=4&x=1"), "id=4&x=1");
        assert_eq!(query_of("/edit"), "");
        assert_eq!(with_query("/edit", "id", "a b&c"), "/edit?id=a+b%26c");
        assert_eq!(with_query("/edit?view=1", "id", "4"), "/edit?view=1&id=4");
    }

    proptest! {
        #[test]
        fn edit_locations_carry_any_id(id in "\\PC*") {
            let location = with_query("/edit?view=1", "id", &id);
            let source = decode(query_of(&location));
            prop_assert_eq!(source.get("id").and_then(Submitted::as_text), Some(id.as_str()));
            prop_assert_eq!(source.get("view").and_then(Submitted::as_text), Some("1"));
        }
    }
}
