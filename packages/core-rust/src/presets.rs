//! Ready-made declarations for class registration forms.

use crate::choice::{ChoiceItem, Choices};
use crate::declare::{field, opt_field, FieldSpec};

/// Day menu entries offered for a class.
pub const CLASS_DAYS: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
    "Monday-Thursday",
    "Week 1",
    "Week 2",
    "Week 3",
    "Week 4",
    "Week 5",
    "Week 6",
    "Week 7",
    "Week 8",
    "Week 9",
];

/// A class menu entry. `daytime` is false for classes without a scheduled
/// slot, which then need no day or time.
#[must_use]
pub fn class_item(
    name: impl Into<String>,
    class_type: &str,
    contact: Option<&str>,
    daytime: bool,
) -> ChoiceItem {
    let item = ChoiceItem::new(name)
        .with_payload("type", class_type)
        .with_payload("daytime", daytime);
    match contact {
        Some(contact) => item.with_payload("contact", contact),
        None => item,
    }
}

/// Class, day and time picked together.
///
/// Sub-fields are `{name}_class`, `{name}_day` and `{name}_time` (5:00am
/// to 10:00pm every quarter hour). Day and time are required once a class
/// whose `daytime` flag is set has been chosen, and ignored otherwise.
#[must_use]
pub fn class_day_time(
    name: &str,
    description: &str,
    classes: impl IntoIterator<Item = ChoiceItem>,
    optional: bool,
) -> FieldSpec {
    let mut choices = Choices::new();
    for class in classes {
        let key = class.name.clone();
        choices.insert(key.as_str(), class);
    }
    let spec = |name: String| if optional { opt_field(name) } else { field(name) };

    let class = spec(format!("{name}_class"))
        .described("Class")
        .typed("menuitem")
        .choices(choices);
    let day = field(format!("{name}_day"))
        .described("Day")
        .typed("menu")
        .choices(Choices::from_labels(CLASS_DAYS));
    let time = field(format!("{name}_time"))
        .described("Time")
        .typed("timemenu")
        .times(5.0, 22.0, 0.25);

    spec(name.to_string())
        .described(description)
        .typed("composite")
        .sub_field("class", class)
        .sub_field("day", day)
        .sub_field("time", time)
        .gate("class", "daytime")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Form;
    use crate::source::Submission;

    fn registration() -> Form {
        let classes = [
            class_item("Lap Swim", "aquatics", Some("pool@example.org"), false),
            class_item("Yoga", "fitness", Some("studio@example.org"), true),
            class_item("Pilates", "fitness", Some("studio@example.org"), true),
        ];
        let mut form = Form::new("registration");
        form.add_spec(&class_day_time("first", "First Choice", classes.clone(), false))
            .unwrap();
        form.add_spec(&class_day_time("second", "Second Choice", classes, true))
            .unwrap();
        form
    }

    fn submit(form: &mut Form, pairs: &[(&str, &str)]) -> bool {
        form.parse_values(&Submission::from_pairs(pairs.iter().copied()), true)
    }

    #[test]
    fn class_without_slot_needs_no_day() {
        let mut form = registration();
        assert!(submit(&mut form, &[("first_class", "Lap Swim")]));
        assert_eq!(form.field_html_value("first", None).as_deref(), Some("Lap Swim"));
    }

    #[test]
    fn scheduled_class_requires_day_and_time() {
        let mut form = registration();
        assert!(!submit(&mut form, &[("first_class", "Yoga")]));
        assert_eq!(form.errors(), ["You must specify Day for First Choice."]);

        assert!(!submit(&mut form, &[("first_class", "Yoga"), ("first_day", "Monday")]));
        assert_eq!(form.errors(), ["You must specify Time for First Choice."]);

        assert!(submit(
            &mut form,
            &[("first_class", "Yoga"), ("first_day", "Monday"), ("first_time", "4")]
        ));
        assert_eq!(
            form.field_html_value("first", None).as_deref(),
            Some("Yoga Monday 6:00am")
        );
    }

    #[test]
    fn required_choice_needs_a_class() {
        let mut form = registration();
        assert!(!submit(&mut form, &[("first_day", "Monday"), ("first_time", "3")]));
        assert_eq!(form.errors(), ["You must specify Class for First Choice."]);

        assert!(!submit(
            &mut form,
            &[("first_class", ""), ("first_day", "Monday"), ("first_time", "3")]
        ));
        assert_eq!(form.errors(), ["You must specify Class for First Choice."]);
    }

    #[test]
    fn optional_choice_may_skip_the_class() {
        let mut form = registration();
        assert!(submit(
            &mut form,
            &[("first_class", "Lap Swim"), ("second_day", "Monday")]
        ));
        assert!(!form.field("second", None).unwrap().has_value());
    }

    #[test]
    fn contacts_are_collected_once() {
        let mut form = registration();
        assert!(submit(
            &mut form,
            &[
                ("first_class", "Yoga"),
                ("first_day", "Monday"),
                ("first_time", "0"),
                ("second_class", "Pilates"),
                ("second_day", "Friday"),
                ("second_time", "8"),
            ]
        ));
        assert_eq!(form.selected_payload("contact"), vec!["studio@example.org"]);
        assert_eq!(form.selected_payload("type"), vec!["fitness"]);
    }
}
