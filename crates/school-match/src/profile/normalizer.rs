use super::ApplicantProfile;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const GPA_FIELDS: &[&str] = &["gpa", "cumGPA"];
const TEST_SCORE_FIELDS: &[&str] = &["testScore", "test_score", "mcat"];
const EXTRAS_FIELDS: &[&str] = &["extrasScore", "extras_score"];
const SES_FIELDS: &[&str] = &["ses", "socioeconomicStatus"];

/// Coerces an untyped payload into an [`ApplicantProfile`]. Total: every field falls
/// back to `None` (or an empty set) independently.
///
/// Within an alias list the first field that is present, non-null and non-blank is
/// the one used; a malformed value there is not rescued by a later alias.
/// Demographic fields read the nested `demographics` object before top-level aliases.
/// `extrasScore` reads top-level first and nested last.
pub fn normalize(raw: &Value) -> ApplicantProfile {
    let Some(root) = raw.as_object() else {
        return ApplicantProfile::default();
    };
    let nested = root.get("demographics").and_then(Value::as_object);

    let extras = first_present(root, EXTRAS_FIELDS)
        .or_else(|| nested.and_then(|demographics| first_present(demographics, &["extrasScore"])));

    ApplicantProfile {
        gpa: first_present(root, GPA_FIELDS).and_then(to_finite_number),
        test_score: first_present(root, TEST_SCORE_FIELDS).and_then(to_finite_number),
        extras_score: extras.and_then(to_finite_number),
        state: demographic(root, nested, &["state"]).and_then(to_text),
        race: demographic(root, nested, &["race"]).and_then(to_text),
        gender: demographic(root, nested, &["gender"]).and_then(to_text),
        socioeconomic_status: demographic(root, nested, SES_FIELDS).and_then(to_text),
        preferred_regions: demographic(root, nested, &["preferredRegions"])
            .map(to_text_set)
            .unwrap_or_default(),
    }
}

fn demographic<'a>(
    root: &'a Map<String, Value>,
    nested: Option<&'a Map<String, Value>>,
    fields: &[&str],
) -> Option<&'a Value> {
    nested
        .and_then(|demographics| first_present(demographics, fields))
        .or_else(|| first_present(root, fields))
}

fn first_present<'a>(object: &'a Map<String, Value>, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .filter_map(|field| object.get(*field))
        .find(|value| match value {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            _ => true,
        })
}

fn to_finite_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()).filter(|text| !text.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn to_text_set(value: &Value) -> BTreeSet<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(to_text).collect(),
        Value::String(_) => to_text(value).into_iter().collect(),
        _ => BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_primary_and_legacy_gpa_fields() {
        assert_eq!(normalize(&json!({ "gpa": 3.8 })).gpa, Some(3.8));
        assert_eq!(normalize(&json!({ "cumGPA": "3.72" })).gpa, Some(3.72));
        assert_eq!(
            normalize(&json!({ "gpa": "3.9", "cumGPA": "3.1" })).gpa,
            Some(3.9)
        );
        assert_eq!(normalize(&json!({ "gpa": "", "cumGPA": "3.1" })).gpa, Some(3.1));
        assert_eq!(normalize(&json!({ "gpa": null, "cumGPA": 3.3 })).gpa, Some(3.3));
    }

    #[test]
    fn malformed_values_fall_back_to_none() {
        let profile = normalize(&json!({
            "gpa": "three point five",
            "mcat": true,
            "extrasScore": "NaN",
            "state": 12,
            "race": ["list"]
        }));
        assert_eq!(profile.gpa, None);
        assert_eq!(profile.test_score, None);
        assert_eq!(profile.extras_score, None);
        assert_eq!(profile.state.as_deref(), Some("12"));
        assert_eq!(profile.race, None);
    }

    #[test]
    fn non_object_input_is_an_empty_profile() {
        assert_eq!(normalize(&json!("3.5")), ApplicantProfile::default());
        assert_eq!(normalize(&Value::Null), ApplicantProfile::default());
        assert_eq!(normalize(&json!([1, 2])), ApplicantProfile::default());
    }

    #[test]
    fn nested_demographics_take_precedence() {
        let profile = normalize(&json!({
            "mcat": "515",
            "state": "TX",
            "race": "White",
            "ses": "Advantaged",
            "demographics": {
                "state": "CA",
                "ses": "Disadvantaged",
                "preferredRegions": ["West", " Northeast ", "", 7],
                "extrasScore": 40
            }
        }));

        assert_eq!(profile.test_score, Some(515.0));
        assert_eq!(profile.state.as_deref(), Some("CA"));
        assert_eq!(profile.race.as_deref(), Some("White"));
        assert_eq!(profile.socioeconomic_status.as_deref(), Some("Disadvantaged"));
        assert_eq!(profile.extras_score, Some(40.0));
        let regions: Vec<&str> = profile.preferred_regions.iter().map(String::as_str).collect();
        assert_eq!(regions, vec!["7", "Northeast", "West"]);
    }

    #[test]
    fn top_level_extras_score_wins_over_nested() {
        let profile = normalize(&json!({
            "extras_score": "80",
            "demographics": { "extrasScore": 20 }
        }));
        assert_eq!(profile.extras_score, Some(80.0));
    }
}
