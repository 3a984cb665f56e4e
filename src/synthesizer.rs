//! Builds the schema attribute of a declaration from its doc text, constraints and
//! association wording.

use crate::annotation::{
    escape, AnnotationPatch, SchemaValue, DESCRIPTION_KEY, MAXIMUM_KEY, MAX_LENGTH_KEY,
    MINIMUM_KEY, MIN_LENGTH_KEY, REQUIRED_KEY, TITLE_KEY,
};
use crate::constraints::ConstraintRecord;
use crate::doc_comment::{DocText, NO_DESCRIPTION};
use crate::narrator::Narration;

/// Computes the attribute entries of a declaration.
///
/// Running this on its own output with the same inputs yields the same attribute.
///
/// # Arguments
///
/// * `existing` - The declaration's current schema attribute, if any
/// * `doc` - Summary and description of the doc comment (or the placeholder)
/// * `constraints` - Constraints of fields and getters; `None` for type declarations
/// * `narration` - Association wording in link mode
/// * `length_like` - Whether size constraints are lengths rather than value ranges
pub fn synthesize(
    existing: Option<AnnotationPatch>,
    doc: &DocText,
    constraints: Option<&ConstraintRecord>,
    narration: Option<&Narration>,
    length_like: bool,
) -> AnnotationPatch {
    let mut patch = existing.unwrap_or_default();

    let prose = match narration {
        Some(narration) if doc.placeholder => narration.description.clone(),
        Some(narration) => format!("{} {}", narration.description, doc_prose(doc)),
        None => doc_prose(doc),
    };
    let title = narration.map_or(doc.summary.as_str(), |n| n.summary.as_str());

    let Some(constraints) = constraints else {
        patch.set(DESCRIPTION_KEY, SchemaValue::Str(escape(&prose)));
        patch.set(TITLE_KEY, SchemaValue::Str(escape(title)));
        return patch;
    };

    let (min_length, max_length, mut minimum, mut maximum) = if length_like {
        (constraints.min_length, constraints.max_length, None, None)
    } else {
        (None, None, constraints.min_length, constraints.max_length)
    };
    // value markers win over sizes
    if constraints.min.is_some() {
        minimum = constraints.min;
    }
    if constraints.max.is_some() {
        maximum = constraints.max;
    }

    let mut sentences = Vec::new();
    if constraints.required {
        sentences.push("This value is required.".to_string());
    }
    if let Some(value) = min_length {
        sentences.push(format!("The minimum length is {}.", value));
    }
    if let Some(value) = max_length {
        sentences.push(format!("The maximum length is {}.", value));
    }
    if let Some(value) = maximum {
        sentences.push(format!("The maximum value is {}.", value));
    }
    if let Some(value) = minimum {
        sentences.push(format!("The minimum value is {}.", value));
    }

    let mut description = escape(&prose);
    if !sentences.is_empty() {
        description.push_str("<ul><li>");
        description.push_str(&sentences.join("</li><li>"));
        description.push_str("</li></ul>");
    }

    patch.set(DESCRIPTION_KEY, SchemaValue::Str(description));
    patch.set(TITLE_KEY, SchemaValue::Str(escape(title)));
    if constraints.required {
        patch.set(REQUIRED_KEY, SchemaValue::Bool(true));
    }
    if let Some(value) = min_length {
        patch.set(MIN_LENGTH_KEY, SchemaValue::Int(value));
    }
    if let Some(value) = max_length {
        patch.set(MAX_LENGTH_KEY, SchemaValue::Int(value));
    }
    if let Some(value) = minimum {
        patch.set(MINIMUM_KEY, SchemaValue::Str(value.to_string()));
    }
    if let Some(value) = maximum {
        patch.set(MAXIMUM_KEY, SchemaValue::Str(value.to_string()));
    }
    patch
}

/// Summary and description joined into one text.
fn doc_prose(doc: &DocText) -> String {
    if doc.placeholder {
        return NO_DESCRIPTION.to_string();
    }
    match &doc.description {
        Some(description) if doc.summary.is_empty() => description.clone(),
        Some(description) if doc.summary.ends_with(['.', '!', '?']) => {
            format!("{} {}", doc.summary, description)
        }
        Some(description) => format!("{}. {}", doc.summary, description),
        None => doc.summary.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc_comment::split;
    use crate::narrator::narrate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_username() {
        let constraints = ConstraintRecord {
            required: true,
            min_length: Some(1),
            ..Default::default()
        };

        let patch = synthesize(None, &split("The username."), Some(&constraints), None, true);
        assert_eq!(
            patch.render(),
            "#[schema(description = \"The username.<ul><li>This value is required.</li>\
             <li>The minimum length is 1.</li></ul>\", title = \"The username.\", \
             required = true, min_length = 1)]"
        );
    }

    #[test]
    fn test_type_declaration_gets_title_and_description_only() {
        let patch = synthesize(
            None,
            &split("A user.<p>Being able to log in."),
            None,
            None,
            false,
        );

        assert_eq!(
            patch.render(),
            "#[schema(description = \"A user. Being able to log in.\", title = \"A user.\")]"
        );
    }

    #[test]
    fn test_summary_without_punctuation_is_joined_with_period() {
        let patch = synthesize(None, &split("A user<p>Details"), None, None, false);

        assert_eq!(
            patch.get(DESCRIPTION_KEY),
            Some(&SchemaValue::Str("A user. Details".into()))
        );
    }

    #[test]
    fn test_placeholder() {
        let patch = synthesize(
            None,
            &DocText::placeholder(),
            Some(&ConstraintRecord::default()),
            None,
            false,
        );

        assert_eq!(
            patch.render(),
            "#[schema(description = \"No description\", title = \"No summary\")]"
        );
    }

    #[test]
    fn test_sizes_of_numbers_become_ranges() {
        let constraints = ConstraintRecord {
            min_length: Some(2),
            max_length: Some(500),
            max: Some(100),
            ..Default::default()
        };

        let patch = synthesize(None, &split("Count."), Some(&constraints), None, false);
        assert_eq!(patch.get(MIN_LENGTH_KEY), None);
        assert_eq!(patch.get(MINIMUM_KEY), Some(&SchemaValue::Str("2".into())));
        assert_eq!(patch.get(MAXIMUM_KEY), Some(&SchemaValue::Str("100".into())));
        assert_eq!(
            patch.get(DESCRIPTION_KEY),
            Some(&SchemaValue::Str(
                "Count.<ul><li>The maximum value is 100.</li><li>The minimum value is 2.</li></ul>"
                    .into()
            ))
        );
    }

    #[test]
    fn test_narration_leads() {
        let doc = split("The role.");
        let narration = narrate("role", false, &doc.summary);

        let patch = synthesize(None, &doc, Some(&ConstraintRecord::default()), Some(&narration), false);
        assert_eq!(
            patch.get(TITLE_KEY),
            Some(&SchemaValue::Str("URI to the resource association: The role.".into()))
        );
        let Some(SchemaValue::Str(description)) = patch.get(DESCRIPTION_KEY) else {
            panic!("description missing");
        };
        assert!(description.starts_with("On creation with POST"));
        assert!(description.ends_with(" The role."));
    }

    #[test]
    fn test_narration_keeps_constraint_list() {
        let doc = split("The main group.");
        let narration = narrate("mainGroup", false, &doc.summary);
        let constraints = ConstraintRecord {
            required: true,
            ..Default::default()
        };

        let patch = synthesize(None, &doc, Some(&constraints), Some(&narration), false);
        let Some(SchemaValue::Str(description)) = patch.get(DESCRIPTION_KEY) else {
            panic!("description missing");
        };
        assert!(description.starts_with("On creation with POST"));
        assert!(description.contains("`_links.mainGroup.href`"));
        assert!(description.ends_with(" The main group.<ul><li>This value is required.</li></ul>"));
        assert_eq!(patch.get(REQUIRED_KEY), Some(&SchemaValue::Bool(true)));
    }

    #[test]
    fn test_idempotent_on_existing_patch() {
        let constraints = ConstraintRecord {
            required: true,
            ..Default::default()
        };
        let doc = split("This is a \"test\"\nwith two lines.");

        let first = synthesize(None, &doc, Some(&constraints), None, true);
        let second = synthesize(Some(first.clone()), &doc, Some(&constraints), None, true);
        assert_eq!(first, second);
        assert_eq!(
            first.get(TITLE_KEY),
            Some(&SchemaValue::Str("This is a \\\"test\\\" with two lines.".into()))
        );
    }
}
