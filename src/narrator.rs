//! Association wording for link mode.
//!
//! In link mode an association is not embedded in the resource; clients exchange URIs
//! instead. The title and description of such a property say so.

/// Title and description of an association property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub summary: String,
    pub description: String,
}

/// Describes how an association named `link_name` is exchanged.
///
/// # Arguments
///
/// * `link_name` - Name of the property as seen by clients
/// * `is_collection` - Whether the property holds several associations
/// * `base_summary` - Summary derived from the doc comment
pub fn narrate(link_name: &str, is_collection: bool, base_summary: &str) -> Narration {
    if is_collection {
        Narration {
            summary: format!("URIs to the resource associations: {}", base_summary),
            description: format!(
                "On creation with POST this is an array of URIs to the associated resources. \
                 On GET the associations are not included; they are provided as a collection \
                 of links under `_links.{}.href`. To replace the associations use PUT with the \
                 content type `text/uri-list` on the association resource, listing one URI per line.",
                link_name
            ),
        }
    } else {
        Narration {
            summary: format!("URI to the resource association: {}", base_summary),
            description: format!(
                "On creation with POST this is the URI of the associated resource. \
                 On GET the association is not included; it is provided as a link under \
                 `_links.{}.href`. To replace the association use PUT with the content type \
                 `text/uri-list` on the association resource, giving the single URI.",
                link_name
            ),
        }
    }
}
