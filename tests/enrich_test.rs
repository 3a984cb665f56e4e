use pretty_assertions::assert_eq;
use schema_enricher::descriptions::DescriptionCatalogue;
use schema_enricher::enricher::{Enricher, EnricherOptions};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

/// A project with the model fixtures below `src/model`
fn model_project() -> TempDir {
    create_test_project(vec![
        ("Cargo.toml", "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n"),
        ("src/lib.rs", "pub mod model;\n"),
        ("src/model/mod.rs", include_str!("fixtures/model/mod.rs")),
        ("src/model/user.rs", include_str!("fixtures/model/user.rs")),
        ("src/model/role.rs", include_str!("fixtures/model/role.rs")),
        ("src/model/group.rs", include_str!("fixtures/model/group.rs")),
        ("src/model/address.rs", include_str!("fixtures/model/address.rs")),
    ])
}

fn enrich(root: &Path, options: EnricherOptions) -> schema_enricher::enricher::EnrichSummary {
    Enricher::new(root.join("src"), options)
        .enrich()
        .expect("Enrichment failed")
}

fn read(root: &Path, file: &str) -> String {
    fs::read_to_string(root.join(file)).expect("Failed to read enriched file")
}

#[test]
fn test_username_end_to_end() {
    let project = model_project();

    let summary = enrich(project.path(), EnricherOptions::default());

    let user = read(project.path(), "src/model/user.rs");
    assert!(user.contains(
        "    /// The username.\n    #[not_empty]\n    #[schema(description = \"The username.<ul><li>This value is required.</li><li>The minimum length is 1.</li></ul>\", title = \"The username.\", required = true, min_length = 1)]\n    pub username: String,"
    ));
    assert!(user.contains(
        "#[serde(rename_all = \"camelCase\")]\n#[schema(description = \"A user being able to log-in. Users belong to groups.\", title = \"A user being able to log-in.\")]\npub struct User {"
    ));

    // lib.rs, mod.rs and role.rs declare no structs
    assert_eq!(summary.files_scanned, 6);
    assert_eq!(summary.files_rewritten, 3);
    // User + 8 fields + 1 getter, Group + 1 field, Address + 1 field
    assert_eq!(summary.declarations_enriched, 14);
    assert_eq!(
        read(project.path(), "src/model/role.rs"),
        include_str!("fixtures/model/role.rs")
    );
}

#[test]
fn test_whole_file_output() {
    let project = model_project();

    enrich(project.path(), EnricherOptions::default());

    assert_eq!(
        read(project.path(), "src/model/group.rs"),
        r#"/// A group of users.
#[schema(description = "A group of users.", title = "A group of users.")]
pub struct Group {
    /// The group name.
    #[schema(description = "The group name.", title = "The group name.")]
    pub name: String,
}
"#
    );
}

#[test]
fn test_constraints_in_output() {
    let project = model_project();

    enrich(project.path(), EnricherOptions::default());

    let user = read(project.path(), "src/model/user.rs");
    assert!(user.contains(
        "#[schema(description = \"The avatar image.<ul><li>The maximum length is 2048.</li></ul>\", title = \"The avatar image.\", max_length = 2048)]"
    ));
    assert!(user.contains(
        "#[schema(description = \"The number of failed logins.<ul><li>The maximum value is 10.</li><li>The minimum value is 0.</li></ul>\", title = \"The number of failed logins.\", minimum = \"0\", maximum = \"10\")]"
    ));
    assert!(user.contains(
        "#[schema(description = \"The main group.<ul><li>This value is required.</li></ul>\", title = \"The main group.\", required = true)]"
    ));
    assert!(user.contains(
        "    #[schema(description = \"No description\", title = \"No summary\")]\n    pub created: DateTime<Utc>,"
    ));
    assert!(user.contains(
        "    #[schema(description = \"The name shown to other users.\", title = \"The name shown to other users.\")]\n    pub fn get_display_name(&self) -> String {"
    ));
}

#[test]
fn test_enrichment_is_idempotent() {
    let project = model_project();

    enrich(project.path(), EnricherOptions::default());
    let first = read(project.path(), "src/model/user.rs");

    let summary = enrich(project.path(), EnricherOptions::default());
    let second = read(project.path(), "src/model/user.rs");

    assert_eq!(first, second);
    assert_eq!(summary.files_rewritten, 0);
    assert_eq!(summary.declarations_enriched, 14);
}

#[test]
fn test_association_wording_in_link_mode() {
    let project = model_project();

    enrich(
        project.path(),
        EnricherOptions {
            hateoas: true,
            ..Default::default()
        },
    );

    let user = read(project.path(), "src/model/user.rs");
    assert!(user.contains("title = \"URI to the resource association: The main group.\""));
    let main_group = user
        .lines()
        .find(|line| line.contains("URI to the resource association: The main group."))
        .expect("main group attribute");
    let description = main_group
        .split("description = \"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("main group description");
    assert!(description.starts_with("On creation with POST"), "{}", description);
    assert!(
        description.ends_with("The main group.<ul><li>This value is required.</li></ul>"),
        "{}",
        description
    );
    assert!(user.contains("`_links.mainGroup.href`"));
    assert!(user.contains("title = \"URIs to the resource associations: The groups of the user.\""));
    assert!(user.contains("`_links.memberGroups.href`"));
    assert!(user.contains("text/uri-list"));

    // enums, embeddables and byte blobs are values
    assert!(user.contains("title = \"The role.\""));
    assert!(user.contains("title = \"The home address.\""));
    assert!(user.contains("title = \"The avatar image.\""));
}

#[test]
fn test_association_wording_off_by_default() {
    let project = model_project();

    enrich(project.path(), EnricherOptions::default());

    let user = read(project.path(), "src/model/user.rs");
    assert!(user.contains("title = \"The main group.\""));
    assert!(user.contains("title = \"The groups of the user.\""));
    assert!(!user.contains("_links"));
}

#[test]
fn test_enrich_single_file() {
    let project = model_project();
    let enricher = Enricher::new(project.path().join("src"), EnricherOptions::default());
    let group = project.path().join("src/model/group.rs");

    let outcome = enricher.enrich_file(&group).expect("Enrichment failed");
    assert!(outcome.rewritten);
    assert_eq!(outcome.declarations, 2);
    assert_eq!(
        read(project.path(), "src/model/user.rs"),
        include_str!("fixtures/model/user.rs")
    );

    let again = enricher.enrich_file(&group).expect("Enrichment failed");
    assert!(!again.rewritten);
    assert_eq!(again.declarations, 2);

    assert!(enricher
        .enrich_file(&project.path().join("src/model/missing.rs"))
        .is_err());
}

#[test]
fn test_escaping() {
    let project = create_test_project(vec![(
        "src/note.rs",
        "pub struct Note {\n    /// This is a \"test\"\n    /// with <b>markup</b>.\n    pub text: String,\n}\n",
    )]);

    enrich(project.path(), EnricherOptions::default());

    let note = read(project.path(), "src/note.rs");
    assert!(note.contains(
        r#"#[schema(description = "This is a \"test\" with &lt;b&gt;markup&lt;/b&gt;.", title = "This is a \"test\" with &lt;b&gt;markup&lt;/b&gt;.")]"#
    ));
}

#[test]
fn test_includes_and_excludes() {
    let project = create_test_project(vec![
        ("src/model/account.rs", "pub struct Account {}\n"),
        ("src/model/generated/dto.rs", "pub struct Dto {}\n"),
        ("src/web/form.rs", "pub struct Form {}\n"),
    ]);

    let summary = enrich(
        project.path(),
        EnricherOptions {
            includes: vec!["model/**".to_string()],
            excludes: vec!["model/generated".to_string()],
            ..Default::default()
        },
    );

    assert_eq!(summary.files_scanned, 1);
    assert!(read(project.path(), "src/model/account.rs").contains("#[schema("));
    assert_eq!(
        read(project.path(), "src/model/generated/dto.rs"),
        "pub struct Dto {}\n"
    );
    assert_eq!(read(project.path(), "src/web/form.rs"), "pub struct Form {}\n");
}

#[test]
fn test_unresolved_type_is_fatal() {
    let project = create_test_project(vec![(
        "src/order.rs",
        "pub struct Order {\n    pub owner: Ghost,\n}\n",
    )]);

    let result = Enricher::new(
        project.path().join("src"),
        EnricherOptions {
            hateoas: true,
            ..Default::default()
        },
    )
    .enrich();

    let error = format!("{:#}", result.unwrap_err());
    assert!(error.contains("Ghost"), "unexpected error: {}", error);
    assert!(error.contains("order.rs"), "unexpected error: {}", error);
    assert_eq!(
        read(project.path(), "src/order.rs"),
        "pub struct Order {\n    pub owner: Ghost,\n}\n"
    );
}

#[test]
fn test_types_of_inline_modules_resolve_in_link_mode() {
    let project = create_test_project(vec![(
        "src/model.rs",
        "pub mod inner {\n    pub enum Status {\n        A,\n    }\n\n    pub struct Account {\n        pub id: u64,\n    }\n\n    pub struct User {\n        /// The status.\n        pub status: Status,\n        /// The owner.\n        pub owner: Account,\n    }\n}\n",
    )]);

    let summary = enrich(
        project.path(),
        EnricherOptions {
            hateoas: true,
            ..Default::default()
        },
    );

    let model = read(project.path(), "src/model.rs");
    assert_eq!(summary.files_rewritten, 1);
    assert!(model.contains("title = \"The status.\""));
    assert!(model.contains("title = \"URI to the resource association: The owner.\""));
    assert!(model.contains("`_links.owner.href`"));
}

#[test]
fn test_description_catalogue_fills_missing_docs() {
    let project = create_test_project(vec![(
        "src/invoice.rs",
        "pub struct Invoice {\n    /// The total.\n    pub total: i64,\n    pub number: String,\n}\n",
    )]);
    let catalogue = DescriptionCatalogue::new(
        Some("api"),
        BTreeMap::from([
            ("api.invoice".to_string(), "An invoice.".to_string()),
            ("api.invoice.total".to_string(), "Ignored.".to_string()),
            ("api.invoice.number".to_string(), "The invoice number.".to_string()),
        ]),
    );

    enrich(
        project.path(),
        EnricherOptions {
            descriptions: Some(catalogue),
            ..Default::default()
        },
    );

    let invoice = read(project.path(), "src/invoice.rs");
    assert!(invoice.contains("title = \"An invoice.\""));
    assert!(invoice.contains("title = \"The total.\""));
    assert!(invoice.contains("title = \"The invoice number.\""));
    assert!(!invoice.contains("Ignored."));
}
