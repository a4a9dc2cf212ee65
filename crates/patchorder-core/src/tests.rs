use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::*;

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

const CATALOG_MANIFEST: &str = r#"
[[patches]]
name = "Vendor\\Catalog\\Setup\\Patch\\Schema\\CreateTables"
category = "schema"

[[patches]]
name = "Vendor\\Catalog\\Setup\\Patch\\Data\\AddAttributes"
category = "data"
dependencies = ["Vendor\\Catalog\\Setup\\Patch\\Schema\\CreateTables"]
aliases = ["Vendor\\Catalog\\Setup\\AddAttributesLegacy", "Vendor\\Catalog\\Setup\\OldAttributes"]

[[patches]]
name = "Vendor\\Catalog\\Setup\\Patch\\Data\\SeedStores"
category = "data"
arguments = ["store_code"]
"#;

#[test]
fn parse_manifest() {
    let parsed = PatchManifest::from_toml_str(CATALOG_MANIFEST).expect("manifest should parse");
    assert_eq!(parsed.patches.len(), 3);

    let add_attributes = parsed
        .get("Vendor\\Catalog\\Setup\\Patch\\Data\\AddAttributes")
        .expect("patch must be present");
    assert_eq!(add_attributes.category, PatchCategory::Data);
    assert_eq!(
        add_attributes.dependencies,
        vec!["Vendor\\Catalog\\Setup\\Patch\\Schema\\CreateTables"]
    );
    assert_eq!(add_attributes.aliases.len(), 2);
    assert!(add_attributes.arguments.is_empty());
}

#[test]
fn names_for_keeps_manifest_order_within_category() {
    let parsed = PatchManifest::from_toml_str(CATALOG_MANIFEST).expect("manifest should parse");

    assert_eq!(
        parsed.names_for(PatchCategory::Data),
        vec![
            "Vendor\\Catalog\\Setup\\Patch\\Data\\AddAttributes",
            "Vendor\\Catalog\\Setup\\Patch\\Data\\SeedStores",
        ]
    );
    assert_eq!(
        parsed.names_for(PatchCategory::Schema),
        vec!["Vendor\\Catalog\\Setup\\Patch\\Schema\\CreateTables"]
    );
}

#[test]
fn rejects_duplicate_patch_names() {
    let err = PatchManifest::from_toml_str(
        r#"
[[patches]]
name = "Foo"
category = "data"

[[patches]]
name = "Foo"
category = "schema"
"#,
    )
    .expect_err("duplicate names must be rejected");
    assert!(err.to_string().contains("duplicate patch definition 'Foo'"));
}

#[test]
fn rejects_self_dependency() {
    let err = PatchManifest::from_toml_str(
        r#"
[[patches]]
name = "Foo"
category = "data"
dependencies = ["Foo"]
"#,
    )
    .expect_err("self dependency must be rejected");
    assert!(err.to_string().contains("depends on itself"));
}

#[test]
fn rejects_self_alias() {
    let err = PatchManifest::from_toml_str(
        r#"
[[patches]]
name = "Foo"
category = "data"
aliases = ["Foo"]
"#,
    )
    .expect_err("self alias must be rejected");
    assert!(err.to_string().contains("declares itself as an alias"));
}

#[test]
fn rejects_unknown_category() {
    let err = PatchManifest::from_toml_str(
        r#"
[[patches]]
name = "Foo"
category = "config"
"#,
    )
    .expect_err("unknown category must be rejected");
    assert!(err.to_string().contains("failed to parse patch manifest"));
}

#[test]
fn parse_category_accepts_known_names_only() {
    assert_eq!(PatchCategory::parse("data"), Some(PatchCategory::Data));
    assert_eq!(PatchCategory::parse(" Schema "), Some(PatchCategory::Schema));
    assert_eq!(PatchCategory::parse("config"), None);
    assert_eq!(PatchCategory::Schema.to_string(), "schema");
}

#[test]
fn catalog_creates_descriptor_with_aliases() {
    let manifest = PatchManifest::from_toml_str(CATALOG_MANIFEST).expect("manifest should parse");
    let catalog = ManifestCatalog::new(&manifest);

    let descriptor = catalog
        .create(
            "Vendor\\Catalog\\Setup\\Patch\\Data\\AddAttributes",
            &PatchArguments::new(),
        )
        .expect("must create descriptor");
    assert!(descriptor
        .aliases()
        .contains("Vendor\\Catalog\\Setup\\OldAttributes"));
    assert_eq!(descriptor.dependencies().len(), 1);
}

#[test]
fn catalog_create_requires_declared_arguments() {
    let manifest = PatchManifest::from_toml_str(CATALOG_MANIFEST).expect("manifest should parse");
    let catalog = ManifestCatalog::new(&manifest);
    let name = "Vendor\\Catalog\\Setup\\Patch\\Data\\SeedStores";

    let err = catalog
        .create(name, &PatchArguments::new())
        .expect_err("missing argument must fail");
    assert!(err.to_string().contains("requires constructor argument 'store_code'"));

    let mut arguments = PatchArguments::new();
    arguments.insert("store_code".to_string(), "default".to_string());
    catalog
        .create(name, &arguments)
        .expect("declared argument must satisfy the factory");
}

#[test]
fn catalog_treats_unknown_names_softly() {
    let manifest = PatchManifest::from_toml_str(CATALOG_MANIFEST).expect("manifest should parse");
    let catalog = ManifestCatalog::new(&manifest);

    assert!(!catalog.exists("Vendor\\Missing\\Patch"));
    assert!(catalog
        .dependencies("Vendor\\Missing\\Patch")
        .expect("unknown names must not fail")
        .is_empty());
    assert!(catalog
        .create("Vendor\\Missing\\Patch", &PatchArguments::new())
        .is_err());
}

#[test]
fn applied_name_set_acts_as_ledger() {
    let applied: BTreeSet<String> = ["Foo".to_string()].into_iter().collect();
    assert!(applied.is_applied("Foo").expect("query"));
    assert!(!applied.is_applied("Bar").expect("query"));
}

#[test]
fn load_manifest_reports_path_on_failure() {
    let root = test_dir();
    fs::create_dir_all(&root).expect("must create test dir");
    let path = root.join("patches.toml");
    fs::write(&path, "[[patches]]\nname = 1\n").expect("must write manifest");

    let err = load_manifest(&path).expect_err("invalid manifest must fail");
    assert!(format!("{err:#}").contains("patches.toml"));

    fs::write(&path, CATALOG_MANIFEST).expect("must write manifest");
    let manifest = load_manifest(&path).expect("valid manifest must load");
    assert_eq!(manifest.patches.len(), 3);

    let _ = fs::remove_dir_all(&root);
}

fn test_dir() -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let counter = TEST_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    path.push(format!(
        "patchorder-core-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        counter
    ));
    path
}
