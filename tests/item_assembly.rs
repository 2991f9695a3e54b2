//! Flat item rows assembled into catalog items.

mod fixtures;

use cpq_package::{build_from_path, Mode};
use cpq_tree::{CommerceChild, ItemCategory};
use fixtures::{fixture, settings};

#[test]
fn test_commerce_rows_grouped_by_transaction() {
    let output = build_from_path(&fixture("commerce_items.csv"), &settings(Mode::Items)).unwrap();
    let document = &output.document;
    assert_eq!(document.name, "Auto28AugTest");

    let items: Vec<_> = document.catalog_items().collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Commerce");
    assert_eq!(items[0].category, ItemCategory::Commerce);
    assert_eq!(items[1].category, ItemCategory::UtilLibrary);

    let commerce = &items[0].children[0];
    assert_eq!(commerce.variable_name, "oraclecpqo_bmClone_2");
    assert_eq!(commerce.granular, Some(true));

    // cleanup has no transaction triple so it sits directly under the container
    assert_eq!(commerce.children.len(), 2);
    match &commerce.children[0] {
        CommerceChild::Leaf(leaf) => assert_eq!(leaf.variable_name, "cleanup_t"),
        other => panic!("expected direct leaf, got {:?}", other),
    }
    match &commerce.children[1] {
        CommerceChild::Transaction(txn) => {
            assert_eq!(txn.variable_name, "transaction");
            assert_eq!(txn.resource_type, "document");
            let names: Vec<_> = txn.children.iter().map(|l| l.variable_name.as_str()).collect();
            assert_eq!(names, vec!["aPI_Save_t", "aPI_Submit_t"]);
        }
        other => panic!("expected transaction group, got {:?}", other),
    }
}

#[test]
fn test_non_commerce_item_is_flat() {
    let output = build_from_path(&fixture("commerce_items.csv"), &settings(Mode::Items)).unwrap();
    let value = serde_json::to_value(&output.document).unwrap();
    let util = &value["contents"]["items"][1];
    assert_eq!(util["category"], "UTIL_LIBRARY");

    let container = &util["children"][0];
    assert_eq!(container["variableName"], "utils");
    assert!(container.get("granular").is_none());
    assert_eq!(container["children"][0]["variableName"], "formatPrice");
    assert_eq!(container["children"][0]["resourceType"], "function");
}

#[test]
fn test_unknown_item_name_fails_build() {
    let err = build_from_path(&fixture("unknown_item.csv"), &settings(Mode::Items)).unwrap_err();
    assert_eq!(err.as_code(), "UNKNOWN_ITEM_CATEGORY");
    assert!(err.to_string().contains("Pricing Engine"));
}

#[test]
fn test_configuration_sheet_rejected_in_item_mode() {
    let err = build_from_path(&fixture("laptops.csv"), &settings(Mode::Items)).unwrap_err();
    assert_eq!(err.as_code(), "MISSING_COLUMN");
}
