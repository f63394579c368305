//! Tests for array creation, lookup, and deletion.

use super::store_with;
use crate::core::{Operation, RegisterStore, StoreError};

#[test]
fn create_then_get_returns_zeroed_snapshot() {
	let store = RegisterStore::new();
	store.create_array("pktsCount", 16).unwrap();

	let snap = store.get_array("pktsCount").unwrap();
	assert_eq!(snap.name, "pktsCount");
	assert_eq!(snap.capacity, 16);
	assert_eq!(snap.size, 0);
	assert_eq!(snap.items, vec![0; 16]);
}

#[test]
fn duplicate_create_keeps_contents() {
	let store = store_with(&[("meterRate", 4)]);
	store.write_value("meterRate", 1, 7).unwrap();

	let err = store.create_array("meterRate", 10).unwrap_err();
	assert_eq!(
		err,
		StoreError::AlreadyExists {
			name: "meterRate".to_string()
		}
	);
	assert_eq!(err.to_string(), "[CREATE] Register: meterRate already exists");

	let snap = store.get_array("meterRate").unwrap();
	assert_eq!(snap.capacity, 4);
	assert_eq!(snap.size, 1);
	assert_eq!(snap.items, vec![0, 7, 0, 0]);
}

#[test]
fn delete_absent_is_not_found() {
	let store = RegisterStore::new();
	let err = store.delete_array("absent").unwrap_err();
	assert_eq!(
		err,
		StoreError::NotFound {
			op: Operation::Delete,
			name: "absent".to_string()
		}
	);
	assert_eq!(err.to_string(), "[DELETE] Register: absent doesn't exist");
}

#[test]
fn deleted_array_is_gone_until_recreated() {
	let store = store_with(&[("x", 1)]);
	store.write_value("x", 0, 5).unwrap();
	store.delete_array("x").unwrap();

	assert!(matches!(store.get_array("x"), Err(StoreError::NotFound { .. })));
	assert!(matches!(store.read_value("x", 0), Err(StoreError::NotFound { .. })));
	assert!(matches!(store.write_value("x", 0, 1), Err(StoreError::NotFound { .. })));
	assert!(!store.contains("x"));

	store.create_array("x", 2).unwrap();
	let snap = store.get_array("x").unwrap();
	assert_eq!(snap.capacity, 2);
	assert_eq!(snap.size, 0);
	assert_eq!(snap.items, vec![0, 0]);
}

#[test]
fn get_missing_message_has_no_colon() {
	let store = RegisterStore::new();
	let err = store.get_array("ghost").unwrap_err();
	assert_eq!(err.to_string(), "[GET] Register ghost doesn't exist");
}

#[test]
fn get_all_on_empty_store_is_empty() {
	let store = RegisterStore::new();
	assert!(store.get_all_arrays().is_empty());
	assert!(store.is_empty());
}

#[test]
fn get_all_lists_each_array_once_by_name() {
	let store = store_with(&[("pktsCount", 16), ("bytesCount", 16), ("flowCount", 4)]);

	let names: Vec<_> = store
		.get_all_arrays()
		.into_iter()
		.map(|snap| snap.name)
		.collect();
	assert_eq!(names, ["bytesCount", "flowCount", "pktsCount"]);
	assert_eq!(store.len(), 3);
}

#[test]
fn zero_capacity_array_is_legal() {
	let store = store_with(&[("empty", 0)]);
	let snap = store.get_array("empty").unwrap();
	assert_eq!(snap.capacity, 0);
	assert!(snap.items.is_empty());
	assert!(matches!(store.read_value("empty", 0), Err(StoreError::OutOfRange { .. })));
}
