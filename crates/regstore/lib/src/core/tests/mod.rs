//! Unit tests for RegisterStore.

use std::sync::Arc;

use crate::core::RegisterStore;

mod lifecycle;

/// Store pre-populated with one array per `(name, capacity)` pair.
pub(super) fn store_with(arrays: &[(&str, u32)]) -> Arc<RegisterStore> {
	let store = RegisterStore::new();
	for (name, capacity) in arrays {
		store
			.create_array(name, *capacity)
			.expect("fixture arrays have distinct names");
	}
	store
}
