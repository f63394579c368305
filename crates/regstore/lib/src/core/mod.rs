//! Register store core.
//!
//! # Purpose
//!
//! [`RegisterStore`] is the process-wide registry of named register arrays. It owns every
//! [`RegisterArray`] and enforces the existence, bounds, and uniqueness rules for the six
//! store operations. The IPC layer only decodes requests and encodes results.
//!
//! # Invariants
//!
//! - Size Tracks Distinct Writes: an array's size MUST equal the number of distinct indices
//!   written since creation, and MUST NOT exceed its capacity.
//!   - Enforced in: `RegisterArray::set`
//!   - Tested by: `core::tests::accounting`
//!
//! - Checks Before Mutation: a failing operation MUST leave the registry unchanged.
//!   - Enforced in: `RegisterStore::create_array`, `RegisterStore::write_value`
//!   - Tested by: `core::tests::lifecycle::duplicate_create_keeps_contents`,
//!     `core::tests::slots::out_of_range_write_changes_nothing`
//!
//! - Per-Name Atomicity: concurrent writes to the same slot MUST NOT double count it.
//!   - Enforced in: per-array mutex held for the whole of `RegisterStore::write_value`
//!   - Tested by: `core::tests::concurrency`
//!
//! # Concurrency & ordering
//!
//! The name map sits behind a read/write lock that is only write-locked by create and
//! delete. Each array has its own mutex, so operations on different names proceed in
//! parallel. Array mutexes are always taken while the map read lock is held and never the
//! other way round.

mod array;
mod error;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
pub use regstore_proto::RegisterArraySnapshot;

pub use self::array::RegisterArray;
pub use self::error::{Operation, Result, StoreError};

/// Shared registry of register arrays.
#[derive(Debug, Default)]
pub struct RegisterStore {
	/// Live arrays keyed by name, iterated in name order.
	arrays: RwLock<BTreeMap<String, Mutex<RegisterArray>>>,
}

impl RegisterStore {
	/// Create an empty store.
	#[must_use]
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Create a zeroed array of `capacity` slots under `name`.
	///
	/// # Errors
	///
	/// [`StoreError::AlreadyExists`] if `name` is taken.
	pub fn create_array(&self, name: &str, capacity: u32) -> Result<()> {
		let mut arrays = self.arrays.write();
		match arrays.entry(name.to_owned()) {
			Entry::Occupied(_) => Err(StoreError::AlreadyExists {
				name: name.to_owned(),
			}),
			Entry::Vacant(slot) => {
				slot.insert(Mutex::new(RegisterArray::new(name, capacity)));
				tracing::debug!(name, capacity, "register array created");
				Ok(())
			}
		}
	}

	/// Remove the array registered under `name`.
	///
	/// # Errors
	///
	/// [`StoreError::NotFound`] if no such array exists.
	pub fn delete_array(&self, name: &str) -> Result<()> {
		if self.arrays.write().remove(name).is_none() {
			return Err(not_found(Operation::Delete, name));
		}
		tracing::debug!(name, "register array deleted");
		Ok(())
	}

	/// Snapshot of one array.
	///
	/// # Errors
	///
	/// [`StoreError::NotFound`] if no such array exists.
	pub fn get_array(&self, name: &str) -> Result<RegisterArraySnapshot> {
		self.with_array(Operation::Get, name, |array| Ok(array.snapshot()))
	}

	/// Snapshots of every live array, ordered by name.
	#[must_use]
	pub fn get_all_arrays(&self) -> Vec<RegisterArraySnapshot> {
		self.arrays
			.read()
			.values()
			.map(|array| array.lock().snapshot())
			.collect()
	}

	/// Value stored at `index` of `name`.
	///
	/// # Errors
	///
	/// [`StoreError::NotFound`] for an unknown name, [`StoreError::OutOfRange`] when
	/// `index >= capacity`.
	pub fn read_value(&self, name: &str, index: u32) -> Result<u32> {
		self.with_array(Operation::Read, name, |array| {
			array
				.get(index)
				.ok_or_else(|| out_of_range(Operation::Read, name, index))
		})
	}

	/// Store `value` at `index` of `name`, counting the index if it was never written.
	///
	/// # Errors
	///
	/// [`StoreError::NotFound`] for an unknown name, [`StoreError::OutOfRange`] when
	/// `index >= capacity`. Neither case modifies the array.
	pub fn write_value(&self, name: &str, index: u32, value: u32) -> Result<()> {
		self.with_array(Operation::Write, name, |array| {
			let first = array
				.set(index, value)
				.ok_or_else(|| out_of_range(Operation::Write, name, index))?;
			tracing::trace!(name, index, value, first, "register written");
			Ok(())
		})
	}

	/// Number of live arrays.
	#[must_use]
	pub fn len(&self) -> usize {
		self.arrays.read().len()
	}

	/// Whether no arrays are registered.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.arrays.read().is_empty()
	}

	/// Whether `name` is registered.
	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.arrays.read().contains_key(name)
	}

	fn with_array<T>(
		&self,
		op: Operation,
		name: &str,
		f: impl FnOnce(&mut RegisterArray) -> Result<T>,
	) -> Result<T> {
		let arrays = self.arrays.read();
		let array = arrays.get(name).ok_or_else(|| not_found(op, name))?;
		f(&mut array.lock())
	}
}

fn not_found(op: Operation, name: &str) -> StoreError {
	StoreError::NotFound {
		op,
		name: name.to_owned(),
	}
}

fn out_of_range(op: Operation, name: &str, index: u32) -> StoreError {
	StoreError::OutOfRange {
		op,
		name: name.to_owned(),
		index,
	}
}
