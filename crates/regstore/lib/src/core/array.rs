//! A single named register array.

use std::collections::HashSet;

use regstore_proto::RegisterArraySnapshot;

/// Fixed-capacity array of `u32` slots with distinct-write accounting.
///
/// The written-index set lives next to the values so the two can never drift apart;
/// the reported size is always the cardinality of that set.
#[derive(Debug, Clone)]
pub struct RegisterArray {
	name: String,
	items: Vec<u32>,
	written: HashSet<u32>,
}

impl RegisterArray {
	/// Creates an array of `capacity` zeroed slots.
	#[must_use]
	pub fn new(name: impl Into<String>, capacity: u32) -> Self {
		Self {
			name: name.into(),
			items: vec![0; capacity as usize],
			written: HashSet::new(),
		}
	}

	/// Array name.
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Number of addressable slots.
	#[must_use]
	pub fn capacity(&self) -> u32 {
		self.items.len() as u32
	}

	/// Number of distinct indices written at least once.
	#[must_use]
	pub fn size(&self) -> u32 {
		self.written.len() as u32
	}

	/// Value at `index`, or `None` when out of range.
	#[must_use]
	pub fn get(&self, index: u32) -> Option<u32> {
		self.items.get(index as usize).copied()
	}

	/// Stores `value` at `index`.
	///
	/// Returns `None` when `index` is out of range, otherwise whether this was the
	/// first write to `index`.
	pub fn set(&mut self, index: u32, value: u32) -> Option<bool> {
		let slot = self.items.get_mut(index as usize)?;
		*slot = value;
		Some(self.written.insert(index))
	}

	/// Immutable copy of the current state.
	#[must_use]
	pub fn snapshot(&self) -> RegisterArraySnapshot {
		RegisterArraySnapshot {
			name: self.name.clone(),
			capacity: self.capacity(),
			size: self.size(),
			items: self.items.clone(),
		}
	}
}
