//! The record seam: what the policy needs from the host's ORM entity.
//!
//! The policy never owns records; the host's save pipeline passes one in per
//! event. All it asks of the entity machinery is the new/existing flag,
//! per-field dirty tracking, and a way to write a field. Field values are
//! `Option<String>` so "no authenticated actor" stays distinct from an empty
//! actor id.

use std::collections::{BTreeMap, BTreeSet};

/// Dirty-tracked record as seen by the stamping policy.
pub trait Record {
    /// True while the record has never been persisted.
    fn is_new(&self) -> bool;

    /// True if the caller explicitly set `field` since the record was last
    /// loaded or cleaned.
    fn is_field_dirty(&self, field: &str) -> bool;

    /// Write `field`. `None` is a real write (clears any prior value).
    fn set_field(&mut self, field: &str, value: Option<String>);

    /// Drop the dirty flag for `field` without changing its value.
    fn mark_field_clean(&mut self, field: &str);
}

/// In-memory [`Record`] with explicit dirty tracking.
///
/// Reference implementation for hosts without an ORM, and the record used
/// throughout the test suite. Setting a field through [`Record::set_field`]
/// marks it dirty, the way ORM entities track assignment.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecord {
    is_new: bool,
    fields: BTreeMap<String, Option<String>>,
    dirty: BTreeSet<String>,
}

impl MemoryRecord {
    /// A record that has never been persisted.
    pub fn new_record() -> Self {
        MemoryRecord {
            is_new: true,
            ..MemoryRecord::default()
        }
    }

    /// A record already present in storage.
    pub fn existing_record() -> Self {
        MemoryRecord {
            is_new: false,
            ..MemoryRecord::default()
        }
    }

    /// Builder-style caller assignment: sets the value and marks the field
    /// dirty, exactly as if application code had assigned it before save.
    pub fn with_field(mut self, field: &str, value: &str) -> Self {
        self.fields
            .insert(field.to_string(), Some(value.to_string()));
        self.dirty.insert(field.to_string());
        self
    }

    /// Current value of `field`, if one was ever written.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }

    /// True if `field` has been written at all, even with an absent value.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

impl Record for MemoryRecord {
    fn is_new(&self) -> bool {
        self.is_new
    }

    fn is_field_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }

    fn set_field(&mut self, field: &str, value: Option<String>) {
        self.fields.insert(field.to_string(), value);
        self.dirty.insert(field.to_string());
    }

    fn mark_field_clean(&mut self, field: &str) {
        self.dirty.remove(field);
    }
}
