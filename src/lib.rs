//! Stamp creator/modifier actor-id fields on records during save.
//!
//! A [`FieldStampPolicy`] hooks into a host's save pipeline and writes the
//! currently authenticated actor's id into configured fields, driven by a
//! small per-event rule table: stamp a field `always`, only on `new`
//! records, or only on `existing` ones. Caller-set values always win; the
//! policy never overwrites a field the application already assigned.
//!
//! The defaults reproduce the classic creator/modifier pattern:
//! `creator_id` is stamped once when a record is first saved, `modifier_id`
//! on every save.
//!
//! ```
//! use creator_modifier::{FieldStampPolicy, MemoryRecord, MemorySession};
//! use serde_json::json;
//!
//! let session = MemorySession::started_with(json!({
//!     "Auth": {"User": {"id": "U1"}}
//! }));
//! let policy = FieldStampPolicy::new(session);
//!
//! let mut record = MemoryRecord::new_record();
//! policy.on_event("beforeSave", &mut record).unwrap();
//!
//! assert_eq!(record.field("creator_id"), Some("U1"));
//! assert_eq!(record.field("modifier_id"), Some("U1"));
//! ```
//!
//! The ORM entity and the HTTP session are consumed through the [`Record`]
//! and [`ActorSession`] traits; the bundled [`MemoryRecord`] and
//! [`MemorySession`] implementations serve tests and hosts without either.

pub mod config;
pub mod error;
pub mod policy;
pub mod record;
pub mod session;

pub use config::{Condition, FieldRules, PolicyConfig, DEFAULT_SAVE_EVENT, DEFAULT_SESSION_KEY};
pub use error::PolicyError;
pub use policy::FieldStampPolicy;
pub use record::{MemoryRecord, Record};
pub use session::{ActorSession, MemorySession};
