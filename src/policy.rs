//! The stamping policy itself.
//!
//! [`FieldStampPolicy`] is wired into a host's save pipeline as a pre-save
//! hook: for every lifecycle event named in its rule table, the host calls
//! [`FieldStampPolicy::on_event`] with the record about to be persisted.
//! Fields whose rule applies and that the caller has not already set get
//! stamped with the current actor id from the session. A second entry point,
//! [`FieldStampPolicy::touch_fields`], force-stamps regardless of edit
//! history for callers that want idempotent "mark this as touched by the
//! current actor" semantics outside the event dispatcher.

use tracing::{debug, trace};

use crate::config::{Condition, PolicyConfig};
use crate::error::PolicyError;
use crate::record::Record;
use crate::session::ActorSession;

/// Stamps actor-id fields on records during save.
///
/// Holds an immutable [`PolicyConfig`] and the session capability; safe to
/// share read-only across concurrent save operations as long as the session
/// implementation is.
pub struct FieldStampPolicy<S> {
    config: PolicyConfig,
    session: S,
}

impl<S: ActorSession> FieldStampPolicy<S> {
    /// Policy with the default rule table
    /// (`beforeSave`: `creator_id` on new, `modifier_id` always).
    pub fn new(session: S) -> Self {
        FieldStampPolicy::with_config(PolicyConfig::default(), session)
    }

    /// Policy with an explicit configuration.
    pub fn with_config(config: PolicyConfig, session: S) -> Self {
        FieldStampPolicy { config, session }
    }

    /// The active configuration.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Handle a lifecycle event fired by the host's save pipeline.
    ///
    /// Looks up the rules for `event_name` and stamps every applicable,
    /// not-yet-dirty field with the current actor id. An event with no
    /// configured rules is a no-op, never an error; the save must not be
    /// blocked because a hook had nothing to do.
    ///
    /// The only failure is [`PolicyError::InvalidCondition`] for an
    /// unrecognized condition string, raised on the first offending rule
    /// with the remaining fields left unprocessed.
    pub fn on_event(&self, event_name: &str, record: &mut dyn Record) -> Result<(), PolicyError> {
        let Some(rules) = self.config.rules_for(event_name) else {
            trace!(event = event_name, "no stamp rules for event");
            return Ok(());
        };

        let is_new = record.is_new();

        for (field, when) in rules {
            let Some(condition) = Condition::parse(when) else {
                return Err(PolicyError::InvalidCondition {
                    event: event_name.to_string(),
                    field: field.clone(),
                    value: when.clone(),
                });
            };

            let applies = match condition {
                Condition::Always => true,
                Condition::OnCreate => is_new,
                Condition::OnUpdate => !is_new,
            };

            if applies {
                self.stamp_field_if_clean(record, field);
            }
        }

        Ok(())
    }

    /// Force-stamp the fields configured for `event_name`, regardless of
    /// whether the caller already set them.
    ///
    /// Every field whose condition is `always` or `existing` has its dirty
    /// flag cleared and is then stamped, so repeated calls are stable.
    /// Creation-only (`new`) rules are deliberately excluded: a forced touch
    /// never rewrites a creation-only field. Returns `true` iff at least one
    /// field was affected.
    pub fn touch_fields(&self, event_name: &str, record: &mut dyn Record) -> bool {
        let Some(rules) = self.config.rules_for(event_name) else {
            return false;
        };

        let mut touched = false;

        for (field, when) in rules {
            match Condition::parse(when) {
                Some(Condition::Always) | Some(Condition::OnUpdate) => {
                    touched = true;
                    record.mark_field_clean(field);
                    self.stamp_field_if_clean(record, field);
                }
                // `new` rules and unrecognized spellings are skipped here;
                // only the event path treats a bad spelling as an error.
                _ => {}
            }
        }

        touched
    }

    /// The current actor id, or `None` when no actor is known.
    ///
    /// Reads the configured session key from a started session. If the
    /// session is not started, logs at debug, attempts a best-effort start
    /// and retries the read; a start failure also collapses to `None`.
    /// No session problem ever escapes this method as an error.
    pub fn actor_id(&self) -> Option<String> {
        if self.session.started() {
            return self.session.read(&self.config.session_key);
        }

        debug!(
            session_key = %self.config.session_key,
            "session not started, typically no user is logged in; stamped fields \
             will be set to an absent actor id unless a manual start recovers one"
        );

        if let Err(err) = self.session.start() {
            debug!(error = %err, "best-effort session start failed");
            return None;
        }

        self.session.read(&self.config.session_key)
    }

    /// Stamp one field unless the caller already set it.
    ///
    /// An absent actor id is still a write: the field is set to `None`,
    /// recording that no authenticated actor was present.
    fn stamp_field_if_clean(&self, record: &mut dyn Record, field: &str) {
        if record.is_field_dirty(field) {
            return;
        }

        record.set_field(field, self.actor_id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MemoryRecord;
    use crate::session::MemorySession;
    use serde_json::json;

    fn policy_with_actor(actor_id: &str) -> FieldStampPolicy<MemorySession> {
        let session = MemorySession::started_with(json!({
            "Auth": {"User": {"id": actor_id}}
        }));
        FieldStampPolicy::new(session)
    }

    #[test]
    fn test_dirty_field_is_never_overwritten() {
        let policy = policy_with_actor("u-1");
        let mut record = MemoryRecord::new_record().with_field("modifier_id", "caller-set");

        policy.stamp_field_if_clean(&mut record, "modifier_id");
        assert_eq!(record.field("modifier_id"), Some("caller-set"));
    }

    #[test]
    fn test_clean_field_gets_the_actor_id() {
        let policy = policy_with_actor("u-1");
        let mut record = MemoryRecord::new_record();

        policy.stamp_field_if_clean(&mut record, "modifier_id");
        assert_eq!(record.field("modifier_id"), Some("u-1"));
    }

    #[test]
    fn test_absent_actor_is_still_written() {
        let policy = FieldStampPolicy::new(MemorySession::empty());
        let mut record = MemoryRecord::new_record();

        policy.stamp_field_if_clean(&mut record, "modifier_id");
        assert!(record.has_field("modifier_id"));
        assert_eq!(record.field("modifier_id"), None);
    }

    #[test]
    fn test_actor_id_reads_configured_session_key() {
        let session = MemorySession::started_with(json!({
            "Auth": {"Staff": {"uuid": "s-7"}}
        }));
        let config = PolicyConfig {
            session_key: "Auth.Staff.uuid".to_string(),
            ..PolicyConfig::default()
        };
        let policy = FieldStampPolicy::with_config(config, session);

        assert_eq!(policy.actor_id().as_deref(), Some("s-7"));
    }

    #[test]
    fn test_actor_id_recovers_via_best_effort_start() {
        let session = MemorySession::unstarted(json!({
            "Auth": {"User": {"id": "u-5"}}
        }));
        let policy = FieldStampPolicy::new(session);

        assert_eq!(policy.actor_id().as_deref(), Some("u-5"));
    }
}
