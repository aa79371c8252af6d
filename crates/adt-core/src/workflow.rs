//! Workflow composer: ordered compositions that guarantee ADT's
//! pre/post conditions around mutation (lock -> update -> unlock -> activate).

use std::sync::Arc;

use regex::Regex;
use tracing::{error, warn};

use crate::catalogue::{ObjectKind, ObjectRef, SourceSection};
use crate::error::{CoreError, CoreResult};
use crate::locks::{AccessMode, HeldLock, LockBook};
use crate::ops::{ActivationOutcome, AtomicOps};

pub struct WorkflowComposer {
    ops: Arc<AtomicOps>,
    locks: LockBook,
}

impl WorkflowComposer {
    pub fn new(ops: Arc<AtomicOps>) -> Self {
        Self { ops, locks: LockBook::new() }
    }

    /// Lock -> update -> unlock (always, best-effort) -> activate.
    ///
    /// The update is considered effective even when activation produced
    /// warnings or errors: those surface as `CoreError::PartialFailure`,
    /// not as a fatal error, since the write itself already succeeded.
    pub async fn write_source(
        &self,
        obj: &ObjectRef,
        section: SourceSection,
        new_source: &str,
    ) -> CoreResult<ActivationOutcome> {
        let uri = obj.uri();
        let lock = self.ops.lock(obj).await?;
        self.locks
            .record(&uri, HeldLock { handle: lock.handle.clone(), access_mode: AccessMode::Modify })
            .await;

        let update_result = self.ops.update_source(obj, section, &lock.handle, new_source).await;

        // Best-effort compensation: always attempt the unlock, even if the
        // update failed. A failed unlock is logged, never masks the
        // original error.
        if let Err(unlock_err) = self.ops.unlock(obj, &lock.handle).await {
            error!(object = %uri, error = %unlock_err, "failed to release lock after write-source");
        }
        self.locks.take(&uri).await;

        update_result?;

        let activation = self.ops.activate(&[uri.as_str()]).await?;
        if activation.has_errors() {
            return Err(CoreError::PartialFailure(activation));
        }
        Ok(activation)
    }

    /// Create the object; if creation succeeds, write its initial source
    /// through `write_source` (lock -> update -> unlock -> activate).
    pub async fn create_and_activate(
        &self,
        kind: ObjectKind,
        name: &str,
        description: &str,
        parent: &str,
        responsible: &str,
        initial_source: &str,
    ) -> CoreResult<ActivationOutcome> {
        self.ops.create_object(kind, name, description, Some(parent), responsible).await?;
        let obj = ObjectRef::new(kind, name);
        self.write_source(&obj, SourceSection::Main, initial_source).await
    }

    /// Create the class, write its implementation, create the
    /// `testclasses` include, write the test source, activate once at the
    /// end (not after each intermediate step).
    pub async fn class_with_tests(
        &self,
        name: &str,
        description: &str,
        parent: &str,
        responsible: &str,
        implementation_source: &str,
        test_source: &str,
    ) -> CoreResult<ActivationOutcome> {
        self.ops.create_object(ObjectKind::Class, name, description, Some(parent), responsible).await?;
        let obj = ObjectRef::new(ObjectKind::Class, name);

        self.write_locked_section_without_activating(&obj, SourceSection::Implementations, implementation_source)
            .await?;
        self.write_locked_section_without_activating(&obj, SourceSection::Testclasses, test_source).await?;

        let activation = self.ops.activate(&[obj.uri().as_str()]).await?;
        if activation.has_errors() {
            return Err(CoreError::PartialFailure(activation));
        }
        Ok(activation)
    }

    async fn write_locked_section_without_activating(
        &self,
        obj: &ObjectRef,
        section: SourceSection,
        source: &str,
    ) -> CoreResult<()> {
        let uri = obj.uri();
        let lock = self.ops.lock(obj).await?;
        self.locks
            .record(&uri, HeldLock { handle: lock.handle.clone(), access_mode: AccessMode::Modify })
            .await;

        let result = self.ops.update_source(obj, section, &lock.handle, source).await;

        if let Err(unlock_err) = self.ops.unlock(obj, &lock.handle).await {
            error!(object = %uri, error = %unlock_err, "failed to release lock after write");
        }
        self.locks.take(&uri).await;

        result
    }

    /// Create new, copy source, delete old. Runs against the single
    /// process-wide stateful session so ephemeral state survives between
    /// the three steps (the caller's `Transport` must have been
    /// constructed with `stateful = true` for that to hold).
    pub async fn rename(&self, old: &ObjectRef, new_name: &str, description: &str, responsible: &str) -> CoreResult<ActivationOutcome> {
        let source = self.ops.read_source(old, SourceSection::Main).await?;
        self.ops
            .create_object(old.kind, new_name, description, old.parent.as_deref(), responsible)
            .await?;
        let new_obj = ObjectRef { kind: old.kind, name: new_name.to_string(), parent: old.parent.clone() };
        let outcome = self.write_source(&new_obj, SourceSection::Main, &source).await?;

        let lock = self.ops.lock(old).await?;
        let delete_result = self.ops.delete(old, &lock.handle).await;
        if let Err(unlock_err) = self.ops.unlock(old, &lock.handle).await {
            warn!(object = %old.uri(), error = %unlock_err, "failed to release lock after rename-delete");
        }
        delete_result?;

        Ok(outcome)
    }

    /// Token-efficient primary edit path: read source, perform a bounded
    /// substitution, run `write_source`. A no-op (no lock acquired) when
    /// the pattern does not match.
    pub async fn edit_source(
        &self,
        obj: &ObjectRef,
        section: SourceSection,
        pattern: &str,
        replacement: &str,
        max_replacements: Option<usize>,
    ) -> CoreResult<ActivationOutcome> {
        let regex = Regex::new(pattern).map_err(|e| CoreError::Validation(format!("invalid regex: {e}")))?;
        let source = self.ops.read_source(obj, section).await?;

        if !regex.is_match(&source) {
            return Err(CoreError::Validation("pattern did not match; no changes made".to_string()));
        }

        let new_source = match max_replacements {
            Some(limit) => regex.replacen(&source, limit, replacement).into_owned(),
            None => regex.replace_all(&source, replacement).into_owned(),
        };

        self.write_source(obj, section, &new_source).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use adt_transport::HttpMethod;

    use super::*;
    use crate::testutil::MockTransport;

    fn program() -> ObjectRef {
        ObjectRef::new(ObjectKind::Program, "ZMCP_00001")
    }

    #[tokio::test]
    async fn edit_source_is_a_no_op_when_the_pattern_does_not_match() {
        let mock = Arc::new(
            MockTransport::new().on(HttpMethod::Get, "/sap/bc/adt/programs/programs/zmcp_00001/source/main", 200, "REPORT zfoo."),
        );
        let ops = Arc::new(AtomicOps::new(mock.clone()));
        let workflow = WorkflowComposer::new(ops);

        let result = workflow.edit_source(&program(), SourceSection::Main, "NOT_PRESENT_XYZ", "x", None).await;

        assert!(result.is_err());
        assert_eq!(mock.call_count(), 1, "no lock should be acquired when the pattern never matches");
    }

    #[tokio::test]
    async fn write_source_locks_updates_unlocks_then_activates() {
        let mock = Arc::new(
            MockTransport::new()
                .on(HttpMethod::Post, "/sap/bc/adt/programs/programs/zmcp_00001", 200, r#"<lockResult LOCK_HANDLE="h1" IS_LOCAL="true"/>"#)
                .on(HttpMethod::Put, "/sap/bc/adt/programs/programs/zmcp_00001/source/main", 200, "")
                .on(HttpMethod::Post, "/sap/bc/adt/activation", 200, "<checkMessageList/>"),
        );
        let ops = Arc::new(AtomicOps::new(mock.clone()));
        let workflow = WorkflowComposer::new(ops);

        let outcome = workflow
            .write_source(&program(), SourceSection::Main, "REPORT zfoo. WRITE 'Hello from MCP!'.")
            .await
            .unwrap();

        assert!(!outcome.has_errors());
        assert!(!workflow.locks.is_held(&program().uri()).await, "the lock must not outlive the workflow");
    }
}
