//! Conflict resolution policy.
//!
//! [`apply_protected`] is the single path by which any protected field is
//! written, from all of: sync-service propagation, the chat targeting
//! resolver, and topology-reconciler defaulting. Entries describe a patch as
//! a list of [`FieldWrite`]s, each naming its field and optional protection
//! family; the policy decides per field and records the outcome.
//!
//! Rules:
//! - `Direct` writes apply every field and set the companion protection flag
//!   for each protected family touched.
//! - `Auto` writes skip any field whose family flag is already set, apply the
//!   rest, and never set a flag.
//!
//! Flags are monotonic. The only way back from protected is the store's
//! explicit user-initiated un-protect operation.

use serde::{Deserialize, Serialize};

use crate::domain::models::protection::{FieldFamily, ProtectionFlags};

/// Who is writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOrigin {
    /// A deliberate user edit: widget interaction or city-targeted chat
    /// instruction.
    Direct,
    /// Automated propagation from another surface.
    Auto,
}

impl std::fmt::Display for WriteOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// A single pending field assignment produced from a patch.
pub struct FieldWrite<E: ?Sized> {
    /// Field name, used in outcomes and `sync:blocked` reasons.
    pub name: &'static str,
    /// Protection family the field belongs to; `None` for unprotected
    /// fields (notes, lodging type, ...).
    pub family: Option<FieldFamily>,
    /// Assignment to perform when the policy permits it.
    pub apply: Box<dyn FnOnce(&mut E)>,
}

impl<E: ?Sized> FieldWrite<E> {
    pub fn unprotected(
        name: &'static str,
        apply: impl FnOnce(&mut E) + 'static,
    ) -> Self {
        Self {
            name,
            family: None,
            apply: Box::new(apply),
        }
    }

    pub fn protected(
        name: &'static str,
        family: FieldFamily,
        apply: impl FnOnce(&mut E) + 'static,
    ) -> Self {
        Self {
            name,
            family: Some(family),
            apply: Box::new(apply),
        }
    }
}

/// An entry whose patch can be routed through the policy.
pub trait Patchable {
    type Patch;

    fn protection(&self) -> &ProtectionFlags;

    fn protection_mut(&mut self) -> &mut ProtectionFlags;

    /// Decompose a patch into per-field writes.
    fn field_writes(patch: Self::Patch) -> Vec<FieldWrite<Self>>;
}

/// Per-field result of one policy application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    /// Fields that were written.
    #[serde(skip_deserializing)]
    pub applied: Vec<&'static str>,
    /// Fields rejected because their family is user-protected.
    #[serde(skip_deserializing)]
    pub skipped: Vec<&'static str>,
}

impl ApplyOutcome {
    /// Whether anything was written.
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Human-readable reason string for `sync:blocked` events.
    pub fn skip_reason(&self) -> String {
        format!("user-modified fields: {}", self.skipped.join(", "))
    }
}

/// Apply `patch` to `entry` under the protection rules for `origin`.
///
/// All fields of a patch are applied within this single call, so observers
/// see one consistent transition rather than a sequence of partial states.
pub fn apply_protected<E: Patchable>(
    entry: &mut E,
    patch: E::Patch,
    origin: WriteOrigin,
) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    for write in E::field_writes(patch) {
        let protected = write
            .family
            .is_some_and(|family| entry.protection().is_protected(family));

        match origin {
            WriteOrigin::Auto if protected => {
                outcome.skipped.push(write.name);
            }
            WriteOrigin::Auto => {
                (write.apply)(entry);
                outcome.applied.push(write.name);
            }
            WriteOrigin::Direct => {
                (write.apply)(entry);
                if let Some(family) = write.family {
                    entry.protection_mut().protect(family);
                }
                outcome.applied.push(write.name);
            }
        }
    }

    outcome
}
