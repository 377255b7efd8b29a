//! Per-kind reconcilers.
//!
//! Each reconciler enumerates the observed state once, then walks its
//! document in order. Failures are recorded per item on the returned
//! [`ReconcileResult`](crate::ReconcileResult) and never stop later items.

mod bookmarks;
mod channels;
mod usergroups;

pub use bookmarks::reconcile_bookmarks;
pub use channels::reconcile_channels;
pub use usergroups::{reconcile_usergroups, resolve_members};

/// What a successful per-item sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    Created,
    Updated,
}
