//! Reconcile reporting types for tracking what was created, updated,
//! archived, and what failed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the reconciled resource categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Channels,
    UserGroups,
    Bookmarks,
}

impl ResourceKind {
    /// Processing order.
    pub const ALL: [ResourceKind; 3] = [Self::Channels, Self::UserGroups, Self::Bookmarks];

    /// Key used in summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Channels => "channels",
            Self::UserGroups => "usergroups",
            Self::Bookmarks => "bookmarks",
        }
    }

    /// Section heading printed before the kind is reconciled.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Channels => "Channels",
            Self::UserGroups => "User Groups",
            Self::Bookmarks => "Bookmarks",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of reconciling one resource kind.
///
/// Entries accumulate as work happens; nothing is removed when a later item
/// fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    /// Archived channels, or disabled user groups
    pub archived: Vec<String>,
    pub errors: Vec<String>,
}

impl ReconcileResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure and logs it immediately.
    pub fn push_error(&mut self, message: String) {
        tracing::error!("{message}");
        self.errors.push(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn counts(&self) -> ResourceCounts {
        ResourceCounts {
            created: self.created.len(),
            updated: self.updated.len(),
            archived: self.archived.len(),
            errors: self.errors.len(),
        }
    }
}

/// Entry counts of a [`ReconcileResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounts {
    pub created: usize,
    pub updated: usize,
    pub archived: usize,
    pub errors: usize,
}

/// Results of a sync run, one entry per resource kind that was reconciled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Whether reconcilers were skipped for a dry run
    pub dry_run: bool,
    /// In processing order
    pub results: Vec<(ResourceKind, ReconcileResult)>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            results: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: ResourceKind, result: ReconcileResult) {
        self.results.push((kind, result));
    }

    /// Result for one kind, if it ran.
    pub fn get(&self, kind: ResourceKind) -> Option<&ReconcileResult> {
        self.results
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, result)| result)
    }

    /// Errors recorded across all kinds.
    pub fn total_errors(&self) -> usize {
        self.results.iter().map(|(_, r)| r.errors.len()).sum()
    }

    pub fn success(&self) -> bool {
        self.total_errors() == 0
    }

    /// Generates the end-of-run summary for display.
    pub fn format_summary(&self) -> String {
        let mut out = String::from("=== Sync Summary ===\n");
        for (kind, result) in &self.results {
            let counts = result.counts();
            out.push_str(&format!("{}:\n", kind));
            out.push_str(&format!("  Created: {}\n", counts.created));
            out.push_str(&format!("  Updated: {}\n", counts.updated));
            out.push_str(&format!("  Archived: {}\n", counts.archived));
            if counts.errors > 0 {
                out.push_str(&format!("  Errors: {}\n", counts.errors));
            }
        }
        let total = self.total_errors();
        if total > 0 {
            out.push_str(&format!("\nCompleted with {} error(s)\n", total));
        } else {
            out.push_str("\nSync completed successfully!\n");
        }
        out
    }
}
