//! User group reconciliation.

use super::Applied;
use crate::common::{MemberRef, UserGroupFields, UserGroupSpec, UserGroupsFile};
use crate::directory::WorkspaceDirectory;
use crate::error::DirectoryResult;
use crate::report::ReconcileResult;
use std::collections::HashMap;

/// Converges user groups to `config`, then disables the handles in its
/// disable list.
///
/// Existing groups are updated, given the resolved membership when it is
/// non-empty, and re-enabled. Disabled groups count as existing. Disabled
/// handles are reported under `archived`.
pub async fn reconcile_usergroups<D>(directory: &D, config: &UserGroupsFile) -> ReconcileResult
where
    D: WorkspaceDirectory + ?Sized,
{
    let mut result = ReconcileResult::new();

    let existing: HashMap<String, String> = match directory.list_usergroups(true, false).await {
        Ok(groups) => groups.into_iter().map(|g| (g.handle, g.id)).collect(),
        Err(e) => {
            result.push_error(format!("Failed to list user groups: {e}"));
            return result;
        }
    };
    tracing::debug!(count = existing.len(), "observed user groups");

    for spec in &config.usergroups {
        match sync_usergroup(directory, spec, &existing).await {
            Ok(Applied::Created) => {
                tracing::info!("Created user group: @{}", spec.handle);
                result.created.push(spec.handle.clone());
            }
            Ok(Applied::Updated) => {
                tracing::info!("Updated user group: @{}", spec.handle);
                result.updated.push(spec.handle.clone());
            }
            Err(e) => {
                result.push_error(format!("Failed to sync user group {}: {e}", spec.handle))
            }
        }
    }

    for handle in &config.disable {
        let Some(id) = existing.get(handle) else {
            tracing::debug!(handle = %handle, "disable target not present");
            continue;
        };
        match directory.disable_usergroup(id).await {
            Ok(()) => {
                tracing::info!("Disabled user group: @{handle}");
                result.archived.push(handle.clone());
            }
            Err(e) => result.push_error(format!("Failed to disable user group {handle}: {e}")),
        }
    }

    result
}

async fn sync_usergroup<D>(
    directory: &D,
    spec: &UserGroupSpec,
    existing: &HashMap<String, String>,
) -> DirectoryResult<Applied>
where
    D: WorkspaceDirectory + ?Sized,
{
    let members = match &spec.members {
        Some(tokens) => resolve_members(directory, tokens).await,
        None => Vec::new(),
    };
    let fields = UserGroupFields::from(spec);

    match existing.get(&spec.handle) {
        Some(id) => {
            directory.update_usergroup(id, &fields).await?;
            if !members.is_empty() {
                directory.set_usergroup_members(id, &members).await?;
            }
            directory.enable_usergroup(id).await?;
            Ok(Applied::Updated)
        }
        None => {
            let id = directory.create_usergroup(&fields).await?;
            if !members.is_empty() {
                directory.set_usergroup_members(&id, &members).await?;
            }
            Ok(Applied::Created)
        }
    }
}

/// Turns configured member tokens into user ids.
///
/// User ids pass through, emails are looked up one at a time. Emails that
/// fail to resolve are dropped with a warning; tokens of neither shape are
/// dropped quietly.
pub async fn resolve_members<D>(directory: &D, tokens: &[String]) -> Vec<String>
where
    D: WorkspaceDirectory + ?Sized,
{
    let mut ids = Vec::with_capacity(tokens.len());
    for token in tokens {
        match MemberRef::classify(token) {
            Some(MemberRef::UserId(id)) => ids.push(id.to_string()),
            Some(MemberRef::Email(email)) => match directory.lookup_user_by_email(email).await {
                Ok(id) => ids.push(id),
                Err(e) => tracing::warn!("Could not find user with email: {email} ({e})"),
            },
            None => tracing::debug!("Ignoring member that is neither a user id nor an email: {token}"),
        }
    }
    ids
}
