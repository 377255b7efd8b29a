//! Channel reconciliation.

use super::Applied;
use crate::common::{ChannelSpec, ChannelsFile, NewChannel};
use crate::directory::{channel_ids_by_name, WorkspaceDirectory};
use crate::error::DirectoryResult;
use crate::report::ReconcileResult;
use std::collections::HashMap;

/// Converges channels to `config`, then archives the names in its archive list.
///
/// Topic and purpose are written whenever present; current values are not
/// compared. Archive names that do not exist are skipped without a call.
pub async fn reconcile_channels<D>(directory: &D, config: &ChannelsFile) -> ReconcileResult
where
    D: WorkspaceDirectory + ?Sized,
{
    let mut result = ReconcileResult::new();

    let existing = match channel_ids_by_name(directory).await {
        Ok(map) => map,
        Err(e) => {
            result.push_error(format!("Failed to list channels: {e}"));
            return result;
        }
    };
    tracing::debug!(count = existing.len(), "observed channels");

    for spec in &config.channels {
        match sync_channel(directory, spec, &existing).await {
            Ok(Applied::Created) => {
                tracing::info!("Created channel: #{}", spec.name);
                result.created.push(spec.name.clone());
            }
            Ok(Applied::Updated) => {
                tracing::info!("Updated channel: #{}", spec.name);
                result.updated.push(spec.name.clone());
            }
            Err(e) => result.push_error(format!("Failed to sync channel {}: {e}", spec.name)),
        }
    }

    for name in &config.archive {
        let Some(id) = existing.get(name) else {
            tracing::debug!(channel = %name, "archive target not present");
            continue;
        };
        match directory.archive_channel(id).await {
            Ok(()) => {
                tracing::info!("Archived channel: #{name}");
                result.archived.push(name.clone());
            }
            Err(e) => result.push_error(format!("Failed to archive channel {name}: {e}")),
        }
    }

    result
}

async fn sync_channel<D>(
    directory: &D,
    spec: &ChannelSpec,
    existing: &HashMap<String, String>,
) -> DirectoryResult<Applied>
where
    D: WorkspaceDirectory + ?Sized,
{
    let (id, applied) = match existing.get(&spec.name) {
        Some(id) => (id.clone(), Applied::Updated),
        None => {
            let new = NewChannel {
                name: spec.name.clone(),
                is_private: spec.is_private.unwrap_or(false),
            };
            (directory.create_channel(&new).await?, Applied::Created)
        }
    };

    if let Some(topic) = &spec.topic {
        directory.set_topic(&id, topic).await?;
    }
    if let Some(purpose) = &spec.purpose {
        directory.set_purpose(&id, purpose).await?;
    }
    Ok(applied)
}
