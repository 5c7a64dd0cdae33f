//! Replace-all reconciliation of key/value sub-collections.
//!
//! The API can list a collection, add one entry and delete one entry by key.
//! There is no patch primitive, so a managed collection is converged by
//! deleting every listed key and then adding every desired entry. The result
//! is never re-fetched: secret values are write-only remotely.

use crate::api::{self, EntryListing};
use crate::client::{SpaceClient, ensure_success};
use crate::error::{Operation, Result};
use crate::model::{CollectionKind, Entries};
use crate::transport::Transport;

/// Converges the remote `kind` collection of `id` to `desired`.
///
/// Returns `Ok(None)` without touching the remote side when `desired` is
/// `None`; otherwise returns the desired map, which is now the remote state.
/// Stops at the first failing call.
pub async fn reconcile_entries<T: Transport>(
    client: &SpaceClient<T>,
    id: &str,
    kind: CollectionKind,
    desired: Option<&Entries>,
) -> Result<Option<Entries>> {
    let Some(desired) = desired else {
        tracing::debug!(%id, %kind, "collection unmanaged, skipping");
        return Ok(None);
    };

    for key in list_keys(client, id, kind).await? {
        let response = client.delete_entry(kind, id, &key).await?;
        ensure_success(Operation::DeleteEntry(kind), response)?;
        tracing::debug!(%id, %kind, %key, "deleted entry");
    }

    add_entries(client, id, kind, desired).await?;
    tracing::info!(%id, %kind, count = desired.len(), "replaced collection");
    Ok(Some(desired.clone()))
}

/// Adds every entry of `entries` without clearing the collection first.
pub async fn add_entries<T: Transport>(
    client: &SpaceClient<T>,
    id: &str,
    kind: CollectionKind,
    entries: &Entries,
) -> Result<()> {
    for (key, value) in entries {
        let response = client.add_entry(kind, id, key, value).await?;
        ensure_success(Operation::AddEntry(kind), response)?;
        tracing::debug!(%id, %kind, %key, "added entry");
    }
    Ok(())
}

/// Keys currently present remotely. A non-success listing counts as empty.
async fn list_keys<T: Transport>(
    client: &SpaceClient<T>,
    id: &str,
    kind: CollectionKind,
) -> Result<Vec<String>> {
    let operation = Operation::ListEntries(kind);
    let response = client.list_entries(kind, id).await?;
    if !response.is_success() {
        tracing::warn!(
            %id,
            %kind,
            status = response.status,
            "listing failed, skipping deletion of existing entries"
        );
        return Ok(Vec::new());
    }
    let listing: EntryListing = api::decode(operation, &response)?;
    Ok(listing.into_keys())
}
