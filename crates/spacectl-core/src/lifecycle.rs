//! Lifecycle controller: create, read, update and delete a space.
//!
//! Every operation takes explicit state and returns a new value; nothing is
//! cached between calls. Remote calls are issued strictly one at a time and
//! a failing call ends the operation.
//!
//! # Example
//!
//! ```ignore
//! use spacectl_core::{ClientConfig, HttpTransport, SpaceController};
//!
//! let transport = HttpTransport::new(ClientConfig::new().with_token(token))?;
//! let controller = SpaceController::new(transport);
//!
//! let state = controller.create(&desired).await?;
//! let state = controller.update(&desired, &state).await?;
//! controller.delete(&state).await?;
//! ```

use std::fmt;

use crate::api::{self, CreateSpaceRequest, CreatedSpace, REPO_TYPE, SpaceInfo};
use crate::client::{SpaceClient, ensure_success};
use crate::collection::{add_entries, reconcile_entries};
use crate::error::{Operation, Result, SpaceError, UpdateError};
use crate::fields::{self, Field};
use crate::model::{CollectionKind, DesiredConfig, ObservedState, SpaceId};
use crate::transport::Transport;

/// Scalar fields in reconciliation order, split around the collections.
const FIELDS_BEFORE_COLLECTIONS: [Field; 2] = [Field::Name, Field::Visibility];
const COLLECTIONS: [CollectionKind; 2] = [CollectionKind::Secrets, CollectionKind::Variables];
const FIELDS_AFTER_COLLECTIONS: [Field; 3] = [Field::Hardware, Field::Storage, Field::SleepTime];

/// One step an update would perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Field(Field),
    /// Replace-all of a managed collection whose desired entries differ
    /// from the last applied ones.
    Collection(CollectionKind),
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => write!(f, "{field}"),
            Self::Collection(kind) => write!(f, "{kind}"),
        }
    }
}

pub struct SpaceController<T> {
    client: SpaceClient<T>,
}

impl<T: Transport> SpaceController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            client: SpaceClient::new(transport),
        }
    }

    pub fn client(&self) -> &SpaceClient<T> {
        &self.client
    }

    /// Creates the space and seeds its secrets and variables.
    ///
    /// # Errors
    ///
    /// Fails on the first unsuccessful call. If seeding fails the space
    /// already exists remotely; the error is returned and no state is
    /// produced.
    pub async fn create(&self, desired: &DesiredConfig) -> Result<ObservedState> {
        let payload = CreateSpaceRequest {
            repo_type: REPO_TYPE,
            name: &desired.name,
            private: desired.private,
            sdk: &desired.sdk,
            template: desired.template.as_deref(),
            hardware: &desired.hardware,
            storage: &desired.storage,
            sleep_time: desired.sleep_time,
        };
        let response = self.client.create(&payload).await?;
        let response = ensure_success(Operation::CreateSpace, response)?;
        let created: CreatedSpace = api::decode(Operation::CreateSpace, &response)?;
        let id = created
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| SpaceError::response_shape(Operation::CreateSpace, "name"))?;
        tracing::info!(%id, "created space");

        let mut state = ObservedState {
            id,
            name: desired.name.clone(),
            private: desired.private,
            sdk: Some(desired.sdk.clone()),
            hardware: Some(desired.hardware.clone()),
            storage: Some(desired.storage.clone()),
            sleep_time: Some(desired.sleep_time),
            ..ObservedState::default()
        };

        for kind in COLLECTIONS {
            let Some(entries) = desired.entries(kind) else {
                continue;
            };
            if let Err(e) = add_entries(&self.client, &state.id, kind, entries).await {
                tracing::warn!(
                    id = %state.id,
                    error = %e,
                    "space created but seeding {kind} failed"
                );
                return Err(e);
            }
            state.set_entries(kind, entries.clone());
        }

        Ok(state)
    }

    /// Reads the remote space and returns a fully refreshed state.
    ///
    /// Secrets and variables are not reported by the API and come back
    /// `None`; use [`refresh`](Self::refresh) to keep them.
    ///
    /// # Errors
    ///
    /// A non-success status is an `Api` error; callers check
    /// [`SpaceError::is_not_found`] to detect a deleted space.
    pub async fn read(&self, id: &str) -> Result<ObservedState> {
        let response = self.client.get(id).await?;
        let response = ensure_success(Operation::ReadSpace, response)?;
        let info: SpaceInfo = api::decode(Operation::ReadSpace, &response)?;
        Ok(observed_from_info(id, info))
    }

    /// Reads the space behind `observed` and keeps its known collections.
    pub async fn refresh(&self, observed: &ObservedState) -> Result<ObservedState> {
        let fresh = self.read(&observed.id).await?;
        Ok(fresh.with_entries_from(observed))
    }

    /// Changes an update would make, in execution order. Issues no calls.
    pub fn plan(&self, desired: &DesiredConfig, observed: &ObservedState) -> Vec<Change> {
        plan(desired, observed)
    }

    /// Converges the space to `desired`.
    ///
    /// Order: rename, visibility, secrets, variables, hardware, storage,
    /// sleep time. Calling with `desired` matching `observed` and unmanaged
    /// collections issues no calls.
    ///
    /// # Errors
    ///
    /// Stops at the first failure. The returned [`UpdateError`] holds the
    /// state reached so far; steps after the failing one never ran.
    pub async fn update(
        &self,
        desired: &DesiredConfig,
        observed: &ObservedState,
    ) -> std::result::Result<ObservedState, UpdateError> {
        let mut state = observed.clone();
        match self.converge(desired, &mut state).await {
            Ok(()) => Ok(state),
            Err(error) => {
                tracing::warn!(id = %state.id, %error, "update stopped");
                Err(UpdateError::new(state, error))
            }
        }
    }

    async fn converge(&self, desired: &DesiredConfig, state: &mut ObservedState) -> Result<()> {
        for field in FIELDS_BEFORE_COLLECTIONS {
            self.reconcile_field(field, desired, state).await?;
        }
        for kind in COLLECTIONS {
            if !is_collection_drifted(kind, desired, state) {
                continue;
            }
            if let Some(entries) =
                reconcile_entries(&self.client, &state.id, kind, desired.entries(kind)).await?
            {
                state.set_entries(kind, entries);
            }
        }
        for field in FIELDS_AFTER_COLLECTIONS {
            self.reconcile_field(field, desired, state).await?;
        }
        Ok(())
    }

    async fn reconcile_field(
        &self,
        field: Field,
        desired: &DesiredConfig,
        state: &mut ObservedState,
    ) -> Result<()> {
        match field {
            Field::Name => fields::reconcile_name(&self.client, desired, state).await,
            Field::Visibility => fields::reconcile_visibility(&self.client, desired, state).await,
            Field::Hardware => fields::reconcile_hardware(&self.client, desired, state).await,
            Field::Storage => fields::reconcile_storage(&self.client, desired, state).await,
            Field::SleepTime => fields::reconcile_sleep_time(&self.client, desired, state).await,
        }
    }

    /// Deletes the space. Success means it no longer exists remotely.
    ///
    /// An imported state that was never read has no `name`; the name is
    /// then taken from the identifier.
    pub async fn delete(&self, observed: &ObservedState) -> Result<()> {
        let name = if observed.name.is_empty() {
            observed.id.parse::<SpaceId>()?.name().to_string()
        } else {
            observed.name.clone()
        };
        let response = self.client.delete_repo(&name).await?;
        ensure_success(Operation::DeleteSpace, response)?;
        tracing::info!(id = %observed.id, "deleted space");
        Ok(())
    }

    /// Starts tracking an existing space by identifier. Only `id` is set;
    /// a read fills in the rest.
    pub fn import(&self, id: &str) -> Result<ObservedState> {
        id.parse::<SpaceId>()?;
        Ok(ObservedState::imported(id))
    }
}

/// Changes an update would make, in execution order.
pub fn plan(desired: &DesiredConfig, observed: &ObservedState) -> Vec<Change> {
    let fields_before = FIELDS_BEFORE_COLLECTIONS
        .into_iter()
        .filter(|f| f.is_drifted(desired, observed))
        .map(Change::Field);
    let collections = COLLECTIONS
        .into_iter()
        .filter(|kind| is_collection_drifted(*kind, desired, observed))
        .map(Change::Collection);
    let fields_after = FIELDS_AFTER_COLLECTIONS
        .into_iter()
        .filter(|f| f.is_drifted(desired, observed))
        .map(Change::Field);
    fields_before.chain(collections).chain(fields_after).collect()
}

/// A managed collection drifts when its desired entries differ from the
/// last applied ones. Remote values are write-only, so this is the only
/// comparison available.
fn is_collection_drifted(
    kind: CollectionKind,
    desired: &DesiredConfig,
    observed: &ObservedState,
) -> bool {
    desired
        .entries(kind)
        .is_some_and(|entries| observed.entries(kind) != Some(entries))
}

fn observed_from_info(id: &str, info: SpaceInfo) -> ObservedState {
    let id = info.id.unwrap_or_else(|| id.to_string());
    let name = id.rsplit('/').next().unwrap_or(&id).to_string();
    let runtime = info.runtime.unwrap_or_default();

    ObservedState {
        name,
        private: info.private,
        sdk: info.sdk,
        hardware: runtime
            .hardware
            .as_ref()
            .and_then(|h| h.effective())
            .map(str::to_string),
        storage: runtime
            .storage
            .as_ref()
            .and_then(|s| s.effective())
            .map(str::to_string),
        sleep_time: runtime.gc_timeout,
        secrets: None,
        variables: None,
        author: info.author,
        last_modified: info.last_modified,
        likes: info.likes,
        tags: info.tags,
        id,
    }
}
