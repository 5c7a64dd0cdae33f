//! Scalar property reconcilers.
//!
//! Each reconciler compares one desired property with the working observed
//! state, calls that property's endpoint when they differ, and writes the
//! desired value into the working state once the call succeeded. A failed
//! call leaves the working state untouched for that property.

use std::fmt;

use crate::api::{
    self, HardwareRequest, SleepTimeRequest, SpaceRuntime, StorageRequest, VisibilityRequest,
};
use crate::client::{SpaceAction, SpaceClient, ensure_success};
use crate::error::{Operation, Result};
use crate::model::{DesiredConfig, ObservedState, SpaceId};
use crate::transport::Transport;

/// A scalar property of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Visibility,
    Hardware,
    Storage,
    SleepTime,
}

impl Field {
    pub fn is_drifted(self, desired: &DesiredConfig, observed: &ObservedState) -> bool {
        match self {
            Self::Name => observed.name != desired.name,
            Self::Visibility => observed.private != desired.private,
            Self::Hardware => observed.hardware.as_deref() != Some(desired.hardware.as_str()),
            Self::Storage => observed.storage.as_deref() != Some(desired.storage.as_str()),
            Self::SleepTime => observed.sleep_time != Some(desired.sleep_time),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Visibility => write!(f, "private"),
            Self::Hardware => write!(f, "hardware"),
            Self::Storage => write!(f, "storage"),
            Self::SleepTime => write!(f, "sleep_time"),
        }
    }
}

/// Renames the space when the name drifted.
///
/// The new identifier keeps the namespace of the current one. On success the
/// working state carries the new identifier, so every later step in the pass
/// addresses the renamed space.
pub async fn reconcile_name<T: Transport>(
    client: &SpaceClient<T>,
    desired: &DesiredConfig,
    state: &mut ObservedState,
) -> Result<()> {
    if !Field::Name.is_drifted(desired, state) {
        return Ok(());
    }

    let from: SpaceId = state.id.parse()?;
    let to = from.renamed(&desired.name);
    let to_id = to.to_string();

    let response = client.move_repo(&state.id, &to_id).await?;
    ensure_success(Operation::RenameSpace, response)?;

    tracing::info!(from = %state.id, to = %to_id, "renamed space");
    state.id = to_id;
    state.name = desired.name.clone();
    Ok(())
}

pub async fn reconcile_visibility<T: Transport>(
    client: &SpaceClient<T>,
    desired: &DesiredConfig,
    state: &mut ObservedState,
) -> Result<()> {
    if !Field::Visibility.is_drifted(desired, state) {
        return Ok(());
    }

    let response = client
        .put_settings(
            &state.id,
            &VisibilityRequest {
                private: desired.private,
            },
        )
        .await?;
    ensure_success(Operation::UpdateVisibility, response)?;

    tracing::info!(id = %state.id, private = desired.private, "updated visibility");
    state.private = desired.private;
    Ok(())
}

pub async fn reconcile_hardware<T: Transport>(
    client: &SpaceClient<T>,
    desired: &DesiredConfig,
    state: &mut ObservedState,
) -> Result<()> {
    if !Field::Hardware.is_drifted(desired, state) {
        return Ok(());
    }

    let payload = HardwareRequest {
        flavor: &desired.hardware,
    };
    apply_action(client, &state.id, SpaceAction::Hardware, &payload).await?;

    tracing::info!(id = %state.id, flavor = %desired.hardware, "updated hardware");
    state.hardware = Some(desired.hardware.clone());
    Ok(())
}

pub async fn reconcile_storage<T: Transport>(
    client: &SpaceClient<T>,
    desired: &DesiredConfig,
    state: &mut ObservedState,
) -> Result<()> {
    if !Field::Storage.is_drifted(desired, state) {
        return Ok(());
    }

    let payload = StorageRequest {
        tier: &desired.storage,
    };
    apply_action(client, &state.id, SpaceAction::Storage, &payload).await?;

    tracing::info!(id = %state.id, tier = %desired.storage, "updated storage");
    state.storage = Some(desired.storage.clone());
    Ok(())
}

pub async fn reconcile_sleep_time<T: Transport>(
    client: &SpaceClient<T>,
    desired: &DesiredConfig,
    state: &mut ObservedState,
) -> Result<()> {
    if !Field::SleepTime.is_drifted(desired, state) {
        return Ok(());
    }

    let payload = SleepTimeRequest {
        seconds: desired.sleep_time,
    };
    apply_action(client, &state.id, SpaceAction::SleepTime, &payload).await?;

    tracing::info!(id = %state.id, seconds = desired.sleep_time, "updated sleep time");
    state.sleep_time = Some(desired.sleep_time);
    Ok(())
}

/// Posts a runtime action and validates the runtime document it returns.
async fn apply_action<T, B>(
    client: &SpaceClient<T>,
    id: &str,
    action: SpaceAction,
    payload: &B,
) -> Result<SpaceRuntime>
where
    T: Transport,
    B: serde::Serialize,
{
    let operation = action.operation();
    let response = client.post_action(id, action, payload).await?;
    let response = ensure_success(operation, response)?;
    api::decode(operation, &response)
}
