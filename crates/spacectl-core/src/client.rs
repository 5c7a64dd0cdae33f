//! Typed endpoint calls on top of a [`Transport`].
//!
//! Each method builds the path and body for one endpoint and returns the raw
//! response. Status codes are left to the caller; transport failures are
//! attributed to the operation.

use serde::Serialize;

use crate::api::{
    self, CreateSpaceRequest, DeleteSpaceRequest, EntryKeyRequest, EntryRequest, MoveRequest,
    REPO_TYPE,
};
use crate::error::{Operation, Result, SpaceError};
use crate::model::CollectionKind;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Post-actions under `/spaces/{id}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceAction {
    Hardware,
    Storage,
    SleepTime,
}

impl SpaceAction {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Storage => "storage",
            Self::SleepTime => "sleeptime",
        }
    }

    pub fn operation(self) -> Operation {
        match self {
            Self::Hardware => Operation::UpdateHardware,
            Self::Storage => Operation::UpdateStorage,
            Self::SleepTime => Operation::UpdateSleepTime,
        }
    }
}

pub struct SpaceClient<T> {
    transport: T,
}

impl<T: Transport> SpaceClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send(&self, operation: Operation, request: ApiRequest) -> Result<ApiResponse> {
        tracing::debug!(
            %operation,
            method = %request.method,
            path = %request.path,
            "sending request"
        );
        self.transport
            .send(request)
            .await
            .map_err(|e| SpaceError::transport(operation, e))
    }

    async fn send_json<B: Serialize>(
        &self,
        operation: Operation,
        request: ApiRequest,
        body: &B,
    ) -> Result<ApiResponse> {
        let body = api::to_body(operation, body)?;
        self.send(operation, request.with_body(body)).await
    }

    /// `POST /repos/create`
    pub async fn create(&self, payload: &CreateSpaceRequest<'_>) -> Result<ApiResponse> {
        self.send_json(Operation::CreateSpace, ApiRequest::post("/repos/create"), payload)
            .await
    }

    /// `GET /spaces/{id}`
    pub async fn get(&self, id: &str) -> Result<ApiResponse> {
        self.send(Operation::ReadSpace, ApiRequest::get(format!("/spaces/{id}")))
            .await
    }

    /// `PUT /spaces/{id}/settings`
    pub async fn put_settings<B: Serialize>(&self, id: &str, payload: &B) -> Result<ApiResponse> {
        self.send_json(
            Operation::UpdateVisibility,
            ApiRequest::put(format!("/spaces/{id}/settings")),
            payload,
        )
        .await
    }

    /// `POST /spaces/{id}/{hardware|storage|sleeptime}`
    pub async fn post_action<B: Serialize>(
        &self,
        id: &str,
        action: SpaceAction,
        payload: &B,
    ) -> Result<ApiResponse> {
        self.send_json(
            action.operation(),
            ApiRequest::post(format!("/spaces/{id}/{}", action.path_segment())),
            payload,
        )
        .await
    }

    /// `GET /spaces/{id}/{secrets|variables}`
    pub async fn list_entries(&self, kind: CollectionKind, id: &str) -> Result<ApiResponse> {
        self.send(
            Operation::ListEntries(kind),
            ApiRequest::get(collection_path(kind, id)),
        )
        .await
    }

    /// `POST /spaces/{id}/{secrets|variables}`
    pub async fn add_entry(
        &self,
        kind: CollectionKind,
        id: &str,
        key: &str,
        value: &str,
    ) -> Result<ApiResponse> {
        self.send_json(
            Operation::AddEntry(kind),
            ApiRequest::post(collection_path(kind, id)),
            &EntryRequest { key, value },
        )
        .await
    }

    /// `DELETE /spaces/{id}/{secrets|variables}`
    pub async fn delete_entry(
        &self,
        kind: CollectionKind,
        id: &str,
        key: &str,
    ) -> Result<ApiResponse> {
        self.send_json(
            Operation::DeleteEntry(kind),
            ApiRequest::delete(collection_path(kind, id)),
            &EntryKeyRequest { key },
        )
        .await
    }

    /// `POST /repos/move`
    pub async fn move_repo(&self, from: &str, to: &str) -> Result<ApiResponse> {
        self.send_json(
            Operation::RenameSpace,
            ApiRequest::post("/repos/move"),
            &MoveRequest {
                from_repo: from,
                to_repo: to,
                repo_type: REPO_TYPE,
            },
        )
        .await
    }

    /// `DELETE /repos/delete`
    pub async fn delete_repo(&self, name: &str) -> Result<ApiResponse> {
        self.send_json(
            Operation::DeleteSpace,
            ApiRequest::delete("/repos/delete"),
            &DeleteSpaceRequest {
                repo_type: REPO_TYPE,
                name,
            },
        )
        .await
    }
}

fn collection_path(kind: CollectionKind, id: &str) -> String {
    format!("/spaces/{id}/{}", kind.as_str())
}

/// Turns a non-success status into an `Api` error.
pub fn ensure_success(operation: Operation, response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(SpaceError::api(operation, response.status, response.text()))
    }
}
