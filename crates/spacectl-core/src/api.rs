//! Request and response bodies of the remote API.
//!
//! Request bodies are serialized with serde, never formatted by hand. Response
//! bodies are decoded into structs whose fields are all optional; required
//! fields are checked by the caller so a missing field becomes a
//! `ResponseShape` error instead of a decode failure.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Operation, SpaceError};
use crate::transport::ApiResponse;

/// Repository type sent to the `/repos/*` endpoints.
pub const REPO_TYPE: &str = "space";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceRequest<'a> {
    #[serde(rename = "type")]
    pub repo_type: &'static str,
    pub name: &'a str,
    pub private: bool,
    pub sdk: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<&'a str>,
    pub hardware: &'a str,
    pub storage: &'a str,
    pub sleep_time: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest<'a> {
    pub from_repo: &'a str,
    pub to_repo: &'a str,
    #[serde(rename = "type")]
    pub repo_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteSpaceRequest<'a> {
    #[serde(rename = "type")]
    pub repo_type: &'static str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisibilityRequest {
    pub private: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HardwareRequest<'a> {
    pub flavor: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageRequest<'a> {
    pub tier: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SleepTimeRequest {
    pub seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryRequest<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryKeyRequest<'a> {
    pub key: &'a str,
}

/// Response of `POST /repos/create`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedSpace {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Response of `GET /spaces/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceInfo {
    pub id: Option<String>,
    pub author: Option<String>,
    pub last_modified: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub sdk: Option<String>,
    pub runtime: Option<SpaceRuntime>,
}

/// Runtime document, returned by `GET /spaces/{id}` and by the hardware,
/// storage and sleep-time endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceRuntime {
    pub stage: Option<String>,
    pub hardware: Option<RuntimeTier>,
    pub storage: Option<StorageTier>,
    #[serde(alias = "sleep_time")]
    pub gc_timeout: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeTier {
    pub current: Option<String>,
    pub requested: Option<String>,
}

impl RuntimeTier {
    /// The running tier, or the requested one while a change is pending.
    pub fn effective(&self) -> Option<&str> {
        self.current.as_deref().or(self.requested.as_deref())
    }
}

/// Storage is reported either as a bare tier name or as a current/requested
/// pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StorageTier {
    Plain(String),
    Detailed(RuntimeTier),
}

impl StorageTier {
    pub fn effective(&self) -> Option<&str> {
        match self {
            Self::Plain(tier) => Some(tier),
            Self::Detailed(tier) => tier.effective(),
        }
    }
}

/// Response of `GET /spaces/{id}/{secrets|variables}`. Only keys matter.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntryListing {
    Map(BTreeMap<String, IgnoredAny>),
    List(Vec<ListedEntry>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListedEntry {
    pub key: String,
}

impl Default for EntryListing {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

impl EntryListing {
    /// Keys in sorted order.
    pub fn into_keys(self) -> Vec<String> {
        match self {
            Self::Map(map) => map.into_keys().collect(),
            Self::List(list) => {
                let mut keys: Vec<String> = list.into_iter().map(|e| e.key).collect();
                keys.sort();
                keys.dedup();
                keys
            }
        }
    }
}

/// Decodes a response body. An empty body decodes as `T::default()`.
pub fn decode<T>(operation: Operation, response: &ApiResponse) -> Result<T, SpaceError>
where
    T: DeserializeOwned + Default,
{
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&response.body).map_err(|e| SpaceError::decode(operation, e))
}

/// Serializes a request body.
pub fn to_body<T: Serialize>(operation: Operation, body: &T) -> Result<Value, SpaceError> {
    serde_json::to_value(body).map_err(|e| SpaceError::encode(operation, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_serialization() {
        let body = to_body(Operation::CreateSpace, &CreateSpaceRequest {
            repo_type: REPO_TYPE,
            name: "demo",
            private: false,
            sdk: "gradio",
            template: None,
            hardware: "cpu-basic",
            storage: "small",
            sleep_time: 3600,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "type": "space",
                "name": "demo",
                "private": false,
                "sdk": "gradio",
                "hardware": "cpu-basic",
                "storage": "small",
                "sleepTime": 3600
            })
        );
    }

    #[test]
    fn test_entry_values_are_escaped() {
        let body = to_body(
            Operation::AddEntry(crate::model::CollectionKind::Secrets),
            &EntryRequest {
                key: "QUOTE",
                value: "he said \"hi\"\n",
            },
        )
        .unwrap();
        let raw = serde_json::to_string(&body).unwrap();
        assert_eq!(raw, r#"{"key":"QUOTE","value":"he said \"hi\"\n"}"#);
    }

    #[test]
    fn test_move_request_field_names() {
        let body = to_body(
            Operation::RenameSpace,
            &MoveRequest {
                from_repo: "acme/a",
                to_repo: "acme/b",
                repo_type: REPO_TYPE,
            },
        )
        .unwrap();
        assert_eq!(body, json!({"fromRepo": "acme/a", "toRepo": "acme/b", "type": "space"}));
    }

    #[test]
    fn test_space_info_decoding() {
        let info: SpaceInfo = serde_json::from_value(json!({
            "id": "acme/demo",
            "author": "acme",
            "lastModified": "2024-05-01T10:00:00.000Z",
            "private": true,
            "likes": 7,
            "tags": ["gradio", "region:us"],
            "sdk": "gradio",
            "runtime": {
                "stage": "RUNNING",
                "hardware": {"current": null, "requested": "t4-small"},
                "storage": "small",
                "gcTimeout": 3600
            }
        }))
        .unwrap();

        let runtime = info.runtime.unwrap();
        assert_eq!(runtime.hardware.unwrap().effective(), Some("t4-small"));
        assert_eq!(runtime.storage.unwrap().effective(), Some("small"));
        assert_eq!(runtime.gc_timeout, Some(3600));
        assert_eq!(info.likes, 7);
    }

    #[test]
    fn test_storage_tier_detailed_form() {
        let tier: StorageTier =
            serde_json::from_value(json!({"current": "medium", "requested": "large"})).unwrap();
        assert_eq!(tier.effective(), Some("medium"));
    }

    #[test]
    fn test_entry_listing_shapes() {
        let map: EntryListing =
            serde_json::from_value(json!({"b": {"value": "2"}, "a": {"value": "1"}})).unwrap();
        assert_eq!(map.into_keys(), vec!["a", "b"]);

        let list: EntryListing =
            serde_json::from_value(json!([{"key": "z"}, {"key": "y", "updatedAt": "now"}]))
                .unwrap();
        assert_eq!(list.into_keys(), vec!["y", "z"]);
    }

    #[test]
    fn test_decode_empty_body_uses_default() {
        let runtime: SpaceRuntime =
            decode(Operation::UpdateHardware, &ApiResponse::new(200, "")).unwrap();
        assert!(runtime.stage.is_none());

        let err = decode::<SpaceRuntime>(Operation::UpdateHardware, &ApiResponse::new(200, "oops"))
            .unwrap_err();
        assert!(matches!(err, SpaceError::Decode { .. }));
    }
}
