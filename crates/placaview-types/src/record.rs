//! Wire types for the plate records API
//!
//! Field names on the wire are the backend's Portuguese names; the Rust side
//! uses English names and `serde(rename)`.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Label shown when a record has no exit time yet
pub const STILL_PARKED_LABEL: &str = "Ainda no estacionamento";

/// Backend sends `null` for strings it never filled in.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One detected vehicle plate, as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateRecord {
    /// Assigned by the backend; read-only on this side
    #[serde(rename = "_id", alias = "id")]
    id: String,

    #[serde(rename = "placa", default, deserialize_with = "null_as_empty")]
    pub plate: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub filename: String,

    /// Annotated PNG, base64 without data-URL prefix
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_base64: String,

    #[serde(rename = "hora_entrada", default, deserialize_with = "null_as_empty")]
    pub entry_time: String,

    #[serde(rename = "hora_saida", default)]
    pub exit_time: Option<String>,
}

impl PlateRecord {
    pub fn new(id: impl Into<String>, plate: impl Into<String>, entry_time: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            plate: plate.into(),
            filename: String::new(),
            image_base64: String::new(),
            entry_time: entry_time.into(),
            exit_time: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Still inside: no exit time, or an empty one
    pub fn is_present(&self) -> bool {
        self.exit_time.as_deref().map_or(true, str::is_empty)
    }

    /// Exit time for display, or the "still parked" label
    pub fn exit_label(&self) -> &str {
        match self.exit_time.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => STILL_PARKED_LABEL,
        }
    }

    /// Decode the record image into raw PNG bytes
    pub fn image_bytes(&self) -> Result<Vec<u8>> {
        decode_image_base64(&self.image_base64)
    }
}

/// Partial update; absent fields are left untouched by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlateUpdate {
    #[serde(rename = "placa", skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,

    #[serde(rename = "hora_entrada", skip_serializing_if = "Option::is_none")]
    pub entry_time: Option<String>,

    #[serde(rename = "hora_saida", skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<String>,
}

impl PlateUpdate {
    pub fn is_empty(&self) -> bool {
        self.plate.is_none() && self.entry_time.is_none() && self.exit_time.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "placa")]
    pub plate: String,
}

/// Result of submitting an image for recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,

    #[serde(rename = "placa", default, deserialize_with = "null_as_empty")]
    pub plate: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_base64: String,

    #[serde(default = "default_true")]
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_true() -> bool {
    true
}

impl UploadResponse {
    pub fn message_or_default(&self) -> &str {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => "Placa reconhecida com sucesso!",
        }
    }

    pub fn image_bytes(&self) -> Result<Vec<u8>> {
        decode_image_base64(&self.image_base64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Answer to an exit registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitResponse {
    pub message: String,
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer of the invalid-record cleanup endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub message: String,
    #[serde(default)]
    pub deleted_count: u64,
}

/// Decode base64 image data, accepting an optional `data:...;base64,` prefix
pub fn decode_image_base64(data: &str) -> Result<Vec<u8>> {
    let data = match data.split_once(',') {
        Some((header, body)) if header.starts_with("data:") => body,
        _ => data,
    };
    Ok(STANDARD.decode(data.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_backend_json() {
        let json = r#"{
            "_id": "66b1f0c2a4",
            "placa": "ABC1D23",
            "filename": null,
            "image_base64": "aGVsbG8=",
            "hora_entrada": "2024-05-01 08:30:00",
            "hora_saida": null
        }"#;
        let record: PlateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id(), "66b1f0c2a4");
        assert_eq!(record.plate, "ABC1D23");
        assert_eq!(record.filename, "");
        assert!(record.is_present());
        assert_eq!(record.exit_label(), STILL_PARKED_LABEL);
        assert_eq!(record.image_bytes().unwrap(), b"hello");
    }

    #[test]
    fn test_record_missing_optional_fields() {
        let json = r#"{"_id": "1", "placa": null, "hora_saida": "2024-05-01 10:00:00"}"#;
        let record: PlateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.plate, "");
        assert_eq!(record.entry_time, "");
        assert!(!record.is_present());
        assert_eq!(record.exit_label(), "2024-05-01 10:00:00");
    }

    #[test]
    fn test_update_omits_absent_fields() {
        let update = PlateUpdate {
            plate: Some("XYZ9876".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "placa": "XYZ9876" }));
        assert!(!update.is_empty());
        assert!(PlateUpdate::default().is_empty());
    }

    #[test]
    fn test_upload_response_defaults() {
        let json = r#"{"placa": "ABC1234", "image_base64": ""}"#;
        let response: UploadResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert_eq!(response.id, None);
        assert_eq!(response.message_or_default(), "Placa reconhecida com sucesso!");
    }

    #[test]
    fn test_decode_image_base64_strips_data_url() {
        let bytes = decode_image_base64("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        assert!(decode_image_base64("not base64!").is_err());
    }
}
