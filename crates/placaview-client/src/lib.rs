//! Client side of the plate recognition/records API
//!
//! [`RecordsApi`] is the seam the views talk to; [`HttpClient`] is the
//! production implementation over HTTP.

mod http;
pub mod multipart;

pub use http::{HttpClient, DEFAULT_BASE_URL, DEFAULT_LIST_LIMIT, REQUEST_TIMEOUT};

use placaview_types::{
    CleanupReport, DeleteResponse, ExitResponse, HealthStatus, PlateRecord, PlateUpdate, Result,
    UploadPayload, UploadResponse,
};

/// Operations offered by the recognition/records backend.
///
/// Every call is a single request: no retry, caching or batching.
pub trait RecordsApi: Send + Sync {
    /// Submit an image (file or captured frame) for recognition
    fn upload(&self, payload: &UploadPayload) -> Result<UploadResponse>;

    /// List up to `limit` records, in backend order
    fn list(&self, limit: u32) -> Result<Vec<PlateRecord>>;

    /// Fetch one record by its identifier
    fn get(&self, id: &str) -> Result<PlateRecord>;

    /// Find the record for a plate number
    fn search(&self, plate: &str) -> Result<PlateRecord>;

    /// Apply a partial update and return the stored record
    fn update(&self, id: &str, update: &PlateUpdate) -> Result<PlateRecord>;

    fn delete(&self, id: &str) -> Result<DeleteResponse>;

    /// Have the backend stamp the exit time with its own clock
    fn register_exit(&self, id: &str) -> Result<ExitResponse>;

    fn health(&self) -> Result<HealthStatus>;

    /// Remove records whose plate text is null
    fn clean_invalid(&self) -> Result<CleanupReport>;
}
