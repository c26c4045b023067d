//! Upload view: pick a file or capture a camera frame, then submit it

use std::path::Path;

use log::error;
use placaview_client::RecordsApi;
use placaview_types::{Error, Result, UploadPayload, UploadResponse};

use crate::camera::Camera;
use crate::capture::CaptureFlow;

const FILE_ERROR: &str = "Erro ao processar imagem";
const FRAME_ERROR: &str = "Erro ao processar imagem capturada";
const NO_PLATE_ERROR: &str = "Nenhuma placa reconhecida na imagem";
const CAMERA_ERROR: &str = "Erro ao acessar a câmera";

/// What one submission ended in
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Recognized(UploadResponse),
    NotFound(String),
    Failed(String),
}

impl UploadOutcome {
    /// Map a recognition call result to the message shown to the operator
    pub fn from_result(result: Result<UploadResponse>, was_frame: bool) -> Self {
        let fallback = if was_frame { FRAME_ERROR } else { FILE_ERROR };
        match result {
            Ok(response) if response.success => UploadOutcome::Recognized(response),
            Ok(response) => UploadOutcome::Failed(
                response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            ),
            Err(Error::NotFound(detail)) => UploadOutcome::NotFound(if detail.is_empty() {
                NO_PLATE_ERROR.to_string()
            } else {
                detail
            }),
            Err(e) => UploadOutcome::Failed(e.detail().unwrap_or(fallback).to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Recognized(_))
    }
}

pub struct UploadView {
    flow: CaptureFlow,
    result: Option<UploadResponse>,
    error: Option<String>,
    is_uploading: bool,
    submitting_frame: bool,
}

impl UploadView {
    pub fn new(camera: Box<dyn Camera>) -> Self {
        Self {
            flow: CaptureFlow::new(camera),
            result: None,
            error: None,
            is_uploading: false,
            submitting_frame: false,
        }
    }

    pub fn flow(&self) -> &CaptureFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut CaptureFlow {
        &mut self.flow
    }

    pub fn result(&self) -> Option<&UploadResponse> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    /// Start an attempt with an image file. Returns false if it was refused.
    pub fn select_file(&mut self, path: &Path) -> bool {
        if self.is_uploading {
            return false;
        }
        match UploadPayload::from_path(path).and_then(|p| self.flow.pick_file(p)) {
            Ok(()) => true,
            Err(e) => {
                error!("cannot use {}: {}", path.display(), e);
                self.error = Some(FILE_ERROR.to_string());
                self.result = None;
                false
            }
        }
    }

    pub fn open_camera(&mut self) -> bool {
        if self.is_uploading {
            return false;
        }
        match self.flow.open_camera() {
            Ok(()) => true,
            Err(e) => {
                error!("camera open failed: {}", e);
                self.error = Some(CAMERA_ERROR.to_string());
                false
            }
        }
    }

    pub fn capture(&mut self) -> bool {
        match self.flow.capture() {
            Ok(()) => true,
            Err(e) => {
                error!("frame capture failed: {}", e);
                self.error = Some(CAMERA_ERROR.to_string());
                false
            }
        }
    }

    /// Discard the current attempt (and close the camera)
    pub fn reset(&mut self) {
        if !self.is_uploading {
            self.flow.reset();
        }
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        !self.is_uploading && self.flow.is_ready()
    }

    pub fn begin_submit(&mut self) -> Option<UploadPayload> {
        if self.is_uploading {
            return None;
        }
        let payload = self.flow.begin_submit()?;
        self.submitting_frame = payload.is_frame();
        self.is_uploading = true;
        Some(payload)
    }

    pub fn finish_submit(&mut self, result: Result<UploadResponse>) -> UploadOutcome {
        if let Err(ref e) = result {
            error!("upload failed: {}", e);
        }
        let outcome = UploadOutcome::from_result(result, self.submitting_frame);
        self.flow.finish_submit(outcome.is_success());
        self.is_uploading = false;

        match &outcome {
            UploadOutcome::Recognized(response) => {
                self.result = Some(response.clone());
                self.error = None;
            }
            UploadOutcome::NotFound(message) | UploadOutcome::Failed(message) => {
                self.result = None;
                self.error = Some(message.clone());
            }
        }
        outcome
    }

    /// Submit synchronously; None when nothing was ready or already busy
    pub fn submit(&mut self, api: &dyn RecordsApi) -> Option<UploadOutcome> {
        let payload = self.begin_submit()?;
        let result = api.upload(&payload);
        Some(self.finish_submit(result))
    }
}
