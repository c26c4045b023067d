//! Test doubles for the camera and the records backend

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Mutex;

use image::{DynamicImage, Rgb, RgbImage};
use placaview_client::RecordsApi;
use placaview_types::{
    CameraError, CleanupReport, DeleteResponse, Error, ExitResponse, HealthStatus, PlateRecord,
    PlateUpdate, Result, UploadPayload, UploadResponse,
};

use crate::camera::{Camera, MediaStream};

pub struct FakeCamera {
    active: Rc<Cell<usize>>,
    fail_grab: bool,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self {
            active: Rc::new(Cell::new(0)),
            fail_grab: false,
        }
    }

    pub fn failing_grab() -> Self {
        Self {
            fail_grab: true,
            ..Self::new()
        }
    }

    /// Number of streams opened and not yet stopped
    pub fn active_streams(&self) -> Rc<Cell<usize>> {
        self.active.clone()
    }
}

impl Camera for FakeCamera {
    fn open(&mut self) -> Result<Box<dyn MediaStream>> {
        self.active.set(self.active.get() + 1);
        Ok(Box::new(FakeStream {
            active: self.active.clone(),
            stopped: false,
            fail_grab: self.fail_grab,
        }))
    }
}

struct FakeStream {
    active: Rc<Cell<usize>>,
    stopped: bool,
    fail_grab: bool,
}

impl MediaStream for FakeStream {
    fn grab_frame(&mut self) -> Result<DynamicImage> {
        if self.stopped {
            return Err(CameraError::NotOpen.into());
        }
        if self.fail_grab {
            return Err(CameraError::Capture("no signal".to_string()).into());
        }
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([30, 60, 90]))))
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.active.set(self.active.get() - 1);
        }
    }
}

/// In-memory backend that records every call
#[derive(Default)]
pub struct FakeApi {
    records: Mutex<Vec<PlateRecord>>,
    calls: Mutex<Vec<String>>,
    fail_next: Mutex<Option<Error>>,
}

impl FakeApi {
    pub fn with_records(records: Vec<PlateRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: Error) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Vec<PlateRecord> {
        self.records.lock().unwrap().clone()
    }

    fn enter(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found() -> Error {
        Error::NotFound("Placa não encontrada".to_string())
    }
}

impl RecordsApi for FakeApi {
    fn upload(&self, payload: &UploadPayload) -> Result<UploadResponse> {
        let kind = if payload.is_frame() { "frame" } else { "file" };
        self.enter(format!("upload {}", kind))?;
        let mut records = self.records.lock().unwrap();
        let id = format!("id{}", records.len() + 1);
        records.push(PlateRecord::new(id.clone(), "ABC1D23", "2024-05-01 08:30:00"));
        Ok(UploadResponse {
            id: Some(id),
            plate: "ABC1D23".to_string(),
            image_base64: String::new(),
            success: true,
            message: None,
            image_url: None,
        })
    }

    fn list(&self, limit: u32) -> Result<Vec<PlateRecord>> {
        self.enter(format!("list {}", limit))?;
        let records = self.records.lock().unwrap();
        Ok(records.iter().take(limit as usize).cloned().collect())
    }

    fn get(&self, id: &str) -> Result<PlateRecord> {
        self.enter(format!("get {}", id))?;
        let records = self.records.lock().unwrap();
        records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    fn search(&self, plate: &str) -> Result<PlateRecord> {
        self.enter(format!("search {}", plate))?;
        let records = self.records.lock().unwrap();
        records
            .iter()
            .find(|r| r.plate == plate)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("A placa {} não foi encontrada no sistema", plate)))
    }

    fn update(&self, id: &str, update: &PlateUpdate) -> Result<PlateRecord> {
        self.enter(format!("update {}", id))?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(Self::not_found)?;
        if let Some(ref plate) = update.plate {
            record.plate = plate.clone();
        }
        if let Some(ref entry) = update.entry_time {
            record.entry_time = entry.clone();
        }
        if update.exit_time.is_some() {
            record.exit_time = update.exit_time.clone();
        }
        Ok(record.clone())
    }

    fn delete(&self, id: &str) -> Result<DeleteResponse> {
        self.enter(format!("delete {}", id))?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(Self::not_found());
        }
        Ok(DeleteResponse {
            message: "Registro excluído com sucesso".to_string(),
        })
    }

    fn register_exit(&self, id: &str) -> Result<ExitResponse> {
        self.enter(format!("exit {}", id))?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(Self::not_found)?;
        record.exit_time = Some("2024-05-01 18:00:00".to_string());
        Ok(ExitResponse {
            message: "Saída registrada com sucesso".to_string(),
            id: Some(id.to_string()),
        })
    }

    fn health(&self) -> Result<HealthStatus> {
        self.enter("health".to_string())?;
        Ok(HealthStatus {
            status: "healthy".to_string(),
            message: None,
        })
    }

    fn clean_invalid(&self) -> Result<CleanupReport> {
        self.enter("clean".to_string())?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !r.plate.is_empty());
        let deleted = (before - records.len()) as u64;
        Ok(CleanupReport {
            message: format!("Limpeza concluída. {} registro(s) inválido(s) removido(s).", deleted),
            deleted_count: deleted,
        })
    }
}

pub fn record(id: &str, plate: &str) -> PlateRecord {
    PlateRecord::new(id, plate, "2024-05-01 08:30:00")
}
