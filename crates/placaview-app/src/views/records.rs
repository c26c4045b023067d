//! Records list view

use log::error;
use placaview_client::RecordsApi;
use placaview_types::{DeleteResponse, PlateRecord, Result};

pub const EMPTY_LIST_MESSAGE: &str = "Nenhum registro encontrado.";
pub const DELETE_CONFIRMATION: &str = "Tem certeza que deseja excluir este registro?";

const LOAD_ERROR: &str = "Erro ao carregar registros";
const DELETE_ERROR: &str = "Erro ao excluir registro";
const EXIT_ERROR: &str = "Erro ao registrar saída";

pub struct RecordsView {
    records: Vec<PlateRecord>,
    limit: u32,
    loading: bool,
    loaded: bool,
    error: Option<String>,
    /// Record with a delete or exit call in flight
    busy_id: Option<String>,
}

impl RecordsView {
    pub fn new(limit: u32) -> Self {
        Self {
            records: Vec::new(),
            limit,
            loading: false,
            loaded: false,
            error: None,
            busy_id: None,
        }
    }

    pub fn records(&self) -> &[PlateRecord] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// A first load has completed (successfully or not)
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn busy_id(&self) -> Option<&str> {
        self.busy_id.as_deref()
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }

    /// "N registro(s) encontrado(s)"
    pub fn summary(&self) -> String {
        format!("{} registro(s) encontrado(s)", self.records.len())
    }

    /// Message shown instead of the list when it is empty
    pub fn empty_message(&self) -> Option<&'static str> {
        self.records.is_empty().then_some(EMPTY_LIST_MESSAGE)
    }

    /// Returns the limit to request, or None while a load is running
    pub fn begin_load(&mut self) -> Option<u32> {
        if self.loading {
            return None;
        }
        self.loading = true;
        Some(self.limit)
    }

    pub fn finish_load(&mut self, result: Result<Vec<PlateRecord>>) {
        self.loading = false;
        self.loaded = true;
        match result {
            Ok(records) => {
                self.records = records;
                self.error = None;
            }
            Err(e) => {
                error!("failed to load records: {}", e);
                self.error = Some(LOAD_ERROR.to_string());
            }
        }
    }

    pub fn load(&mut self, api: &dyn RecordsApi) {
        if let Some(limit) = self.begin_load() {
            let result = api.list(limit);
            self.finish_load(result);
        }
    }

    /// Claim `id` for a delete; None while another record action is in flight
    pub fn begin_delete(&mut self, id: &str) -> Option<String> {
        self.claim(id)
    }

    /// On success the record leaves the list without a reload
    pub fn finish_delete(&mut self, id: &str, result: Result<DeleteResponse>) {
        self.busy_id = None;
        match result {
            Ok(_) => self.records.retain(|r| r.id() != id),
            Err(e) => {
                error!("failed to delete {}: {}", id, e);
                self.error = Some(DELETE_ERROR.to_string());
            }
        }
    }

    pub fn delete(&mut self, api: &dyn RecordsApi, id: &str) {
        if let Some(id) = self.begin_delete(id) {
            let result = api.delete(&id);
            self.finish_delete(&id, result);
        }
    }

    pub fn begin_exit(&mut self, id: &str) -> Option<String> {
        self.claim(id)
    }

    /// `result` is the record re-read after the exit was registered
    pub fn finish_exit(&mut self, id: &str, result: Result<PlateRecord>) {
        self.busy_id = None;
        match result {
            Ok(updated) => {
                if let Some(slot) = self.records.iter_mut().find(|r| r.id() == id) {
                    *slot = updated;
                }
            }
            Err(e) => {
                error!("failed to register exit for {}: {}", id, e);
                self.error = Some(EXIT_ERROR.to_string());
            }
        }
    }

    pub fn register_exit(&mut self, api: &dyn RecordsApi, id: &str) {
        if let Some(id) = self.begin_exit(id) {
            let result = fetch_after_exit(api, &id);
            self.finish_exit(&id, result);
        }
    }

    fn claim(&mut self, id: &str) -> Option<String> {
        if self.busy_id.is_some() || !self.records.iter().any(|r| r.id() == id) {
            return None;
        }
        self.busy_id = Some(id.to_string());
        Some(id.to_string())
    }
}

/// Register the exit, then read the record back for its new exit time
pub fn fetch_after_exit(api: &dyn RecordsApi, id: &str) -> Result<PlateRecord> {
    api.register_exit(id)?;
    api.get(id)
}
