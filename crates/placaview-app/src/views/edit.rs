//! Edit view for a single record

use std::time::Duration;

use chrono::Local;
use log::error;
use placaview_client::RecordsApi;
use placaview_types::{Error, PlateRecord, PlateUpdate, Result};

use super::{Redirect, Route};

/// Timestamp layout the backend writes
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LOAD_ERROR: &str = "Erro ao carregar registro";
const SAVE_ERROR: &str = "Erro ao atualizar registro";
const SAVE_SUCCESS: &str = "Dados atualizados com sucesso!";
const REQUIRED_FIELDS: &str = "Placa e hora de entrada são obrigatórias";
const NOT_FOUND: &str = "Registro não encontrado.";
const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Editable fields, as typed by the operator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub plate: String,
    pub entry_time: String,
    pub exit_time: String,
}

impl EditForm {
    pub fn from_record(record: &PlateRecord) -> Self {
        Self {
            plate: record.plate.clone(),
            entry_time: record.entry_time.clone(),
            exit_time: record.exit_time.clone().unwrap_or_default(),
        }
    }

    /// Blank exit time is left out of the update
    pub fn to_update(&self) -> PlateUpdate {
        let exit = self.exit_time.trim();
        PlateUpdate {
            plate: Some(self.plate.trim().to_string()),
            entry_time: Some(self.entry_time.trim().to_string()),
            exit_time: (!exit.is_empty()).then(|| exit.to_string()),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.plate.trim().is_empty() && !self.entry_time.trim().is_empty()
    }
}

pub struct EditView {
    id: String,
    record: Option<PlateRecord>,
    form: EditForm,
    loading: bool,
    loaded: bool,
    saving: bool,
    error: Option<String>,
    success: Option<String>,
}

impl EditView {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            record: None,
            form: EditForm::default(),
            loading: false,
            loaded: false,
            saving: false,
            error: None,
            success: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self) -> Option<&PlateRecord> {
        self.record.as_ref()
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EditForm {
        &mut self.form
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Shown in place of the form when loading produced no record
    pub fn not_found_message(&self) -> Option<&'static str> {
        (self.loaded && !self.loading && self.record.is_none() && self.error.is_none())
            .then_some(NOT_FOUND)
    }

    /// Fill the exit time with the local clock
    pub fn set_exit_now(&mut self) {
        self.form.exit_time = Local::now().format(TIMESTAMP_FORMAT).to_string();
    }

    pub fn begin_load(&mut self) -> Option<String> {
        if self.loading || self.saving {
            return None;
        }
        self.loading = true;
        Some(self.id.clone())
    }

    pub fn finish_load(&mut self, result: Result<PlateRecord>) {
        self.loading = false;
        self.loaded = true;
        match result {
            Ok(record) => {
                self.form = EditForm::from_record(&record);
                self.record = Some(record);
                self.error = None;
            }
            // A missing record is reported through `not_found_message` alone
            Err(Error::NotFound(_)) => {
                self.record = None;
                self.error = None;
            }
            Err(e) => {
                error!("failed to load record {}: {}", self.id, e);
                self.record = None;
                self.error = Some(LOAD_ERROR.to_string());
            }
        }
    }

    pub fn load(&mut self, api: &dyn RecordsApi) {
        if let Some(id) = self.begin_load() {
            let result = api.get(&id);
            self.finish_load(result);
        }
    }

    /// Returns the update to send; None while busy, before load, or when a
    /// required field is blank
    pub fn begin_save(&mut self) -> Option<(String, PlateUpdate)> {
        if self.saving || self.loading || self.record.is_none() {
            return None;
        }
        self.success = None;
        if !self.form.is_complete() {
            self.error = Some(REQUIRED_FIELDS.to_string());
            return None;
        }
        self.error = None;
        self.saving = true;
        Some((self.id.clone(), self.form.to_update()))
    }

    /// Redirects to the list only on success; a failure keeps the form as typed
    pub fn finish_save(&mut self, result: Result<PlateRecord>) -> Option<Redirect> {
        self.saving = false;
        match result {
            Ok(record) => {
                self.record = Some(record);
                self.success = Some(SAVE_SUCCESS.to_string());
                Some(Redirect {
                    to: Route::Records,
                    after: REDIRECT_DELAY,
                })
            }
            Err(e) => {
                error!("failed to update record {}: {}", self.id, e);
                self.error = Some(SAVE_ERROR.to_string());
                None
            }
        }
    }

    pub fn save(&mut self, api: &dyn RecordsApi) -> Option<Redirect> {
        let (id, update) = self.begin_save()?;
        let result = api.update(&id, &update);
        self.finish_save(result)
    }
}
