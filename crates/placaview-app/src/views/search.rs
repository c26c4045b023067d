//! Plate search view

use log::error;
use placaview_client::RecordsApi;
use placaview_types::{Error, PlateRecord, Result};

const SEARCH_ERROR: &str = "Erro ao buscar placa";

#[derive(Default)]
pub struct SearchView {
    query: String,
    /// Plate text of the request in flight / last answered
    searched: String,
    result: Option<PlateRecord>,
    loading: bool,
    error: Option<String>,
}

impl SearchView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Plates are typed in upper case
    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_uppercase();
    }

    /// Text-edit binding; call [`SearchView::normalize_query`] after editing
    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn normalize_query(&mut self) {
        if self.query.chars().any(char::is_lowercase) {
            self.query = self.query.to_uppercase();
        }
    }

    pub fn result(&self) -> Option<&PlateRecord> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_search(&self) -> bool {
        !self.loading && !self.query.trim().is_empty()
    }

    /// Returns the plate to search for; None for a blank query or while busy
    pub fn begin_search(&mut self) -> Option<String> {
        if !self.can_search() {
            return None;
        }
        self.searched = self.query.trim().to_string();
        self.loading = true;
        self.error = None;
        self.result = None;
        Some(self.searched.clone())
    }

    pub fn finish_search(&mut self, result: Result<PlateRecord>) {
        self.loading = false;
        match result {
            Ok(record) => self.result = Some(record),
            Err(Error::NotFound(_)) => {
                self.error = Some(format!(
                    "A placa {} não foi encontrada no sistema.",
                    self.searched.to_uppercase()
                ));
            }
            Err(e) => {
                error!("plate search failed: {}", e);
                self.error = Some(SEARCH_ERROR.to_string());
            }
        }
    }

    pub fn search(&mut self, api: &dyn RecordsApi) {
        if let Some(plate) = self.begin_search() {
            let result = api.search(&plate);
            self.finish_search(result);
        }
    }
}
