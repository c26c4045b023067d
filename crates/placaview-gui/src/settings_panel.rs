//! Settings panel for PlacaView GUI

use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, Ui};
use placaview_app::config::{Config, API_URL_ENV};
use placaview_client::{HttpClient, RecordsApi};
use placaview_types::{CleanupReport, HealthStatus, Result};

use crate::task::{take_result, Task};

/// Settings panel
pub struct SettingsPanel {
    api_url_input: String,
    limit_input: String,
    camera_input: String,
    health: Option<Task<Result<HealthStatus>>>,
    cleanup: Option<Task<Result<CleanupReport>>>,
    /// Status message
    status_message: Option<(String, bool)>, // (message, is_error)
}

impl SettingsPanel {
    pub fn new(config: &Config) -> Self {
        Self {
            api_url_input: config.api_url.clone(),
            limit_input: config.list_limit.to_string(),
            camera_input: config.camera_device.to_string(),
            health: None,
            cleanup: None,
            status_message: None,
        }
    }

    /// Returns true when the configuration was changed and saved
    pub fn ui(&mut self, ui: &mut Ui, config: &mut Config, api: &Arc<dyn RecordsApi>) -> bool {
        self.poll();
        let mut saved = false;

        ui.heading("Configurações");
        ui.add_space(10.0);

        egui::Grid::new("settings_form")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                ui.label("URL da API:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.api_url_input)
                        .hint_text("http://localhost:8000")
                        .desired_width(280.0),
                );
                ui.end_row();

                ui.label("Limite de registros:");
                ui.add(egui::TextEdit::singleline(&mut self.limit_input).desired_width(80.0));
                ui.end_row();

                ui.label("Câmera (índice):");
                ui.add(egui::TextEdit::singleline(&mut self.camera_input).desired_width(80.0));
                ui.end_row();
            });

        let resolved = config.resolved_api_url();
        if resolved != config.api_url {
            ui.label(
                RichText::new(format!("{} em uso: {}", API_URL_ENV, resolved))
                    .small()
                    .color(Color32::YELLOW),
            );
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.button("Salvar").clicked() {
                match self.apply(config) {
                    Ok(()) => {
                        saved = true;
                        self.status_message = Some(("Configuração salva.".to_string(), false));
                    }
                    Err(message) => self.status_message = Some((message, true)),
                }
            }
            if ui.button("Restaurar padrão").clicked() {
                let defaults = Config::default();
                self.api_url_input = defaults.api_url;
                self.limit_input = defaults.list_limit.to_string();
                self.camera_input = defaults.camera_device.to_string();
            }
        });

        ui.add_space(16.0);
        ui.separator();
        ui.label(RichText::new("Servidor").strong());
        ui.add_space(5.0);

        let busy = self.health.is_some() || self.cleanup.is_some();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!busy, egui::Button::new("Testar conexão"))
                .clicked()
            {
                let api = Arc::clone(api);
                self.health = Some(Task::spawn(ui.ctx(), move || api.health()));
            }
            if ui
                .add_enabled(!busy, egui::Button::new("Limpar registros inválidos"))
                .clicked()
            {
                let api = Arc::clone(api);
                self.cleanup = Some(Task::spawn(ui.ctx(), move || api.clean_invalid()));
            }
            if busy {
                ui.spinner();
            }
        });

        if let Some((ref msg, is_error)) = self.status_message {
            ui.add_space(10.0);
            let color = if is_error {
                Color32::LIGHT_RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }

        saved
    }

    /// Validate the inputs and save them; the error is shown to the operator
    fn apply(&self, config: &mut Config) -> std::result::Result<(), String> {
        let api_url = self.api_url_input.trim().trim_end_matches('/').to_string();
        if let Err(e) = HttpClient::new(&api_url) {
            return Err(format!("URL inválida: {}", e));
        }
        let list_limit = match self.limit_input.trim().parse::<u32>() {
            Ok(limit) if limit > 0 => limit,
            _ => return Err("Limite deve ser um número maior que zero".to_string()),
        };
        let camera_device = self
            .camera_input
            .trim()
            .parse::<usize>()
            .map_err(|_| "Índice da câmera inválido".to_string())?;

        let mut updated = config.clone();
        updated.api_url = api_url;
        updated.list_limit = list_limit;
        updated.camera_device = camera_device;
        if let Err(e) = updated.save() {
            log::error!("failed to save configuration: {}", e);
            return Err(format!("Erro ao salvar configuração: {}", e));
        }
        *config = updated;
        Ok(())
    }

    fn poll(&mut self) {
        if let Some(result) = take_result(&mut self.health) {
            self.status_message = Some(match result {
                Ok(status) => (
                    format!(
                        "Servidor: {}{}",
                        status.status,
                        status.message.map(|m| format!(" ({})", m)).unwrap_or_default()
                    ),
                    false,
                ),
                Err(e) => {
                    log::warn!("health check failed: {}", e);
                    (format!("Servidor indisponível: {}", e), true)
                }
            });
        }

        if let Some(result) = take_result(&mut self.cleanup) {
            self.status_message = Some(match result {
                Ok(report) => (report.message, false),
                Err(e) => {
                    log::error!("cleanup failed: {}", e);
                    (
                        e.detail()
                            .unwrap_or("Erro ao limpar registros inválidos")
                            .to_string(),
                        true,
                    )
                }
            });
        }
    }
}
