//! Records panel: list, exit registration and deletion

use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use placaview_app::views::{fetch_after_exit, RecordsView, DELETE_CONFIRMATION};
use placaview_client::RecordsApi;
use placaview_types::{DeleteResponse, PlateRecord, Result};

use crate::preview::{self, TextureCache};
use crate::task::{take_result, Task};

const THUMBNAIL_WIDTH: f32 = 80.0;
const THUMBNAIL_HEIGHT: f32 = 48.0;

/// Action the parent has to carry out
pub enum RecordsAction {
    Edit(String),
}

pub struct RecordsPanel {
    view: RecordsView,
    loading: Option<Task<Result<Vec<PlateRecord>>>>,
    /// Requests for the record in `view.busy_id()`
    deleting: Option<Task<Result<DeleteResponse>>>,
    exiting: Option<Task<Result<PlateRecord>>>,
    /// Record waiting for the delete confirmation
    confirm_delete: Option<String>,
    /// Record images keyed by record id
    thumbnails: TextureCache,
    needs_reload: bool,
}

impl RecordsPanel {
    pub fn new(limit: u32) -> Self {
        Self {
            view: RecordsView::new(limit),
            loading: None,
            deleting: None,
            exiting: None,
            confirm_delete: None,
            thumbnails: TextureCache::default(),
            needs_reload: true,
        }
    }

    /// Reload the list the next time the panel is shown
    pub fn refresh(&mut self) {
        self.needs_reload = true;
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.view.set_limit(limit);
        self.needs_reload = true;
    }

    pub fn ui(&mut self, ui: &mut Ui, api: &Arc<dyn RecordsApi>) -> Option<RecordsAction> {
        self.poll();

        if self.needs_reload {
            self.start_load(ui.ctx(), api);
        }

        ui.horizontal(|ui| {
            ui.heading("Registros");
            ui.add_space(16.0);
            if ui
                .add_enabled(!self.view.is_loading(), egui::Button::new("Atualizar"))
                .clicked()
            {
                self.start_load(ui.ctx(), api);
            }
            if self.view.is_loading() {
                ui.spinner();
            }
        });
        ui.add_space(8.0);

        if let Some(error) = self.view.error() {
            ui.label(RichText::new(error).color(Color32::LIGHT_RED));
            ui.add_space(6.0);
        }

        if !self.view.is_loaded() {
            return None;
        }

        ui.label(self.view.summary());
        ui.add_space(6.0);

        if let Some(message) = self.view.empty_message() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(RichText::new(message).color(Color32::GRAY));
            });
            return None;
        }

        let action = self.render_table(ui, api);
        self.render_confirm_dialog(ui, api);
        action
    }

    fn render_table(&mut self, ui: &mut Ui, api: &Arc<dyn RecordsApi>) -> Option<RecordsAction> {
        let mut action = None;
        let mut exit_requested = None;
        let mut delete_requested = None;
        let busy_id = self.view.busy_id().map(str::to_string);
        let ctx = ui.ctx().clone();
        let thumbnails = &mut self.thumbnails;
        let records = self.view.records();

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::exact(THUMBNAIL_WIDTH))
            .column(Column::auto().at_least(90.0))
            .column(Column::auto().at_least(140.0))
            .column(Column::auto().at_least(160.0))
            .column(Column::remainder())
            .header(22.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Imagem");
                });
                header.col(|ui| {
                    ui.strong("Placa");
                });
                header.col(|ui| {
                    ui.strong("Entrada");
                });
                header.col(|ui| {
                    ui.strong("Saída");
                });
                header.col(|ui| {
                    ui.strong("Ações");
                });
            })
            .body(|mut body| {
                for record in records {
                    let id = record.id().to_string();
                    let row_busy = busy_id.is_some();
                    body.row(THUMBNAIL_HEIGHT + 4.0, |mut row| {
                        row.col(|ui| {
                            match thumbnails.get_or_decode(&ctx, &id, &record.image_base64) {
                                Some(texture) => {
                                    preview::show(ui, texture, THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT)
                                }
                                None => {
                                    ui.label(RichText::new("sem imagem").small().color(Color32::GRAY));
                                }
                            }
                        });
                        row.col(|ui| {
                            ui.label(RichText::new(&record.plate).monospace());
                        });
                        row.col(|ui| {
                            ui.label(record.entry_time.as_str());
                        });
                        row.col(|ui| {
                            let label = RichText::new(record.exit_label());
                            if record.is_present() {
                                ui.label(label.color(Color32::LIGHT_BLUE));
                            } else {
                                ui.label(label);
                            }
                        });
                        row.col(|ui| {
                            if busy_id.as_deref() == Some(id.as_str()) {
                                ui.spinner();
                                return;
                            }
                            if ui.add_enabled(!row_busy, egui::Button::new("Editar")).clicked() {
                                action = Some(RecordsAction::Edit(id.clone()));
                            }
                            if record.is_present()
                                && ui
                                    .add_enabled(!row_busy, egui::Button::new("Registrar saída"))
                                    .clicked()
                            {
                                exit_requested = Some(id.clone());
                            }
                            if ui.add_enabled(!row_busy, egui::Button::new("Excluir")).clicked() {
                                delete_requested = Some(id.clone());
                            }
                        });
                    });
                }
            });

        if let Some(id) = exit_requested {
            self.start_exit(ui.ctx(), api, &id);
        }
        if delete_requested.is_some() {
            self.confirm_delete = delete_requested;
        }
        action
    }

    fn render_confirm_dialog(&mut self, ui: &mut Ui, api: &Arc<dyn RecordsApi>) {
        let Some(id) = self.confirm_delete.clone() else {
            return;
        };

        let mut close = false;
        egui::Window::new("Excluir registro")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ui.ctx(), |ui| {
                ui.label(DELETE_CONFIRMATION);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Excluir").clicked() {
                        self.start_delete(ui.ctx(), api, &id);
                        close = true;
                    }
                    if ui.button("Cancelar").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.confirm_delete = None;
        }
    }

    fn start_load(&mut self, ctx: &egui::Context, api: &Arc<dyn RecordsApi>) {
        self.needs_reload = false;
        if let Some(limit) = self.view.begin_load() {
            let api = Arc::clone(api);
            self.loading = Some(Task::spawn(ctx, move || api.list(limit)));
        }
    }

    fn start_delete(&mut self, ctx: &egui::Context, api: &Arc<dyn RecordsApi>, id: &str) {
        if let Some(id) = self.view.begin_delete(id) {
            let api = Arc::clone(api);
            self.deleting = Some(Task::spawn(ctx, move || api.delete(&id)));
        }
    }

    fn start_exit(&mut self, ctx: &egui::Context, api: &Arc<dyn RecordsApi>, id: &str) {
        if let Some(id) = self.view.begin_exit(id) {
            let api = Arc::clone(api);
            self.exiting = Some(Task::spawn(ctx, move || fetch_after_exit(api.as_ref(), &id)));
        }
    }

    fn poll(&mut self) {
        if let Some(result) = take_result(&mut self.loading) {
            self.view.finish_load(result);
            self.thumbnails
                .retain(self.view.records().iter().map(|record| record.id()));
        }

        if let Some(result) = take_result(&mut self.deleting) {
            let id = self.view.busy_id().unwrap_or_default().to_string();
            self.view.finish_delete(&id, result);
        }

        if let Some(result) = take_result(&mut self.exiting) {
            let id = self.view.busy_id().unwrap_or_default().to_string();
            self.view.finish_exit(&id, result);
        }
    }
}
