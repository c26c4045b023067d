//! Edit panel for a single record

use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, Ui};
use placaview_app::views::{EditView, Redirect};
use placaview_client::RecordsApi;
use placaview_types::{PlateRecord, Result};

use crate::preview::{self, CachedTexture};
use crate::task::{take_result, Task};

pub enum EditAction {
    /// Leave the edit view without waiting
    Back,
    /// Saved; navigate once the delay has passed
    Redirect(Redirect),
}

pub struct EditPanel {
    view: EditView,
    loading: Option<Task<Result<PlateRecord>>>,
    saving: Option<Task<Result<PlateRecord>>>,
    image: CachedTexture,
    started: bool,
}

impl EditPanel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            view: EditView::new(id),
            loading: None,
            saving: None,
            image: CachedTexture::default(),
            started: false,
        }
    }

    pub fn id(&self) -> &str {
        self.view.id()
    }

    pub fn ui(&mut self, ui: &mut Ui, api: &Arc<dyn RecordsApi>) -> Option<EditAction> {
        if !self.started {
            self.started = true;
            if let Some(id) = self.view.begin_load() {
                let api = Arc::clone(api);
                self.loading = Some(Task::spawn(ui.ctx(), move || api.get(&id)));
            }
        }

        let mut action = None;

        if let Some(result) = take_result(&mut self.loading) {
            self.view.finish_load(result);
        }
        if let Some(result) = take_result(&mut self.saving) {
            if let Some(redirect) = self.view.finish_save(result) {
                action = Some(EditAction::Redirect(redirect));
            }
        }

        ui.horizontal(|ui| {
            if ui.button("← Voltar").clicked() {
                action = Some(EditAction::Back);
            }
            ui.heading("Editar registro");
        });
        ui.add_space(10.0);

        if self.view.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Carregando registro...");
            });
            return action;
        }

        if let Some(error) = self.view.error() {
            ui.label(RichText::new(error).color(Color32::LIGHT_RED));
            ui.add_space(6.0);
        }

        if let Some(message) = self.view.not_found_message() {
            ui.label(RichText::new(message).color(Color32::GRAY));
        }
        if self.view.record().is_none() {
            return action;
        }

        let saving = self.view.is_saving();
        let form = self.view.form_mut();
        let mut exit_now = false;

        egui::Grid::new("edit_form")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                ui.label("Placa:");
                ui.add_enabled(
                    !saving,
                    egui::TextEdit::singleline(&mut form.plate).desired_width(200.0),
                );
                ui.end_row();

                ui.label("Hora de entrada:");
                ui.add_enabled(
                    !saving,
                    egui::TextEdit::singleline(&mut form.entry_time)
                        .hint_text("AAAA-MM-DD HH:MM:SS")
                        .desired_width(200.0),
                );
                ui.end_row();

                ui.label("Hora de saída:");
                ui.horizontal(|ui| {
                    ui.add_enabled(
                        !saving,
                        egui::TextEdit::singleline(&mut form.exit_time)
                            .hint_text("Ainda no estacionamento")
                            .desired_width(200.0),
                    );
                    if ui.add_enabled(!saving, egui::Button::new("Agora")).clicked() {
                        exit_now = true;
                    }
                });
                ui.end_row();
            });

        if exit_now {
            self.view.set_exit_now();
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.add_enabled(!saving, egui::Button::new("Salvar")).clicked() {
                if let Some((id, update)) = self.view.begin_save() {
                    let api = Arc::clone(api);
                    self.saving = Some(Task::spawn(ui.ctx(), move || api.update(&id, &update)));
                }
            }
            if saving {
                ui.spinner();
            }
        });

        if let Some(success) = self.view.success() {
            ui.add_space(6.0);
            ui.label(RichText::new(success).color(Color32::LIGHT_GREEN));
        }

        if let Some(record) = self.view.record() {
            let key = format!("edit_{}", record.id());
            if let Some(texture) = self.image.get_or_decode(ui.ctx(), &key, &record.image_base64) {
                ui.add_space(10.0);
                preview::show(ui, texture, 480.0, 360.0);
            }
        }

        action
    }
}
