//! Plate search panel

use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, Ui};
use placaview_app::views::SearchView;
use placaview_client::RecordsApi;
use placaview_types::{PlateRecord, Result};

use crate::preview::{self, CachedTexture};
use crate::task::{take_result, Task};

pub enum SearchAction {
    Edit(String),
}

#[derive(Default)]
pub struct SearchPanel {
    view: SearchView,
    pending: Option<Task<Result<PlateRecord>>>,
    image: CachedTexture,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ui(&mut self, ui: &mut Ui, api: &Arc<dyn RecordsApi>) -> Option<SearchAction> {
        if let Some(result) = take_result(&mut self.pending) {
            self.view.finish_search(result);
            self.image.clear();
        }

        ui.heading("Buscar placa");
        ui.add_space(10.0);

        let mut submit = false;
        ui.horizontal(|ui| {
            ui.label("Placa:");
            let response = ui.add(
                egui::TextEdit::singleline(self.view.query_mut())
                    .hint_text("ex: ABC1D23")
                    .desired_width(160.0),
            );
            if response.changed() {
                self.view.normalize_query();
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            if ui
                .add_enabled(self.view.can_search(), egui::Button::new("Buscar"))
                .clicked()
            {
                submit = true;
            }
            if self.view.is_loading() {
                ui.spinner();
            }
        });

        if submit {
            if let Some(plate) = self.view.begin_search() {
                let api = Arc::clone(api);
                self.pending = Some(Task::spawn(ui.ctx(), move || api.search(&plate)));
            }
        }

        ui.add_space(10.0);

        if let Some(error) = self.view.error() {
            ui.label(RichText::new(error).color(Color32::LIGHT_RED));
        }

        let record = self.view.result()?;
        let mut action = None;

        ui.separator();
        egui::Grid::new("search_result")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                ui.label("Placa:");
                ui.label(RichText::new(&record.plate).strong().monospace());
                ui.end_row();

                ui.label("Entrada:");
                ui.label(record.entry_time.as_str());
                ui.end_row();

                ui.label("Saída:");
                ui.label(record.exit_label());
                ui.end_row();
            });

        ui.add_space(6.0);
        if ui.button("Editar").clicked() {
            action = Some(SearchAction::Edit(record.id().to_string()));
        }

        if let Some(texture) = self
            .image
            .get_or_decode(ui.ctx(), &format!("search_{}", record.id()), &record.image_base64)
        {
            ui.add_space(6.0);
            preview::show(ui, texture, 480.0, 360.0);
        }

        action
    }
}
