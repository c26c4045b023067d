//! Upload panel: submit an image file or a camera frame for recognition

use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText, TextureHandle, Ui};
use placaview_app::camera::default_camera;
use placaview_app::capture::CaptureState;
use placaview_app::views::{UploadOutcome, UploadView};
use placaview_client::RecordsApi;
use placaview_types::{Result, UploadResponse};

use crate::preview::{self, CachedTexture};
use crate::task::{take_result, Task};

/// Image file extensions offered by the file dialog
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff"];

/// How often the live camera preview is refreshed
const PREVIEW_INTERVAL: Duration = Duration::from_millis(100);

pub struct UploadPanel {
    view: UploadView,
    pending: Option<Task<Result<UploadResponse>>>,
    /// Name of the picked file, shown next to the buttons
    picked_name: Option<String>,
    live_preview: Option<TextureHandle>,
    last_preview: Option<Instant>,
    captured_preview: Option<TextureHandle>,
    result_image: CachedTexture,
}

impl UploadPanel {
    pub fn new(camera_device: usize) -> Self {
        Self {
            view: UploadView::new(default_camera(camera_device)),
            pending: None,
            picked_name: None,
            live_preview: None,
            last_preview: None,
            captured_preview: None,
            result_image: CachedTexture::default(),
        }
    }

    /// Switch to another camera device; ignored while an upload is running
    pub fn set_camera(&mut self, camera_device: usize) {
        if self.view.is_uploading() {
            return;
        }
        // Dropping the old view releases its stream
        self.view = UploadView::new(default_camera(camera_device));
        self.clear_previews();
    }

    pub fn ui(&mut self, ui: &mut Ui, api: &Arc<dyn RecordsApi>) {
        self.poll(ui.ctx());

        ui.heading("Enviar imagem");
        ui.add_space(10.0);

        let busy = self.view.is_uploading();
        let state = self.view.flow().state();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!busy, egui::Button::new("Escolher arquivo..."))
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Imagens", IMAGE_EXTENSIONS)
                    .pick_file()
                {
                    self.clear_previews();
                    if self.view.select_file(&path) {
                        self.picked_name = path
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned());
                        self.start_submit(ui.ctx(), api);
                    }
                }
            }

            ui.add_space(8.0);

            if state == CaptureState::CameraOpen {
                if ui.add_enabled(!busy, egui::Button::new("Capturar")).clicked() {
                    self.live_preview = None;
                    if self.view.capture() {
                        if let Some(frame) = self.view.flow().captured_frame() {
                            self.captured_preview =
                                Some(preview::texture_from_image(ui.ctx(), "captured_frame", frame));
                        }
                    }
                }
                if ui.button("Fechar câmera").clicked() {
                    self.view.reset();
                    self.clear_previews();
                }
            } else if ui
                .add_enabled(!busy, egui::Button::new("Abrir câmera"))
                .clicked()
            {
                self.clear_previews();
                self.view.open_camera();
            }
        });

        if let Some(ref name) = self.picked_name {
            ui.label(RichText::new(name).small().color(Color32::GRAY));
        }

        ui.add_space(10.0);

        match state {
            CaptureState::CameraOpen => self.render_live_preview(ui),
            // A failed attempt keeps its image until the operator sends or discards it
            CaptureState::FrameCaptured | CaptureState::Failed if self.view.flow().is_ready() => {
                if let Some(ref texture) = self.captured_preview {
                    preview::show(ui, texture, 480.0, 360.0);
                }
                let label = if state == CaptureState::Failed {
                    "Enviar novamente"
                } else {
                    "Enviar"
                };
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(self.view.can_submit(), egui::Button::new(label))
                        .clicked()
                    {
                        self.start_submit(ui.ctx(), api);
                    }
                    if ui.button("Descartar").clicked() {
                        self.view.reset();
                        self.clear_previews();
                    }
                });
            }
            CaptureState::Submitting => {
                if let Some(ref texture) = self.captured_preview {
                    preview::show(ui, texture, 480.0, 360.0);
                }
            }
            _ => {}
        }

        if busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Processando imagem...");
            });
        }

        if let Some(error) = self.view.error() {
            ui.add_space(10.0);
            ui.label(RichText::new(error).color(Color32::LIGHT_RED));
        }

        self.render_result(ui);
    }

    fn start_submit(&mut self, ctx: &egui::Context, api: &Arc<dyn RecordsApi>) {
        let Some(payload) = self.view.begin_submit() else {
            return;
        };
        log::debug!("submitting {}", payload.describe());
        let api = Arc::clone(api);
        self.pending = Some(Task::spawn(ctx, move || api.upload(&payload)));
    }

    fn poll(&mut self, ctx: &egui::Context) {
        if let Some(result) = take_result(&mut self.pending) {
            let outcome = self.view.finish_submit(result);
            if let UploadOutcome::Recognized(_) = outcome {
                self.captured_preview = None;
                self.result_image.clear();
            }
            ctx.request_repaint();
        }
    }

    fn render_live_preview(&mut self, ui: &mut Ui) {
        let due = self
            .last_preview
            .map_or(true, |at| at.elapsed() >= PREVIEW_INTERVAL);
        if due {
            self.last_preview = Some(Instant::now());
            match self.view.flow_mut().preview_frame() {
                Ok(frame) => {
                    self.live_preview = Some(preview::texture_from_image(ui.ctx(), "live_preview", &frame));
                }
                Err(e) => log::warn!("preview frame failed: {}", e),
            }
        }

        match self.live_preview {
            Some(ref texture) => preview::show(ui, texture, 480.0, 360.0),
            None => {
                ui.spinner();
            }
        }
        ui.ctx().request_repaint_after(PREVIEW_INTERVAL);
    }

    fn render_result(&mut self, ui: &mut Ui) {
        let Some(response) = self.view.result() else {
            return;
        };

        ui.add_space(10.0);
        ui.separator();
        ui.label(RichText::new(format!("Placa Detectada: {}", response.plate)).heading());
        ui.label(RichText::new(response.message_or_default()).color(Color32::LIGHT_GREEN));
        if let Some(ref id) = response.id {
            ui.label(RichText::new(format!("ID: {}", id)).small().color(Color32::GRAY));
        }

        let key = format!(
            "upload_{}",
            response.id.as_deref().unwrap_or(response.plate.as_str())
        );
        if let Some(texture) = self
            .result_image
            .get_or_decode(ui.ctx(), &key, &response.image_base64)
        {
            ui.add_space(6.0);
            preview::show(ui, texture, 480.0, 360.0);
        }
    }

    fn clear_previews(&mut self) {
        self.picked_name = None;
        self.live_preview = None;
        self.last_preview = None;
        self.captured_preview = None;
    }
}
