//! Main application structure with tab navigation

use std::sync::Arc;
use std::time::Instant;

use eframe::egui;
use log::{error, info};
use placaview_app::config::Config;
use placaview_app::views::{Redirect, Route};
use placaview_client::{HttpClient, RecordsApi};

use crate::edit_panel::{EditAction, EditPanel};
use crate::records_panel::{RecordsAction, RecordsPanel};
use crate::search_panel::{SearchAction, SearchPanel};
use crate::settings_panel::SettingsPanel;
use crate::upload_panel::UploadPanel;

/// Application tab selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Upload,
    Records,
    Search,
    Settings,
}

impl Tab {
    /// Get the Portuguese label for this tab
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Upload => "Enviar",
            Tab::Records => "Registros",
            Tab::Search => "Buscar",
            Tab::Settings => "Configurações",
        }
    }
}

/// Main application state
pub struct PlacaViewApp {
    /// Currently selected tab
    current_tab: Tab,
    upload_panel: UploadPanel,
    records_panel: RecordsPanel,
    search_panel: SearchPanel,
    settings_panel: SettingsPanel,
    /// Open edit view; shown instead of the current tab
    edit_panel: Option<EditPanel>,
    /// Navigation waiting for its delay to pass
    pending_redirect: Option<(Route, Instant)>,
    config: Config,
    api: Arc<dyn RecordsApi>,
}

impl PlacaViewApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.interaction.tooltip_delay = 0.5;
        style.animation_time = 0.1;
        cc.egui_ctx.set_style(style);

        let config = Config::load().unwrap_or_else(|e| {
            error!("failed to load configuration, using defaults: {}", e);
            Config::default()
        });
        let api = Self::build_client(&config);

        Self {
            current_tab: Tab::default(),
            upload_panel: UploadPanel::new(config.camera_device),
            records_panel: RecordsPanel::new(config.list_limit),
            search_panel: SearchPanel::new(),
            settings_panel: SettingsPanel::new(&config),
            edit_panel: None,
            pending_redirect: None,
            config,
            api,
        }
    }

    /// Client for the configured URL, or the default one if it is unusable
    fn build_client(config: &Config) -> Arc<dyn RecordsApi> {
        let client = config.client().unwrap_or_else(|e| {
            error!("invalid API URL, using the default backend: {}", e);
            HttpClient::default()
        });
        info!("using backend {}", client.base_url());
        Arc::new(client)
    }

    fn open_edit(&mut self, id: String) {
        if self.edit_panel.as_ref().map(|p| p.id()) != Some(id.as_str()) {
            self.edit_panel = Some(EditPanel::new(id));
        }
        self.pending_redirect = None;
    }

    fn navigate(&mut self, route: Route) {
        match route {
            Route::Upload => self.current_tab = Tab::Upload,
            Route::Records => {
                self.current_tab = Tab::Records;
                self.records_panel.refresh();
            }
            Route::Search => self.current_tab = Tab::Search,
            Route::Edit(id) => {
                self.open_edit(id);
                return;
            }
        }
        self.edit_panel = None;
    }

    fn schedule(&mut self, redirect: Redirect) {
        self.pending_redirect = Some((redirect.to, Instant::now() + redirect.after));
    }

    fn check_redirect(&mut self, ctx: &egui::Context) {
        let Some(at) = self.pending_redirect.as_ref().map(|(_, at)| *at) else {
            return;
        };
        let now = Instant::now();
        if now >= at {
            if let Some((route, _)) = self.pending_redirect.take() {
                self.navigate(route);
            }
        } else {
            ctx.request_repaint_after(at - now);
        }
    }

    /// Render the tab bar
    fn render_tab_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;

            for tab in [Tab::Upload, Tab::Records, Tab::Search, Tab::Settings] {
                let selected = self.current_tab == tab && self.edit_panel.is_none();
                if ui.selectable_label(selected, tab.label()).clicked() {
                    self.current_tab = tab;
                    self.edit_panel = None;
                    self.pending_redirect = None;
                }
                ui.add_space(8.0);
            }
        });
    }
}

impl eframe::App for PlacaViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_redirect(ctx);

        // Top panel with tab bar
        egui::TopBottomPanel::top("tab_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_tab_bar(ui);
            ui.add_space(4.0);
        });

        // Central panel with selected tab content
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(panel) = self.edit_panel.as_mut() {
                match panel.ui(ui, &self.api) {
                    Some(EditAction::Back) => self.navigate(Route::Records),
                    Some(EditAction::Redirect(redirect)) => self.schedule(redirect),
                    None => {}
                }
                return;
            }

            match self.current_tab {
                Tab::Upload => {
                    self.upload_panel.ui(ui, &self.api);
                }
                Tab::Records => {
                    if let Some(RecordsAction::Edit(id)) = self.records_panel.ui(ui, &self.api) {
                        self.open_edit(id);
                    }
                }
                Tab::Search => {
                    if let Some(SearchAction::Edit(id)) = self.search_panel.ui(ui, &self.api) {
                        self.open_edit(id);
                    }
                }
                Tab::Settings => {
                    if self.settings_panel.ui(ui, &mut self.config, &self.api) {
                        self.api = Self::build_client(&self.config);
                        self.records_panel.set_limit(self.config.list_limit);
                        self.upload_panel.set_camera(self.config.camera_device);
                    }
                }
            }
        });
    }
}
