//! Command handlers

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use placaview_app::camera::default_camera;
use placaview_app::config::Config;
use placaview_app::views::{
    fetch_after_exit, EditView, RecordsView, SearchView, UploadOutcome, UploadView, DELETE_CONFIRMATION,
};
use placaview_client::{HttpClient, RecordsApi};
use placaview_types::{Error, OutputFormat, Result};

use crate::cli::{Cli, Commands};
use crate::output::{
    output_message, output_record, output_records, output_upload, save_image,
};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    let output_format = cli.format.unwrap_or(config.output_format);

    if let Commands::Config {
        show,
        set_api_url,
        set_limit,
        set_output,
        set_camera,
        reset,
    } = &cli.command
    {
        return cmd_config(
            &mut config,
            *show,
            set_api_url.clone(),
            *set_limit,
            *set_output,
            *set_camera,
            *reset,
        );
    }

    let client = match cli.api_url {
        Some(ref url) => HttpClient::new(url)?,
        None => config.client()?,
    };
    info!("using backend {}", client.base_url());

    match &cli.command {
        Commands::Upload { image, save_image } => {
            cmd_upload(&client, output_format, image, save_image.as_deref())
        }

        Commands::Capture {
            device,
            save_frame,
            save_image,
        } => cmd_capture(
            &client,
            output_format,
            device.unwrap_or(config.camera_device),
            save_frame.as_deref(),
            save_image.as_deref(),
        ),

        Commands::List { limit } => {
            cmd_list(&client, output_format, limit.unwrap_or(config.list_limit))
        }

        Commands::Get { id, save_image } => {
            let record = with_spinner("Carregando registro...", || client.get(id))?;
            output_record(output_format, &record)?;
            if let Some(path) = save_image {
                self::save_image(&record.image_bytes()?, path)?;
            }
            Ok(())
        }

        Commands::Search { plate, save_image } => {
            cmd_search(&client, output_format, plate, save_image.as_deref())
        }

        Commands::Edit {
            id,
            plate,
            entry,
            exit,
            exit_now,
        } => cmd_edit(
            &client,
            output_format,
            id,
            plate.clone(),
            entry.clone(),
            exit.clone(),
            *exit_now,
        ),

        Commands::Exit { id } => {
            let record = with_spinner("Registrando saída...", || fetch_after_exit(&client, id))?;
            output_record(output_format, &record)
        }

        Commands::Delete { id, yes } => cmd_delete(&client, output_format, id, *yes),

        Commands::Health => {
            let status = client.health()?;
            output_message(
                output_format,
                &format!(
                    "{} ({})",
                    status.status,
                    status.message.as_deref().unwrap_or(client.base_url())
                ),
            );
            Ok(())
        }

        Commands::Clean => {
            let report = with_spinner("Limpando registros...", || client.clean_invalid())?;
            output_message(output_format, &report.message);
            Ok(())
        }

        Commands::Config { .. } => unreachable!("handled above"),
    }
}

/// Run `f` while a spinner is shown on stderr
fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}

/// Turn a finished upload into output, or into the error shown to the user
fn report_upload(
    outcome: Option<UploadOutcome>,
    output_format: OutputFormat,
    save_image_path: Option<&Path>,
) -> Result<()> {
    match outcome {
        Some(UploadOutcome::Recognized(response)) => {
            output_upload(output_format, &response)?;
            if let Some(path) = save_image_path {
                save_image(&response.image_bytes()?, path)?;
            }
            Ok(())
        }
        Some(UploadOutcome::NotFound(message)) | Some(UploadOutcome::Failed(message)) => {
            Err(Error::Message(message))
        }
        None => Err(Error::InvalidInput("nothing to upload".to_string())),
    }
}

fn cmd_upload(
    client: &dyn RecordsApi,
    output_format: OutputFormat,
    image: &Path,
    save_image_path: Option<&Path>,
) -> Result<()> {
    if !image.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("file not found: {}", image.display()),
        )));
    }

    let mut view = UploadView::new(default_camera(0));
    if !view.select_file(image) {
        let message = view.error().unwrap_or("Erro ao processar imagem").to_string();
        return Err(Error::Message(message));
    }

    let outcome = with_spinner("Processando imagem...", || view.submit(client));
    report_upload(outcome, output_format, save_image_path)
}

fn cmd_capture(
    client: &dyn RecordsApi,
    output_format: OutputFormat,
    device: usize,
    save_frame: Option<&Path>,
    save_image_path: Option<&Path>,
) -> Result<()> {
    let mut view = UploadView::new(default_camera(device));

    if !view.open_camera() || !view.capture() {
        let message = view.error().unwrap_or("Erro ao acessar a câmera").to_string();
        return Err(Error::Message(message));
    }

    if let (Some(path), Some(frame)) = (save_frame, view.flow().captured_frame()) {
        frame.save(path)?;
        eprintln!("Quadro salvo em {}", path.display());
    }

    let outcome = with_spinner("Processando imagem...", || view.submit(client));
    report_upload(outcome, output_format, save_image_path)
}

fn cmd_list(client: &dyn RecordsApi, output_format: OutputFormat, limit: u32) -> Result<()> {
    let mut view = RecordsView::new(limit);
    with_spinner("Carregando registros...", || view.load(client));

    if let Some(error) = view.error() {
        return Err(Error::Message(error.to_string()));
    }
    output_records(
        output_format,
        view.records(),
        &view.summary(),
        view.empty_message(),
    )
}

fn cmd_search(
    client: &dyn RecordsApi,
    output_format: OutputFormat,
    plate: &str,
    save_image_path: Option<&Path>,
) -> Result<()> {
    let mut view = SearchView::new();
    view.set_query(plate);
    with_spinner("Buscando placa...", || view.search(client));

    if let Some(error) = view.error() {
        return Err(Error::Message(error.to_string()));
    }
    let Some(record) = view.result() else {
        return Err(Error::Message("Digite a placa (ex: ABC-1234)".to_string()));
    };

    output_record(output_format, record)?;
    if let Some(path) = save_image_path {
        save_image(&record.image_bytes()?, path)?;
    }
    Ok(())
}

fn cmd_edit(
    client: &dyn RecordsApi,
    output_format: OutputFormat,
    id: &str,
    plate: Option<String>,
    entry: Option<String>,
    exit: Option<String>,
    exit_now: bool,
) -> Result<()> {
    let mut view = EditView::new(id);
    with_spinner("Carregando registro...", || view.load(client));
    if view.record().is_none() {
        let message = view
            .error()
            .or(view.not_found_message())
            .unwrap_or("Erro ao carregar registro");
        return Err(Error::Message(message.to_string()));
    }

    if plate.is_none() && entry.is_none() && exit.is_none() && !exit_now {
        return Err(Error::InvalidInput(
            "nothing to change (use --plate, --entry, --exit or --exit-now)".to_string(),
        ));
    }

    let form = view.form_mut();
    if let Some(plate) = plate {
        form.plate = plate;
    }
    if let Some(entry) = entry {
        form.entry_time = entry;
    }
    if let Some(exit) = exit {
        form.exit_time = exit;
    }
    if exit_now {
        view.set_exit_now();
    }

    let redirect = with_spinner("Salvando...", || view.save(client));
    match (redirect, view.record()) {
        (Some(_), Some(record)) => {
            output_message(output_format, view.success().unwrap_or_default());
            output_record(output_format, record)
        }
        _ => Err(Error::Message(
            view.error().unwrap_or("Erro ao atualizar registro").to_string(),
        )),
    }
}

fn cmd_delete(client: &dyn RecordsApi, output_format: OutputFormat, id: &str, yes: bool) -> Result<()> {
    if !yes && !confirm(DELETE_CONFIRMATION)? {
        output_message(output_format, "Cancelado.");
        return Ok(());
    }

    match client.delete(id) {
        Ok(response) => {
            output_message(output_format, &response.message);
            Ok(())
        }
        Err(e) => {
            log::error!("failed to delete {}: {}", id, e);
            Err(e)
        }
    }
}

/// Ask a yes/no question on stdin
fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [s/N] ", question);
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    ))
}

fn cmd_config(
    config: &mut Config,
    show: bool,
    set_api_url: Option<String>,
    set_limit: Option<u32>,
    set_output: Option<OutputFormat>,
    set_camera: Option<usize>,
    reset: bool,
) -> Result<()> {
    if reset {
        *config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults.");
        return Ok(());
    }

    let mut modified = false;

    if let Some(url) = set_api_url {
        // Reject URLs the client would refuse later
        HttpClient::new(&url)?;
        config.api_url = url.trim().trim_end_matches('/').to_string();
        modified = true;
    }
    if let Some(limit) = set_limit {
        if limit == 0 {
            return Err(Error::InvalidInput("limit must be at least 1".to_string()));
        }
        config.list_limit = limit;
        modified = true;
    }
    if let Some(format) = set_output {
        config.output_format = format;
        modified = true;
    }
    if let Some(camera) = set_camera {
        config.camera_device = camera;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration saved.");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use placaview_types::{
        CleanupReport, DeleteResponse, ExitResponse, HealthStatus, PlateRecord, PlateUpdate,
        UploadPayload, UploadResponse,
    };

    /// Backend double where every request fails the same way
    struct FailingApi(fn() -> Error);

    impl FailingApi {
        fn missing() -> Self {
            Self(|| Error::NotFound(String::new()))
        }

        fn unreachable() -> Self {
            Self(|| Error::Transport("connection refused".to_string()))
        }

        fn fail<T>(&self) -> Result<T> {
            Err((self.0)())
        }
    }

    impl RecordsApi for FailingApi {
        fn upload(&self, _payload: &UploadPayload) -> Result<UploadResponse> {
            self.fail()
        }
        fn list(&self, _limit: u32) -> Result<Vec<PlateRecord>> {
            self.fail()
        }
        fn get(&self, _id: &str) -> Result<PlateRecord> {
            self.fail()
        }
        fn search(&self, _plate: &str) -> Result<PlateRecord> {
            self.fail()
        }
        fn update(&self, _id: &str, _update: &PlateUpdate) -> Result<PlateRecord> {
            self.fail()
        }
        fn delete(&self, _id: &str) -> Result<DeleteResponse> {
            self.fail()
        }
        fn register_exit(&self, _id: &str) -> Result<ExitResponse> {
            self.fail()
        }
        fn health(&self) -> Result<HealthStatus> {
            self.fail()
        }
        fn clean_invalid(&self) -> Result<CleanupReport> {
            self.fail()
        }
    }

    fn shown(result: Result<()>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_missing_plate_message_is_shown_as_is() {
        let result = cmd_search(&FailingApi::missing(), OutputFormat::Table, "abc1d23", None);

        assert_eq!(shown(result), "A placa ABC1D23 não foi encontrada no sistema.");
    }

    #[test]
    fn test_list_failure_message_is_shown_as_is() {
        let result = cmd_list(&FailingApi::unreachable(), OutputFormat::Table, 10);

        assert_eq!(shown(result), "Erro ao carregar registros");
    }

    #[test]
    fn test_edit_reports_load_failure() {
        let result = cmd_edit(
            &FailingApi::unreachable(),
            OutputFormat::Table,
            "66b1",
            Some("ABC1D23".to_string()),
            None,
            None,
            false,
        );

        assert_eq!(shown(result), "Erro ao carregar registro");
    }

    #[test]
    fn test_edit_reports_missing_record() {
        let result = cmd_edit(
            &FailingApi::missing(),
            OutputFormat::Table,
            "66b1",
            None,
            None,
            None,
            true,
        );

        assert_eq!(shown(result), "Registro não encontrado.");
    }

    #[test]
    fn test_upload_without_plate_is_shown_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("car.png");
        image::RgbImage::new(4, 4).save(&path).unwrap();

        let result = cmd_upload(&FailingApi::missing(), OutputFormat::Table, &path, None);

        assert_eq!(shown(result), "Nenhuma placa reconhecida na imagem");
    }
}
