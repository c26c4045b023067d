//! Output formatting module

use std::path::Path;

use placaview_types::{OutputFormat, PlateRecord, Result, UploadResponse};
use serde::Serialize;

/// Record as printed in JSON mode (the image is left out)
#[derive(Serialize)]
struct RecordSummary<'a> {
    id: &'a str,
    plate: &'a str,
    entry_time: &'a str,
    exit_time: Option<&'a str>,
    filename: &'a str,
}

impl<'a> From<&'a PlateRecord> for RecordSummary<'a> {
    fn from(record: &'a PlateRecord) -> Self {
        Self {
            id: record.id(),
            plate: &record.plate,
            entry_time: &record.entry_time,
            exit_time: record.exit_time.as_deref().filter(|t| !t.is_empty()),
            filename: &record.filename,
        }
    }
}

pub fn output_record(output_format: OutputFormat, record: &PlateRecord) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&RecordSummary::from(record))?);
        return Ok(());
    }

    println!("\nRegistro");
    println!("========");
    println!("ID:       {}", record.id());
    println!("Placa:    {}", record.plate);
    println!("Entrada:  {}", record.entry_time);
    println!("Saída:    {}", record.exit_label());
    if !record.filename.is_empty() {
        println!("Arquivo:  {}", record.filename);
    }
    Ok(())
}

pub fn output_records(
    output_format: OutputFormat,
    records: &[PlateRecord],
    summary: &str,
    empty_message: Option<&str>,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        let rows: Vec<RecordSummary> = records.iter().map(RecordSummary::from).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{}", summary);
    if let Some(message) = empty_message {
        println!("{}", message);
        return Ok(());
    }

    println!();
    println!("{:<26} {:<10} {:<20} {}", "ID", "Placa", "Entrada", "Saída");
    println!("{}", "-".repeat(80));
    for record in records {
        println!(
            "{:<26} {:<10} {:<20} {}",
            record.id(),
            record.plate,
            record.entry_time,
            record.exit_label()
        );
    }
    Ok(())
}

pub fn output_upload(output_format: OutputFormat, response: &UploadResponse) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({
                "id": response.id,
                "plate": response.plate,
                "success": response.success,
                "message": response.message_or_default(),
                "image_url": response.image_url,
            })
        );
        return Ok(());
    }

    println!("Placa Detectada: {}", response.plate);
    println!("{}", response.message_or_default());
    if let Some(ref id) = response.id {
        println!("ID: {}", id);
    }
    Ok(())
}

/// Plain status line, or `{"message": ...}` in JSON mode
pub fn output_message(output_format: OutputFormat, message: &str) {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{}", message);
    }
}

pub fn save_image(bytes: &[u8], path: &Path) -> Result<()> {
    std::fs::write(path, bytes)?;
    eprintln!("Imagem salva em {}", path.display());
    Ok(())
}
