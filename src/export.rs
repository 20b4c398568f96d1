// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::Write;

use crate::gds::{Library, Structure, TextLabel};

#[derive(Debug, Serialize)]
pub struct LabelCsvRecord<'a> {
    #[serde(rename = "File", skip_serializing_if = "Option::is_none")]
    pub file: Option<&'a str>,
    #[serde(rename = "Text")]
    pub text: &'a str,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Layer")]
    pub layer: u16,
    #[serde(rename = "TextType")]
    pub text_type: u16,
}

#[derive(Debug, Serialize)]
pub struct StructureCsvRecord {
    #[serde(rename = "Structure")]
    pub name: String,
    #[serde(rename = "Polygons")]
    pub polygons: usize,
    #[serde(rename = "Labels")]
    pub labels: usize,
    #[serde(rename = "Bounds")]
    pub bounds: String,
    #[serde(rename = "Area")]
    pub area: f64,
}

const LABEL_HEADERS: [&str; 5] = ["Text", "X", "Y", "Layer", "TextType"];
const STRUCTURE_HEADERS: [&str; 5] = ["Structure", "Polygons", "Labels", "Bounds", "Area"];

/// Writer whose header row is written up front, so an empty export
/// still names its columns.
fn writer_with_headers<W: Write>(writer: W, headers: &[&str]) -> csv::Result<Writer<W>> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(headers)?;
    Ok(writer)
}

fn label_to_csv_record<'a>(file: Option<&'a str>, label: &'a TextLabel) -> LabelCsvRecord<'a> {
    LabelCsvRecord {
        file,
        text: &label.string,
        x: label.x,
        y: label.y,
        layer: label.layer,
        text_type: label.text_type,
    }
}

/// Convert a Structure to a StructureCsvRecord
fn structure_to_csv_record(structure: &Structure) -> StructureCsvRecord {
    let (bounds, area) = match structure.bounds {
        Some(b) => (
            format!(
                "({:.3}, {:.3}) - ({:.3}, {:.3})",
                b.min_x, b.min_y, b.max_x, b.max_y
            ),
            b.width() * b.height(),
        ),
        None => (String::new(), 0.0),
    };
    StructureCsvRecord {
        name: structure.name.clone(),
        polygons: structure.polygons.len(),
        labels: structure.labels.len(),
        bounds,
        area,
    }
}

/// Write labels as CSV with a header row
pub fn write_labels_csv<W: Write>(
    writer: W,
    labels: &[TextLabel],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = writer_with_headers(writer, &LABEL_HEADERS)?;
    for label in labels {
        writer.serialize(label_to_csv_record(None, label))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write labels from several files, prefixing each row with its file name
pub fn write_sourced_labels_csv<W: Write>(
    writer: W,
    labels: &[(String, TextLabel)],
) -> Result<(), Box<dyn std::error::Error>> {
    let headers: Vec<&str> = std::iter::once("File").chain(LABEL_HEADERS).collect();
    let mut writer = writer_with_headers(writer, &headers)?;
    for (file, label) in labels {
        writer.serialize(label_to_csv_record(Some(file.as_str()), label))?;
    }
    writer.flush()?;
    Ok(())
}

/// Export labels to CSV file
pub fn export_labels_to_csv(
    labels: &[TextLabel],
    file_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    write_labels_csv(File::create(file_path)?, labels)
}

/// Export a per-structure summary of the library to CSV file
pub fn export_structures_to_csv(
    library: &Library,
    file_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(file_path)?;
    let mut writer = writer_with_headers(file, &STRUCTURE_HEADERS)?;

    for structure in &library.structures {
        writer.serialize(structure_to_csv_record(structure))?;
    }

    writer.flush()?;
    Ok(())
}
