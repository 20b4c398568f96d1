// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gdsii_reader::{export, CoordinateScale, GdsReader, Library, ParseOptions, TextLabel};
use rayon::prelude::*;

/// GDSII stream reader
#[derive(Parser, Debug)]
#[command(name = "gdsii-reader")]
#[command(about = "Read geometry and text labels from GDSII stream files")]
struct Args {
    /// Factor applied to database coordinates (default 0.001)
    #[arg(
        long,
        global = true,
        env = "GDSII_READER_SCALE",
        conflicts_with = "library_units"
    )]
    scale: Option<f64>,

    /// Scale coordinates by the library's UNITS record instead of a fixed factor
    #[arg(long, global = true)]
    library_units: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text labels as CSV
    Labels {
        /// GDSII files to read; several files are parsed in parallel
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Empty: all labels. One character: labels starting with it.
        /// Longer: regular expression searched in the label text.
        #[arg(short, long)]
        pattern: Option<String>,

        /// Write CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print library metadata and a per-structure summary
    Info {
        file: PathBuf,

        /// Also write the structure summary as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

impl Args {
    fn parse_options(&self) -> ParseOptions {
        let scale = if self.library_units {
            CoordinateScale::LibraryUnits
        } else {
            self.scale
                .map(CoordinateScale::Fixed)
                .unwrap_or_default()
        };
        ParseOptions::new().with_scale(scale)
    }
}

fn run_labels(
    reader: &GdsReader,
    files: &[PathBuf],
    pattern: Option<&str>,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let results: Vec<(String, gdsii_reader::Result<Vec<TextLabel>>)> = files
        .par_iter()
        .map(|path| {
            (
                path.display().to_string(),
                reader.read_labels(path, pattern),
            )
        })
        .collect();

    let mut rows = Vec::new();
    for (file, result) in results {
        let labels = result.map_err(|e| format!("{file}: {e}"))?;
        rows.extend(labels.into_iter().map(|label| (file.clone(), label)));
    }

    match (output, files.len()) {
        (Some(path), 1) => {
            let labels: Vec<TextLabel> = rows.into_iter().map(|(_, label)| label).collect();
            export::export_labels_to_csv(&labels, &path.to_string_lossy())?;
        }
        (Some(path), _) => {
            export::write_sourced_labels_csv(std::fs::File::create(path)?, &rows)?;
        }
        (None, 1) => {
            let labels: Vec<TextLabel> = rows.into_iter().map(|(_, label)| label).collect();
            export::write_labels_csv(io::stdout().lock(), &labels)?;
        }
        (None, _) => {
            export::write_sourced_labels_csv(io::stdout().lock(), &rows)?;
        }
    }
    Ok(())
}

fn print_summary(library: &Library) {
    println!("Library: {}", library.name);
    if let Some(version) = library.version {
        println!("Stream version: {version}");
    }
    match library.units {
        Some(units) => println!(
            "Units: {} user / db unit, {} m / db unit",
            units.user_to_db, units.db_to_metric
        ),
        None => println!("Units: not specified"),
    }
    if let Some(b) = library.bounds {
        println!(
            "Bounds: ({:.3}, {:.3}) - ({:.3}, {:.3})",
            b.min_x, b.min_y, b.max_x, b.max_y
        );
    }
    println!("Structures: {}", library.structures.len());
    for structure in &library.structures {
        println!(
            "  {:<32} {:>8} polygons {:>6} labels",
            structure.name,
            structure.polygons.len(),
            structure.labels.len()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let reader = GdsReader::with_options(args.parse_options());

    match &args.command {
        Command::Labels {
            files,
            pattern,
            output,
        } => run_labels(&reader, files, pattern.as_deref(), output.as_ref()),
        Command::Info { file, csv } => {
            let library = reader.read_library(file)?;
            print_summary(&library);
            if let Some(path) = csv {
                export::export_structures_to_csv(&library, &path.to_string_lossy())?;
            }
            Ok(())
        }
    }
}
