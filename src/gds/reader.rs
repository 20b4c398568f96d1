// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::parser::{parse_full, parse_labels, ParseOptions};
use super::{Library, TextLabel};
use crate::error::Result;

/// Opens GDSII files from disk and runs the stream parser on them.
pub struct GdsReader {
    options: ParseOptions,
}

impl GdsReader {
    pub fn new() -> Self {
        Self {
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    fn open(&self, path: &Path) -> Result<BufReader<File>> {
        log::info!("[LOAD] Loading GDSII file: {}", path.display());
        let file = File::open(path)?;
        log::info!("[FILE] GDSII file size: {} bytes", file.metadata()?.len());
        Ok(BufReader::new(file))
    }

    pub fn read_library<P: AsRef<Path>>(&self, path: P) -> Result<Library> {
        let path = path.as_ref();
        let source = self.open(path)?;

        match parse_full(source, &self.options) {
            Ok(library) => {
                let polygons: usize = library.structures.iter().map(|s| s.polygons.len()).sum();
                let labels: usize = library.structures.iter().map(|s| s.labels.len()).sum();
                log::info!(
                    "[PASS] Library {} parsed: {} structures, {polygons} polygons, {labels} labels",
                    library.name,
                    library.structures.len()
                );
                Ok(library)
            }
            Err(e) => {
                log::error!("[FAIL] Failed to parse {}: {e}", path.display());
                Err(e)
            }
        }
    }

    pub fn read_labels<P: AsRef<Path>>(
        &self,
        path: P,
        pattern: Option<&str>,
    ) -> Result<Vec<TextLabel>> {
        let path = path.as_ref();
        let source = self.open(path)?;

        match parse_labels(source, pattern, &self.options) {
            Ok(labels) => {
                log::info!(
                    "[PASS] Extracted {} labels from {}",
                    labels.len(),
                    path.display()
                );
                Ok(labels)
            }
            Err(e) => {
                log::error!("[FAIL] Failed to extract labels from {}: {e}", path.display());
                Err(e)
            }
        }
    }
}

impl Default for GdsReader {
    fn default() -> Self {
        Self::new()
    }
}
