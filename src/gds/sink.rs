// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Event consumers for the record dispatcher
//!
//! The dispatcher runs one state machine and reports what it finds to a
//! [`Sink`]. [`GeometrySink`] builds the library tree, [`LabelSink`] keeps a
//! flat, filtered table of text labels.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{enlarge, GdsDate, Library, Polygon, Structure, TextLabel, UnitsFactor};
use crate::error::Result;

/// Receiver for parse events. Every method defaults to a no-op so a sink
/// only handles what it cares about.
pub trait Sink {
    type Output;

    /// Whether the stream may end after all scopes closed without ENDLIB.
    const ACCEPTS_OPEN_END: bool = false;

    fn header(&mut self, _version: i16) {}
    fn begin_library(&mut self, _modified: GdsDate, _accessed: GdsDate) {}
    fn library_name(&mut self, _name: String) {}
    fn units(&mut self, _units: UnitsFactor) {}
    fn begin_structure(&mut self, _modified: GdsDate, _accessed: GdsDate) {}
    fn structure_name(&mut self, _name: String) {}
    fn polygon(&mut self, _polygon: Polygon) {}
    fn label(&mut self, _label: TextLabel) {}
    fn end_structure(&mut self) {}
    fn end_library(&mut self) {}

    fn finish(self) -> Self::Output;
}

/// Builds the full [`Library`] model.
#[derive(Debug, Default)]
pub struct GeometrySink {
    library: Library,
    current: Option<Structure>,
}

impl GeometrySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for GeometrySink {
    type Output = Library;

    fn header(&mut self, version: i16) {
        self.library.version = Some(version);
    }

    fn begin_library(&mut self, modified: GdsDate, accessed: GdsDate) {
        self.library.modified = modified;
        self.library.accessed = accessed;
    }

    fn library_name(&mut self, name: String) {
        self.library.name = name;
    }

    fn units(&mut self, units: UnitsFactor) {
        self.library.units = Some(units);
    }

    fn begin_structure(&mut self, modified: GdsDate, accessed: GdsDate) {
        self.current = Some(Structure {
            modified,
            accessed,
            ..Structure::default()
        });
    }

    fn structure_name(&mut self, name: String) {
        if let Some(structure) = self.current.as_mut() {
            structure.name = name;
        }
    }

    fn polygon(&mut self, polygon: Polygon) {
        if let Some(structure) = self.current.as_mut() {
            enlarge(&mut structure.bounds, polygon.bounding_box());
            structure.polygons.push(polygon);
        }
    }

    fn label(&mut self, label: TextLabel) {
        if let Some(structure) = self.current.as_mut() {
            structure.labels.push(label);
        }
    }

    fn end_structure(&mut self) {
        if let Some(structure) = self.current.take() {
            log::debug!(
                "structure {} closed: {} polygons, {} labels",
                structure.name,
                structure.polygons.len(),
                structure.labels.len()
            );
            enlarge(&mut self.library.bounds, structure.bounds);
            self.library.structures.push(structure);
        }
    }

    fn finish(self) -> Library {
        self.library
    }
}

/// Label acceptance rule.
///
/// An empty pattern accepts everything, a one-character pattern accepts
/// labels whose first character equals it, and anything longer is a
/// regular expression searched anywhere in the label.
#[derive(Debug, Clone)]
pub enum LabelFilter {
    All,
    FirstChar(char),
    Pattern(Regex),
}

impl LabelFilter {
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern.unwrap_or("");
        let mut chars = pattern.chars();
        Ok(match (chars.next(), chars.next()) {
            (None, _) => LabelFilter::All,
            (Some(c), None) => LabelFilter::FirstChar(c),
            _ => LabelFilter::Pattern(Regex::new(pattern)?),
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            LabelFilter::All => true,
            LabelFilter::FirstChar(c) => text.starts_with(*c),
            LabelFilter::Pattern(re) => re.is_match(text),
        }
    }
}

/// Column-oriented label table. All five columns always have equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelColumns {
    strings: Vec<String>,
    xs: Vec<f64>,
    ys: Vec<f64>,
    layers: Vec<u16>,
    text_types: Vec<u16>,
}

impl LabelColumns {
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn layers(&self) -> &[u16] {
        &self.layers
    }

    pub fn text_types(&self) -> &[u16] {
        &self.text_types
    }

    pub fn contains(&self, label: &TextLabel) -> bool {
        (0..self.len()).any(|i| {
            self.xs[i] == label.x
                && self.ys[i] == label.y
                && self.layers[i] == label.layer
                && self.text_types[i] == label.text_type
                && self.strings[i] == label.string
        })
    }

    fn push(&mut self, label: TextLabel) {
        self.xs.push(label.x);
        self.ys.push(label.y);
        self.layers.push(label.layer);
        self.text_types.push(label.text_type);
        self.strings.push(label.string);
    }

    pub fn get(&self, index: usize) -> Option<TextLabel> {
        Some(TextLabel {
            string: self.strings.get(index)?.clone(),
            x: self.xs[index],
            y: self.ys[index],
            layer: self.layers[index],
            text_type: self.text_types[index],
        })
    }

    pub fn into_labels(self) -> Vec<TextLabel> {
        let LabelColumns {
            strings,
            xs,
            ys,
            layers,
            text_types,
        } = self;
        strings
            .into_iter()
            .zip(xs)
            .zip(ys)
            .zip(layers)
            .zip(text_types)
            .map(|((((string, x), y), layer), text_type)| TextLabel {
                string,
                x,
                y,
                layer,
                text_type,
            })
            .collect()
    }
}

/// Collects filtered, deduplicated labels across every structure.
#[derive(Debug)]
pub struct LabelSink {
    filter: LabelFilter,
    columns: LabelColumns,
}

impl LabelSink {
    pub fn new(filter: LabelFilter) -> Self {
        Self {
            filter,
            columns: LabelColumns::default(),
        }
    }
}

impl Sink for LabelSink {
    type Output = LabelColumns;

    const ACCEPTS_OPEN_END: bool = true;

    fn label(&mut self, label: TextLabel) {
        if !self.filter.matches(&label.string) {
            return;
        }
        if self.columns.contains(&label) {
            log::debug!("duplicate label {} dropped", label.string);
            return;
        }
        self.columns.push(label);
    }

    fn finish(self) -> LabelColumns {
        self.columns
    }
}
