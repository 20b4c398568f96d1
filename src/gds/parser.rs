// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! GDSII record dispatcher
//!
//! A single state machine walks the record stream
//! (library → structure → element) and reports geometry and labels to a
//! [`Sink`]. Full import and label extraction differ only in the sink.

use std::io::Read;

use super::record::{Record, RecordReader};
use super::record_type::{self, *};
use super::sink::{GeometrySink, LabelColumns, LabelFilter, LabelSink, Sink};
use super::{GdsDate, Library, Point, Polygon, TextLabel, UnitsFactor};
use crate::error::{GdsError, Result};

/// Database-to-user scale applied when nothing else is configured.
pub const DEFAULT_SCALE: f64 = 0.001;

/// How raw database coordinates become user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateScale {
    /// Multiply every coordinate by a fixed factor.
    Fixed(f64),
    /// Use the library's UNITS record (user units per database unit),
    /// falling back to [`DEFAULT_SCALE`] until UNITS is seen.
    LibraryUnits,
}

impl Default for CoordinateScale {
    fn default() -> Self {
        CoordinateScale::Fixed(DEFAULT_SCALE)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub scale: CoordinateScale,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale(mut self, scale: CoordinateScale) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Boundary,
    Path,
    Text,
    /// SREF, AREF, BOX or NODE: tracked for scoping, contents ignored.
    Skipped(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Idle,
    Library,
    Structure,
    Element(ElementKind),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Scope and pending attributes carried between records.
#[derive(Debug)]
pub struct ParseState {
    scope: Scope,
    scale_mode: CoordinateScale,
    scale: f64,
    layer: u16,
    text_type: u16,
    position: (f64, f64),
    text_in_progress: bool,
    element_points: usize,
}

impl ParseState {
    pub fn new(options: &ParseOptions) -> Self {
        let scale = match options.scale {
            CoordinateScale::Fixed(factor) => factor,
            CoordinateScale::LibraryUnits => DEFAULT_SCALE,
        };
        Self {
            scope: Scope::Idle,
            scale_mode: options.scale,
            scale,
            layer: 0,
            text_type: 0,
            position: (0.0, 0.0),
            text_in_progress: false,
            element_points: 0,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    fn expect_scope(&self, record: &Record<'_>, expected: Scope) -> Result<()> {
        if self.scope == expected {
            Ok(())
        } else {
            Err(GdsError::protocol(
                record.offset,
                record.record_type(),
                format!(
                    "{} not allowed in {:?} scope",
                    record_type::name(record.record_type()),
                    self.scope
                ),
            ))
        }
    }

    fn apply<S: Sink>(&mut self, record: &Record<'_>, sink: &mut S) -> Result<Flow> {
        let kind = record.record_type();
        log::trace!(
            "{} (0x{:02X}) at offset {}, {} elements",
            record_type::name(kind),
            kind,
            record.offset,
            record.element_count
        );

        match kind {
            HEADER => match record.first_u16().ok().and_then(|v| i16::try_from(v).ok()) {
                Some(version) => sink.header(version),
                None => log::warn!(
                    "HEADER at offset {} has no readable version, ignored",
                    record.offset
                ),
            },
            BGNLIB => {
                self.expect_scope(record, Scope::Idle)?;
                let (modified, accessed) = read_dates(record)?;
                sink.begin_library(modified, accessed);
                self.scope = Scope::Library;
            }
            LIBNAME => {
                self.expect_scope(record, Scope::Library)?;
                sink.library_name(record.ascii()?);
            }
            UNITS => {
                self.expect_scope(record, Scope::Library)?;
                let units = read_units(record)?;
                if self.scale_mode == CoordinateScale::LibraryUnits {
                    self.scale = units.user_to_db;
                }
                sink.units(units);
            }
            ENDLIB => {
                self.expect_scope(record, Scope::Library)?;
                sink.end_library();
                self.scope = Scope::Finished;
                return Ok(Flow::Stop);
            }
            BGNSTR => {
                self.expect_scope(record, Scope::Library)?;
                let (modified, accessed) = read_dates(record)?;
                sink.begin_structure(modified, accessed);
                self.scope = Scope::Structure;
            }
            STRNAME => {
                self.expect_scope(record, Scope::Structure)?;
                sink.structure_name(record.ascii()?);
            }
            ENDSTR => {
                self.expect_scope(record, Scope::Structure)?;
                sink.end_structure();
                self.scope = Scope::Library;
            }
            BOUNDARY => self.open_element(record, ElementKind::Boundary)?,
            PATH => self.open_element(record, ElementKind::Path)?,
            TEXT => self.open_element(record, ElementKind::Text)?,
            SREF | AREF | BOX | NODE => self.open_element(record, ElementKind::Skipped(kind))?,
            LAYER => match self.scope {
                Scope::Element(ElementKind::Skipped(_)) => {}
                Scope::Element(_) => self.layer = record.first_u16()?,
                _ => ignore(record),
            },
            TEXTTYPE => match self.scope {
                Scope::Element(ElementKind::Text) => self.text_type = record.first_u16()?,
                _ => ignore(record),
            },
            XY => match self.scope {
                Scope::Element(ElementKind::Boundary | ElementKind::Path) => {
                    self.add_outline(record, sink)?
                }
                Scope::Element(ElementKind::Text) => {
                    if let Some(&first) = read_points(record)?.first() {
                        self.position = self.scaled(first);
                    }
                }
                Scope::Element(ElementKind::Skipped(_)) => {}
                _ => ignore(record),
            },
            STRING => {
                if self.text_in_progress {
                    sink.label(TextLabel {
                        string: record.ascii()?,
                        x: self.position.0,
                        y: self.position.1,
                        layer: self.layer,
                        text_type: self.text_type,
                    });
                } else {
                    ignore(record);
                }
                self.text_in_progress = false;
            }
            ENDEL => self.close_element(record)?,
            _ => log::debug!(
                "skipping {} record 0x{:02X} ({} bytes) at offset {}",
                record_type::name(kind),
                kind,
                record.header.length,
                record.offset
            ),
        }

        Ok(Flow::Continue)
    }

    fn open_element(&mut self, record: &Record<'_>, kind: ElementKind) -> Result<()> {
        match self.scope {
            Scope::Structure => {}
            Scope::Element(_) => {
                return Err(GdsError::NestedElement {
                    offset: record.offset,
                    record_type: record.record_type(),
                })
            }
            _ => {
                return Err(GdsError::protocol(
                    record.offset,
                    record.record_type(),
                    format!("element opened in {:?} scope", self.scope),
                ))
            }
        }

        self.layer = 0;
        self.element_points = 0;
        if kind == ElementKind::Text {
            self.text_in_progress = true;
            self.text_type = 0;
            self.position = (0.0, 0.0);
        }
        self.scope = Scope::Element(kind);
        Ok(())
    }

    fn close_element(&mut self, record: &Record<'_>) -> Result<()> {
        match self.scope {
            Scope::Element(ElementKind::Boundary | ElementKind::Path) if self.element_points == 0 => {
                return Err(GdsError::EmptyElement {
                    offset: record.offset,
                    record_type: record.record_type(),
                })
            }
            Scope::Element(_) => {}
            _ => {
                log::warn!(
                    "ENDEL at offset {} without an open element, ignored",
                    record.offset
                );
                return Ok(());
            }
        }

        self.scope = Scope::Structure;
        self.element_points = 0;
        self.text_in_progress = false;
        Ok(())
    }

    /// Close, orient and emit the outline carried by an XY record.
    fn add_outline<S: Sink>(&mut self, record: &Record<'_>, sink: &mut S) -> Result<()> {
        let mut points = read_points(record)?;
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.is_empty() {
            return Ok(());
        }

        let mut polygon = Polygon {
            layer: self.layer,
            points: points.iter().map(|&p| self.scaled(p)).collect(),
        };
        if polygon.signed_area() < 0.0 {
            polygon.points.reverse();
        }

        self.element_points += points.len();
        sink.polygon(polygon);
        Ok(())
    }

    fn scaled(&self, point: Point) -> (f64, f64) {
        (f64::from(point.x) * self.scale, f64::from(point.y) * self.scale)
    }
}

fn ignore(record: &Record<'_>) {
    log::debug!(
        "{} at offset {} outside of an element, ignored",
        record_type::name(record.record_type()),
        record.offset
    );
}

fn read_dates(record: &Record<'_>) -> Result<(GdsDate, GdsDate)> {
    let invalid = || GdsError::DateFormat {
        offset: record.offset,
        record_type: record.record_type(),
        length: record.payload.len(),
    };
    if record.payload.len() != 24 {
        return Err(invalid());
    }
    let fields = record.i16s()?;
    let modified = GdsDate::from_fields(&fields[..6]).ok_or_else(invalid)?;
    let accessed = GdsDate::from_fields(&fields[6..]).ok_or_else(invalid)?;
    Ok((modified, accessed))
}

fn read_units(record: &Record<'_>) -> Result<UnitsFactor> {
    match record.sems()?.as_slice() {
        &[user_to_db, db_to_metric] => Ok(UnitsFactor {
            user_to_db,
            db_to_metric,
        }),
        values => Err(GdsError::protocol(
            record.offset,
            record.record_type(),
            format!("UNITS carries {} reals, expected 2", values.len()),
        )),
    }
}

fn read_points(record: &Record<'_>) -> Result<Vec<Point>> {
    let values = record.i32s()?;
    if values.len() % 2 != 0 {
        return Err(GdsError::MalformedLength {
            offset: record.offset,
            record_type: record.record_type(),
            length: record.payload.len(),
            element_size: 8,
        });
    }
    Ok(values
        .chunks_exact(2)
        .map(|pair| Point {
            x: pair[0],
            y: pair[1],
        })
        .collect())
}

/// Drives a [`RecordReader`] through the state machine into a sink.
pub struct RecordDispatcher<R: Read, S: Sink> {
    reader: RecordReader<R>,
    state: ParseState,
    sink: S,
}

impl<R: Read, S: Sink> RecordDispatcher<R, S> {
    pub fn new(source: R, sink: S, options: &ParseOptions) -> Self {
        Self {
            reader: RecordReader::new(source),
            state: ParseState::new(options),
            sink,
        }
    }

    /// Consume records until ENDLIB or the end of the source.
    pub fn run(mut self) -> Result<S::Output> {
        while let Some(record) = self.reader.next_record()? {
            if self.state.apply(&record, &mut self.sink)? == Flow::Stop {
                log::debug!("library closed after {} bytes", self.reader.offset());
                return Ok(self.sink.finish());
            }
        }
        self.end_of_stream()
    }

    fn end_of_stream(self) -> Result<S::Output> {
        let scope = self.state.scope();
        if S::ACCEPTS_OPEN_END && scope == Scope::Library {
            log::debug!(
                "stream ended in {scope:?} scope after {} bytes",
                self.reader.offset()
            );
            return Ok(self.sink.finish());
        }
        Err(GdsError::TruncatedStream {
            offset: self.reader.offset(),
            context: format!("stream ended in {scope:?} scope before ENDLIB"),
        })
    }
}

/// Read a complete library with geometry and bounding boxes.
pub fn parse_full<R: Read>(source: R, options: &ParseOptions) -> Result<Library> {
    RecordDispatcher::new(source, GeometrySink::new(), options).run()
}

/// Extract labels as parallel columns.
pub fn parse_label_columns<R: Read>(
    source: R,
    pattern: Option<&str>,
    options: &ParseOptions,
) -> Result<LabelColumns> {
    let filter = LabelFilter::new(pattern)?;
    RecordDispatcher::new(source, LabelSink::new(filter), options).run()
}

/// Extract the filtered, deduplicated text labels of every structure.
pub fn parse_labels<R: Read>(
    source: R,
    pattern: Option<&str>,
    options: &ParseOptions,
) -> Result<Vec<TextLabel>> {
    Ok(parse_label_columns(source, pattern, options)?.into_labels())
}
