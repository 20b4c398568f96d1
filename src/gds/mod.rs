// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use serde::{Deserialize, Serialize};

/// Record type bytes consumed by the dispatcher.
pub mod record_type {
    pub const HEADER: u8 = 0x00;
    pub const BGNLIB: u8 = 0x01;
    pub const LIBNAME: u8 = 0x02;
    pub const UNITS: u8 = 0x03;
    pub const ENDLIB: u8 = 0x04;
    pub const BGNSTR: u8 = 0x05;
    pub const STRNAME: u8 = 0x06;
    pub const ENDSTR: u8 = 0x07;
    pub const BOUNDARY: u8 = 0x08;
    pub const PATH: u8 = 0x09;
    pub const SREF: u8 = 0x0A;
    pub const AREF: u8 = 0x0B;
    pub const TEXT: u8 = 0x0C;
    pub const LAYER: u8 = 0x0D;
    pub const DATATYPE: u8 = 0x0E;
    pub const WIDTH: u8 = 0x0F;
    pub const XY: u8 = 0x10;
    pub const ENDEL: u8 = 0x11;
    pub const NODE: u8 = 0x15;
    pub const TEXTTYPE: u8 = 0x16;
    pub const STRING: u8 = 0x19;
    pub const BOX: u8 = 0x2D;

    /// Mnemonic used in diagnostics.
    pub fn name(record_type: u8) -> &'static str {
        match record_type {
            HEADER => "HEADER",
            BGNLIB => "BGNLIB",
            LIBNAME => "LIBNAME",
            UNITS => "UNITS",
            ENDLIB => "ENDLIB",
            BGNSTR => "BGNSTR",
            STRNAME => "STRNAME",
            ENDSTR => "ENDSTR",
            BOUNDARY => "BOUNDARY",
            PATH => "PATH",
            SREF => "SREF",
            AREF => "AREF",
            TEXT => "TEXT",
            LAYER => "LAYER",
            DATATYPE => "DATATYPE",
            WIDTH => "WIDTH",
            XY => "XY",
            ENDEL => "ENDEL",
            NODE => "NODE",
            TEXTTYPE => "TEXTTYPE",
            STRING => "STRING",
            BOX => "BOX",
            _ => "unknown",
        }
    }
}

/// Payload encoding declared in the fourth header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataToken {
    NoData,
    BitArray16,
    Int16,
    Int32,
    Real4,
    Sem8,
    AsciiString,
}

impl DataToken {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(DataToken::NoData),
            0x01 => Some(DataToken::BitArray16),
            0x02 => Some(DataToken::Int16),
            0x03 => Some(DataToken::Int32),
            0x04 => Some(DataToken::Real4),
            0x05 => Some(DataToken::Sem8),
            0x06 => Some(DataToken::AsciiString),
            _ => None,
        }
    }

    /// Size in bytes of one payload element. `Real4` is never read, so it
    /// reports its nominal width.
    pub fn element_size(self) -> usize {
        match self {
            DataToken::NoData => 0,
            DataToken::BitArray16 | DataToken::Int16 => 2,
            DataToken::Int32 | DataToken::Real4 => 4,
            DataToken::Sem8 => 8,
            DataToken::AsciiString => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Payload bytes, header excluded.
    pub length: u16,
    pub record_type: u8,
    pub data_token: DataToken,
}

/// Raw coordinate in database units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let (&(x0, y0), rest) = points.split_first()?;
        let mut bbox = BoundingBox {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for &(x, y) in rest {
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }
        Some(bbox)
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Grow `target` to cover `other`.
pub(crate) fn enlarge(target: &mut Option<BoundingBox>, other: Option<BoundingBox>) {
    if let Some(other) = other {
        let merged = match *target {
            Some(current) => current.union(&other),
            None => other,
        };
        *target = Some(merged);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub layer: u16,
    /// Closed outline in user units; the closing point is not repeated.
    pub points: Vec<(f64, f64)>,
}

impl Polygon {
    /// Shoelace signed area, positive for counter-clockwise outlines.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let (x0, y0) = self.points[i];
            let (x1, y1) = self.points[(i + 1) % n];
            sum += x0 * y1 - x1 * y0;
        }
        sum / 2.0
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitsFactor {
    /// Size of a database unit in user units.
    pub user_to_db: f64,
    /// Size of a database unit in meters.
    pub db_to_metric: f64,
}

/// Timestamp as stored in BGNLIB/BGNSTR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GdsDate {
    pub year: i16,
    pub month: i16,
    pub day: i16,
    pub hour: i16,
    pub minute: i16,
    pub second: i16,
}

impl GdsDate {
    pub fn from_fields(fields: &[i16]) -> Option<Self> {
        match fields {
            &[year, month, day, hour, minute, second] => Some(GdsDate {
                year,
                month,
                day,
                hour,
                minute,
                second,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub string: String,
    pub x: f64,
    pub y: f64,
    pub layer: u16,
    pub text_type: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub name: String,
    pub modified: GdsDate,
    pub accessed: GdsDate,
    pub polygons: Vec<Polygon>,
    pub labels: Vec<TextLabel>,
    pub bounds: Option<BoundingBox>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    /// Stream version from the HEADER record (600 for release 6).
    pub version: Option<i16>,
    pub name: String,
    pub modified: GdsDate,
    pub accessed: GdsDate,
    pub units: Option<UnitsFactor>,
    pub structures: Vec<Structure>,
    pub bounds: Option<BoundingBox>,
}

impl Library {
    pub fn structure(&self, name: &str) -> Option<&Structure> {
        self.structures.iter().find(|s| s.name == name)
    }
}

pub mod codec;
pub mod parser;
pub mod reader;
pub mod record;
pub mod sink;
