//! In-memory GDSII stream builder shared by the integration tests

#![allow(dead_code)]

use gdsii_reader::gds::codec::f64_to_sem;
use gdsii_reader::gds::record_type::*;

pub const NO_DATA: u8 = 0x00;
pub const INT16: u8 = 0x02;
pub const INT32: u8 = 0x03;
pub const REAL4: u8 = 0x04;
pub const SEM8: u8 = 0x05;
pub const ASCII: u8 = 0x06;

pub const DATES: [i16; 12] = [2024, 3, 14, 9, 26, 53, 2024, 3, 15, 10, 0, 1];

#[derive(Default)]
pub struct GdsBuilder {
    bytes: Vec<u8>,
}

impl GdsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, record_type: u8, token: u8, payload: &[u8]) -> Self {
        let total = (payload.len() + 4) as u16;
        self.bytes.extend_from_slice(&total.to_be_bytes());
        self.bytes.push(record_type);
        self.bytes.push(token);
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn no_data(self, record_type: u8) -> Self {
        self.record(record_type, NO_DATA, &[])
    }

    pub fn i16s(self, record_type: u8, values: &[i16]) -> Self {
        let payload: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.record(record_type, INT16, &payload)
    }

    pub fn i32s(self, record_type: u8, values: &[i32]) -> Self {
        let payload: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.record(record_type, INT32, &payload)
    }

    pub fn sems(self, record_type: u8, values: &[f64]) -> Self {
        let payload: Vec<u8> = values
            .iter()
            .flat_map(|&v| f64_to_sem(v).unwrap().to_be_bytes())
            .collect();
        self.record(record_type, SEM8, &payload)
    }

    /// Strings are NUL-padded to an even length as writers do.
    pub fn ascii(self, record_type: u8, text: &str) -> Self {
        let mut payload = text.as_bytes().to_vec();
        if payload.len() % 2 == 1 {
            payload.push(0);
        }
        self.record(record_type, ASCII, &payload)
    }

    pub fn points(self, points: &[(i32, i32)]) -> Self {
        let values: Vec<i32> = points.iter().flat_map(|&(x, y)| [x, y]).collect();
        self.i32s(XY, &values)
    }

    pub fn header(self) -> Self {
        self.i16s(HEADER, &[600])
    }

    pub fn begin_library(self) -> Self {
        self.i16s(BGNLIB, &DATES)
    }

    pub fn library_name(self, name: &str) -> Self {
        self.ascii(LIBNAME, name)
    }

    pub fn units(self, user_to_db: f64, db_to_metric: f64) -> Self {
        self.sems(UNITS, &[user_to_db, db_to_metric])
    }

    /// HEADER, BGNLIB, LIBNAME and UNITS(0.001, 1e-9).
    pub fn library(self, name: &str) -> Self {
        self.header()
            .begin_library()
            .library_name(name)
            .units(0.001, 1e-9)
    }

    pub fn begin_structure(self, name: &str) -> Self {
        self.i16s(BGNSTR, &DATES).ascii(STRNAME, name)
    }

    pub fn end_structure(self) -> Self {
        self.no_data(ENDSTR)
    }

    pub fn end_library(self) -> Self {
        self.no_data(ENDLIB)
    }

    pub fn boundary(self, layer: i16, points: &[(i32, i32)]) -> Self {
        self.no_data(BOUNDARY)
            .i16s(LAYER, &[layer])
            .i16s(DATATYPE, &[0])
            .points(points)
            .no_data(ENDEL)
    }

    pub fn path(self, layer: i16, width: i32, points: &[(i32, i32)]) -> Self {
        self.no_data(PATH)
            .i16s(LAYER, &[layer])
            .i16s(DATATYPE, &[0])
            .i32s(WIDTH, &[width])
            .points(points)
            .no_data(ENDEL)
    }

    pub fn text(self, layer: i16, text_type: i16, at: (i32, i32), text: &str) -> Self {
        self.no_data(TEXT)
            .i16s(LAYER, &[layer])
            .i16s(TEXTTYPE, &[text_type])
            .points(&[at])
            .ascii(STRING, text)
            .no_data(ENDEL)
    }

    pub fn sref(self, name: &str, at: (i32, i32)) -> Self {
        self.no_data(SREF)
            .ascii(0x12, name)
            .points(&[at])
            .no_data(ENDEL)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

pub const SQUARE_CCW: [(i32, i32); 5] = [(0, 0), (10, 0), (10, 10), (0, 10), (0, 0)];
pub const SQUARE_CW: [(i32, i32); 5] = [(0, 0), (0, 10), (10, 10), (10, 0), (0, 0)];
