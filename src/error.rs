// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Error types for GDSII stream decoding
//!
//! Every record-level failure carries the record type and the byte offset of
//! the record header, so a broken file can be inspected with a hex dump.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GdsError {
    #[error("protocol error in record 0x{record_type:02X} at offset {offset}: {message}")]
    Protocol {
        offset: u64,
        record_type: u8,
        message: String,
    },

    #[error("record 0x{record_type:02X} at offset {offset} uses the 4-byte real data token, which GDSII does not use")]
    UnsupportedToken { offset: u64, record_type: u8 },

    #[error("record 0x{record_type:02X} at offset {offset} has {length} payload bytes, not a multiple of {element_size}")]
    MalformedLength {
        offset: u64,
        record_type: u8,
        length: usize,
        element_size: usize,
    },

    #[error("element record 0x{record_type:02X} at offset {offset} opened while another element is still open")]
    NestedElement { offset: u64, record_type: u8 },

    #[error("element closed by record 0x{record_type:02X} at offset {offset} without any coordinates")]
    EmptyElement { offset: u64, record_type: u8 },

    #[error("record 0x{record_type:02X} at offset {offset} carries {length} date bytes, expected two 12-byte dates")]
    DateFormat {
        offset: u64,
        record_type: u8,
        length: usize,
    },

    #[error("stream truncated at offset {offset}: {context}")]
    TruncatedStream { offset: u64, context: String },

    #[error("value {value} is outside the range of the 8-byte GDSII real")]
    Range { value: f64 },

    #[error("invalid label pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GdsError {
    pub(crate) fn protocol(offset: u64, record_type: u8, message: impl Into<String>) -> Self {
        GdsError::Protocol {
            offset,
            record_type,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GdsError>;
