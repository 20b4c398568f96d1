// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Record-level reader for GDSII streams
//!
//! Every record starts with a 4-byte big-endian header:
//! total length (header included), record type, data token.

use std::io::{ErrorKind, Read};

use nom::{
    multi::count,
    number::complete::{be_i16, be_i32, be_u16, be_u64, be_u8},
    IResult, Parser,
};

use super::codec::sem_to_f64;
use super::{DataToken, RecordHeader};
use crate::error::{GdsError, Result};

const HEADER_LEN: usize = 4;
const INITIAL_BUFFER: usize = 200 * 8;

fn header_fields(input: &[u8]) -> IResult<&[u8], (u16, u8, u8)> {
    (be_u16, be_u8, be_u8).parse(input)
}

fn int16(input: &[u8]) -> IResult<&[u8], i16> {
    be_i16(input)
}

fn int32(input: &[u8]) -> IResult<&[u8], i32> {
    be_i32(input)
}

fn sem8(input: &[u8]) -> IResult<&[u8], f64> {
    let (rest, raw) = be_u64(input)?;
    Ok((rest, sem_to_f64(raw)))
}

/// One decoded record. The payload borrows the reader's buffer and is only
/// valid until the next call to [`RecordReader::next_record`].
#[derive(Debug)]
pub struct Record<'a> {
    pub header: RecordHeader,
    /// Byte offset of the header within the stream.
    pub offset: u64,
    pub element_count: usize,
    pub payload: &'a [u8],
}

impl<'a> Record<'a> {
    pub fn record_type(&self) -> u8 {
        self.header.record_type
    }

    fn expect_token(&self, accepted: &[DataToken]) -> Result<()> {
        if accepted.contains(&self.header.data_token) {
            Ok(())
        } else {
            Err(GdsError::protocol(
                self.offset,
                self.header.record_type,
                format!(
                    "unexpected data token {:?}, expected one of {accepted:?}",
                    self.header.data_token
                ),
            ))
        }
    }

    fn decode<P>(&self, element: P) -> Result<Vec<<P as Parser<&'a [u8]>>::Output>>
    where
        P: Parser<&'a [u8], Error = nom::error::Error<&'a [u8]>>,
    {
        let (_, values) = count(element, self.element_count)
            .parse(self.payload)
            .map_err(|e| {
                GdsError::protocol(
                    self.offset,
                    self.header.record_type,
                    format!("payload decode failed: {e:?}"),
                )
            })?;
        Ok(values)
    }

    pub fn i16s(&self) -> Result<Vec<i16>> {
        self.expect_token(&[DataToken::Int16, DataToken::BitArray16])?;
        self.decode(int16)
    }

    pub fn i32s(&self) -> Result<Vec<i32>> {
        self.expect_token(&[DataToken::Int32])?;
        self.decode(int32)
    }

    pub fn sems(&self) -> Result<Vec<f64>> {
        self.expect_token(&[DataToken::Sem8])?;
        self.decode(sem8)
    }

    /// String payload with the NUL padding of odd-length strings removed.
    pub fn ascii(&self) -> Result<String> {
        self.expect_token(&[DataToken::AsciiString])?;
        let end = self
            .payload
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        Ok(String::from_utf8_lossy(&self.payload[..end]).into_owned())
    }

    /// First element of a small-integer record such as LAYER or TEXTTYPE.
    /// Some writers emit these as 4-byte integers, so both widths are read.
    pub fn first_u16(&self) -> Result<u16> {
        let value = match self.header.data_token {
            DataToken::Int32 => self.i32s()?.first().copied().map(i64::from),
            _ => self.i16s()?.first().copied().map(i64::from),
        };
        let value = value.ok_or_else(|| {
            GdsError::protocol(self.offset, self.header.record_type, "empty payload")
        })?;
        u16::try_from(value).map_err(|_| {
            GdsError::protocol(
                self.offset,
                self.header.record_type,
                format!("value {value} out of range"),
            )
        })
    }
}

/// Reads records one at a time from any byte source, reusing a payload
/// buffer that doubles when a record does not fit and never shrinks.
pub struct RecordReader<R: Read> {
    source: R,
    buffer: Vec<u8>,
    offset: u64,
}

impl<R: Read> RecordReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buffer: vec![0; INITIAL_BUFFER],
            offset: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Read as many bytes as are available up to `buf.len()`.
    fn fill(source: &mut R, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match source.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn grow(&mut self, needed: usize) {
        let mut capacity = self.buffer.len().max(1);
        while capacity < needed {
            capacity *= 2;
        }
        if capacity > self.buffer.len() {
            self.buffer.resize(capacity, 0);
        }
    }

    /// Returns `Ok(None)` when the source ends exactly on a record boundary.
    pub fn next_record(&mut self) -> Result<Option<Record<'_>>> {
        let offset = self.offset;
        let mut raw = [0u8; HEADER_LEN];
        let got = Self::fill(&mut self.source, &mut raw)?;
        if got == 0 {
            return Ok(None);
        }
        if got < HEADER_LEN {
            return Err(GdsError::TruncatedStream {
                offset,
                context: format!("record header needs {HEADER_LEN} bytes, found {got}"),
            });
        }

        let (_, (total, record_type, token)) = header_fields(&raw).map_err(|e| {
            GdsError::protocol(offset, raw[2], format!("bad record header: {e:?}"))
        })?;

        if usize::from(total) < HEADER_LEN {
            return Err(GdsError::protocol(
                offset,
                record_type,
                format!("record length {total} is shorter than its header"),
            ));
        }
        let length = usize::from(total) - HEADER_LEN;

        let data_token = DataToken::from_byte(token).ok_or_else(|| {
            GdsError::protocol(offset, record_type, format!("unknown data token 0x{token:02X}"))
        })?;

        if data_token == DataToken::NoData && length > 0 {
            return Err(GdsError::protocol(
                offset,
                record_type,
                format!("no-data token with {length} payload bytes"),
            ));
        }
        if data_token == DataToken::Real4 {
            return Err(GdsError::UnsupportedToken {
                offset,
                record_type,
            });
        }

        let element_size = data_token.element_size();
        if element_size > 0 && length % element_size != 0 {
            return Err(GdsError::MalformedLength {
                offset,
                record_type,
                length,
                element_size,
            });
        }

        self.grow(length);
        let got = Self::fill(&mut self.source, &mut self.buffer[..length])?;
        if got < length {
            return Err(GdsError::TruncatedStream {
                offset,
                context: format!(
                    "record 0x{record_type:02X} declares {length} payload bytes, found {got}"
                ),
            });
        }
        self.offset += (HEADER_LEN + length) as u64;

        Ok(Some(Record {
            header: RecordHeader {
                length: length as u16,
                record_type,
                data_token,
            },
            offset,
            element_count: if element_size > 0 { length / element_size } else { 0 },
            payload: &self.buffer[..length],
        }))
    }
}
