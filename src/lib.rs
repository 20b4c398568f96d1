//! GDSII Reader Library
//!
//! This library decodes GDSII stream files, the binary layout exchange format
//! used in IC and photomask Electronic Design Automation (EDA) workflows.
//! It can import the full structure/polygon tree of a library or extract a
//! flat, filtered table of text labels.

pub mod error;
pub mod export;
pub mod gds;

// Re-export commonly used types
pub use error::{GdsError, Result};
pub use gds::parser::{
    parse_full, parse_label_columns, parse_labels, CoordinateScale, ParseOptions,
};
pub use gds::reader::GdsReader;
pub use gds::sink::{LabelColumns, LabelFilter};
pub use gds::{BoundingBox, Library, Polygon, Structure, TextLabel, UnitsFactor};
