#![warn(clippy::all)]

//! Sparse tensor packing engine: takes a sorted coordinate-list tensor and a
//! per-mode format descriptor, and materializes the hierarchical `pos`/`idx`
//! arrays and contiguous value buffer a tensor-algebra compiler's generated
//! code expects.

pub mod coo;
pub mod error;
pub mod fixed_analyzer;
pub mod format;
pub mod pack;
pub mod storage;
pub mod typed_buffer;

pub use {
    coo::{read_coo, read_coo_file, write_coo, write_coo_file, CooTensor},
    error::{PackError, PackResult},
    fixed_analyzer::{analyze_fixed_level, CoordSlices},
    format::{Format, ModeEncoding, ModeKind},
    pack::{pack, CoordinateStream},
    storage::{LevelSize, ModeIndex, Size, Storage, VALUE_WIDTH},
    typed_buffer::{IndexType, TypedIndexBuffer},
};
