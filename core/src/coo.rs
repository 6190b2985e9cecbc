//! COO (coordinate list) text I/O: the tensor file format this crate reads
//! to build a [CoordinateStream] and writes back out from a packed
//! [Storage]. Grounded on `readTNS`/`writeTNS` in the original file I/O
//! module: no header, 1-based coordinates on the wire, whitespace-separated
//! fields, the value always the last field on a line, order inferred from
//! the first line's field count and dimensions inferred as the per-axis max
//! 1-based index seen.

use {
    crate::{error::PackError, storage::Storage},
    std::{
        fs::File,
        io::{BufRead, BufReader, BufWriter, Write},
        path::Path,
    },
};

/// A fully-materialized coordinate-list tensor: parallel coordinate arrays
/// (one `Vec<i64>` per mode, 0-based) plus a value per entry.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CooTensor {
    pub dimensions: Vec<usize>,
    pub coords: Vec<Vec<i64>>,
    pub vals: Vec<f64>,
}

impl CooTensor {
    /// Number of modes. `0` for an empty tensor with no lines at all.
    pub fn order(&self) -> usize {
        self.dimensions.len()
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// Borrowed coordinate slices, one per mode, suitable for
    /// [crate::pack::CoordinateStream::new].
    pub fn coord_slices(&self) -> Vec<&[i64]> {
        self.coords.iter().map(|c| c.as_slice()).collect()
    }
}

/// Reads a COO tensor from `reader`. There is no header line: every line is
/// `coord_0 coord_1 ... coord_{order-1} value`, 1-based, and the order is
/// inferred from the first non-blank line's field count minus one.
/// Dimensions are inferred as the per-axis max 1-based index seen. An input
/// with no lines at all yields an order-0, empty tensor.
pub fn read_coo<R: BufRead>(reader: R) -> Result<CooTensor, PackError> {
    let mut order: Option<usize> = None;
    let mut coords: Vec<Vec<i64>> = Vec::new();
    let mut dimensions: Vec<i64> = Vec::new();
    let mut vals = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = lineno + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let order = *order.get_or_insert_with(|| {
            let order = fields.len() - 1;
            coords = vec![Vec::new(); order];
            dimensions = vec![0; order];
            order
        });

        if fields.len() != order + 1 {
            log::warn!("malformed COO line {line_no}: expected {} fields, got {}", order + 1, fields.len());
            return Err(PackError::Parse {
                line: line_no,
                detail: format!("expected {} coordinates and a value, got {:?}", order, fields),
            });
        }

        for (mode, field) in fields[..order].iter().enumerate() {
            let one_based: i64 = field.parse().map_err(|_| PackError::Parse {
                line: line_no,
                detail: format!("expected an integer coordinate, got {field:?}"),
            })?;
            let zero_based = one_based - 1;
            if zero_based > i32::MAX as i64 || zero_based < 0 {
                return Err(PackError::CoordinateOverflow { line: line_no, value: one_based });
            }
            coords[mode].push(zero_based);
            dimensions[mode] = dimensions[mode].max(one_based);
        }

        let value: f64 = fields[order].parse().map_err(|_| PackError::Parse {
            line: line_no,
            detail: format!("expected a floating-point value, got {:?}", fields[order]),
        })?;
        vals.push(value);
    }

    let dimensions: Vec<usize> = dimensions.into_iter().map(|d| d as usize).collect();
    log::debug!("read {} coordinates, order {}", vals.len(), dimensions.len());
    Ok(CooTensor { dimensions, coords, vals })
}

/// Reads a COO tensor from a file at `path`.
pub fn read_coo_file<P: AsRef<Path>>(path: P) -> Result<CooTensor, PackError> {
    let file = File::open(path)?;
    read_coo(BufReader::new(file))
}

/// Writes `storage`'s entries back out in COO text form: one `coord...
/// value` line per entry, no header, coordinates converted back to 1-based.
pub fn write_coo<W: Write>(mut writer: W, storage: &Storage) -> Result<(), PackError> {
    let mut entries = storage.entries();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (coord, value) in entries {
        let fields: Vec<String> = coord.iter().map(|c| (c + 1).to_string()).collect();
        writeln!(writer, "{} {value}", fields.join(" "))?;
    }

    Ok(())
}

/// Writes a COO tensor to a file at `path`.
pub fn write_coo_file<P: AsRef<Path>>(path: P, storage: &Storage) -> Result<(), PackError> {
    let file = File::create(path)?;
    write_coo(BufWriter::new(file), storage)
}
