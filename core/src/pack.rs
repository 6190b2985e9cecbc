//! The packer: the recursive per-mode materializer. Consumes sorted
//! coordinates, values, and a format; produces per-mode index arrays and a
//! contiguous value array wrapped in a [Storage].
//!
//! Grounded on `packTensor`/`pack` in the original engine: traversal order,
//! the `pos`/`idx` emission rules per mode kind, and the scratch-buffer
//! over-allocate-then-trim strategy are all preserved verbatim.

use crate::{
    error::PackError,
    fixed_analyzer::{analyze_fixed_level, CoordSlices},
    format::{Format, ModeKind},
    storage::{ModeIndex, Storage, VALUE_WIDTH},
    typed_buffer::TypedIndexBuffer,
};

/// The sorted coordinate stream plus the value buffer the packer consumes.
/// One `coords[i]` slice per tensor mode, all the same length; `vals` the
/// same length again.
pub struct CoordinateStream<'a> {
    pub dimensions: &'a [usize],
    pub coords: Vec<&'a [i64]>,
    pub vals: &'a [f64],
}

impl<'a> CoordinateStream<'a> {
    pub fn new(dimensions: &'a [usize], coords: Vec<&'a [i64]>, vals: &'a [f64]) -> Self {
        Self { dimensions, coords, vals }
    }

    fn order(&self) -> usize {
        self.coords.len()
    }

    fn n(&self) -> usize {
        self.vals.len()
    }
}

/// Packs a sorted coordinate stream into a [Storage] following `format`.
pub fn pack(stream: &CoordinateStream, format: &Format) -> Result<Storage, PackError> {
    if stream.dimensions.len() != format.order() {
        return Err(PackError::FormatMismatch(format!(
            "format has order {}, dimensions have order {}",
            format.order(),
            stream.dimensions.len()
        )));
    }
    if stream.order() != format.order() {
        return Err(PackError::FormatMismatch(format!(
            "format has order {}, coordinate stream has order {}",
            format.order(),
            stream.order()
        )));
    }

    log::debug!("packing order-{} tensor, {} coordinates, format {:?}", format.order(), stream.n(), format);

    let order = format.order();
    let mut index: Vec<ModeIndex> = Vec::with_capacity(order);

    for i in 0..order {
        let mode = format.mode(i);
        match mode.kind() {
            ModeKind::Dense => {
                let mut pos = TypedIndexBuffer::new(mode.pos_type());
                pos.push(stream.dimensions[i] as i128)?;
                index.push(ModeIndex { pos, idx: TypedIndexBuffer::new(mode.idx_type()) });
            }
            ModeKind::Sparse => {
                let mut pos = TypedIndexBuffer::new(mode.pos_type());
                pos.push(0)?;
                index.push(ModeIndex { pos, idx: TypedIndexBuffer::new(mode.idx_type()) });
            }
            ModeKind::Fixed => {
                let slices = CoordSlices::new(stream.coords.clone());
                let max_fixed = analyze_fixed_level(&slices, i, 0, stream.n());
                log::trace!("fixed-level analysis at mode {i}: fan-out {max_fixed}");
                let mut pos = TypedIndexBuffer::new(mode.pos_type());
                pos.push(max_fixed as i128)?;
                index.push(ModeIndex { pos, idx: TypedIndexBuffer::new(mode.idx_type()) });
            }
        }
    }

    let max_values: usize = stream.dimensions.iter().product();
    let mut values = vec![0u8; max_values * VALUE_WIDTH];

    let actual_size = pack_tensor(stream, format, &mut index, 0, stream.n(), 0, &mut values, 0)?;
    values.truncate(actual_size);

    log::debug!("packed to {actual_size} value bytes");

    let mut storage = Storage::new(format.clone());
    storage.set_index(index);
    storage.set_values(values);
    Ok(storage)
}

#[allow(clippy::too_many_arguments)]
fn pack_tensor(
    stream: &CoordinateStream,
    format: &Format,
    index: &mut [ModeIndex],
    begin: usize,
    end: usize,
    level: usize,
    values: &mut [u8],
    values_offset: usize,
) -> Result<usize, PackError> {
    let order = format.order();
    let mode = format.mode(level);

    match mode.kind() {
        ModeKind::Dense => {
            let dim = stream.dimensions[level];
            let mut cbegin = begin;
            let mut offset = values_offset;
            for j in 0..dim {
                let mut cend = cbegin;
                while cend < end && stream.coords[level][cend] == j as i64 {
                    cend += 1;
                }
                offset = pack_next_level(stream, format, index, cbegin, cend, level, order, values, offset)?;
                cbegin = cend;
            }
            Ok(offset)
        }
        ModeKind::Sparse => {
            let unique = unique_entries(stream.coords[level], begin, end);

            let running_end = index[level].idx.len() + unique.len();
            index[level].pos.push(running_end as i128)?;
            for &v in &unique {
                index[level].idx.push(v as i128)?;
            }

            let mut cbegin = begin;
            let mut offset = values_offset;
            for &u in &unique {
                let mut cend = cbegin;
                while cend < end && stream.coords[level][cend] == u {
                    cend += 1;
                }
                offset = pack_next_level(stream, format, index, cbegin, cend, level, order, values, offset)?;
                cbegin = cend;
            }
            Ok(offset)
        }
        ModeKind::Fixed => {
            let fan_out = index[level].pos.get(0) as usize;
            let unique = unique_entries(stream.coords[level], begin, end);
            let segment_size = unique.len();

            let mut cbegin = begin;
            let mut offset = values_offset;

            if segment_size > 0 {
                for &v in &unique {
                    index[level].idx.push(v as i128)?;
                }
                for &u in &unique {
                    let mut cend = cbegin;
                    while cend < end && stream.coords[level][cend] == u {
                        cend += 1;
                    }
                    offset = pack_next_level(stream, format, index, cbegin, cend, level, order, values, offset)?;
                    cbegin = cend;
                }
            }

            // Padding duplicates the last real child's coordinate but
            // recurses into the now-empty range [cbegin, cbegin), so the
            // descendant takes the zero-fill branch rather than replaying
            // a real value.
            let mut cur_size = segment_size;
            while fan_out > cur_size {
                let pad = if segment_size > 0 { unique[segment_size - 1] } else { 0 };
                index[level].idx.push(pad as i128)?;
                offset = pack_next_level(stream, format, index, cbegin, cbegin, level, order, values, offset)?;
                cur_size += 1;
            }
            Ok(offset)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn pack_next_level(
    stream: &CoordinateStream,
    format: &Format,
    index: &mut [ModeIndex],
    cbegin: usize,
    cend: usize,
    level: usize,
    order: usize,
    values: &mut [u8],
    values_offset: usize,
) -> Result<usize, PackError> {
    if level + 1 == order {
        let start = values_offset;
        let end = start + VALUE_WIDTH;
        if cbegin < cend {
            values[start..end].copy_from_slice(&stream.vals[cbegin].to_ne_bytes());
        } else {
            values[start..end].fill(0);
        }
        Ok(values_offset + VALUE_WIDTH)
    } else {
        pack_tensor(stream, format, index, cbegin, cend, level + 1, values, values_offset)
    }
}

/// Counts and returns the distinct values in `v[start..end)`, assuming it is
/// sorted. Idempotent and length-preserving on already-unique input.
fn unique_entries(v: &[i64], start: usize, end: usize) -> Vec<i64> {
    if end <= start {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut prev = v[start];
    out.push(prev);
    for &cur in &v[start + 1..end] {
        debug_assert!(cur >= prev, "coordinate stream must be sorted");
        if cur > prev {
            out.push(cur);
            prev = cur;
        }
    }
    out
}
