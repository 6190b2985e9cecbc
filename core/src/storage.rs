//! The storage container: holds `{format, per-mode index group, values}`,
//! the packer's output and the contract with downstream code.

use {
    crate::{
        error::PackError,
        format::{Format, ModeKind},
        typed_buffer::TypedIndexBuffer,
    },
    std::io::Write,
};

/// The value datatype is fixed to double precision; see `SPEC_FULL.md` §3.
pub const VALUE_WIDTH: usize = std::mem::size_of::<f64>();

/// The per-mode materialized index arrays. Every mode carries a `pos` and an
/// `idx` buffer, even `Dense`, which stores its dimension as the sole entry
/// of `pos` and leaves `idx` empty — this mirrors how the arrays are read
/// back by [Storage::size] and the depth-first traversal in [Storage::entries].
#[derive(Clone, Debug)]
pub struct ModeIndex {
    pub pos: TypedIndexBuffer,
    pub idx: TypedIndexBuffer,
}

/// Sizes derived by walking the materialized index group, excluding `Fixed`
/// (see the `Size` Open Question in `SPEC_FULL.md` §4.6 — `Fixed` is
/// deliberately unsupported here rather than silently extended).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LevelSize {
    pub pos_len: usize,
    pub idx_len: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Size {
    pub level_sizes: Vec<LevelSize>,
    pub values_len: usize,
}

/// Holds `{format, per-mode index group, values}`. Constructed empty from a
/// format, populated by the packer in one shot, read-only thereafter.
#[derive(Clone, Debug)]
pub struct Storage {
    format: Format,
    index: Option<Vec<ModeIndex>>,
    values: Option<Vec<u8>>,
}

impl Storage {
    /// Constructs an empty storage container for `format`.
    pub fn new(format: Format) -> Self {
        Self { format, index: None, values: None }
    }

    pub fn set_index(&mut self, index: Vec<ModeIndex>) {
        self.index = Some(index);
    }

    pub fn set_values(&mut self, values: Vec<u8>) {
        self.values = Some(values);
    }

    #[inline]
    pub fn get_format(&self) -> &Format {
        &self.format
    }

    pub fn get_index(&self, mode: usize) -> &ModeIndex {
        &self.index.as_ref().expect("storage not yet populated")[mode]
    }

    pub fn get_values(&self) -> &[u8] {
        self.values.as_deref().expect("storage not yet populated")
    }

    /// True once both the index group and values have been populated.
    pub fn defined(&self) -> bool {
        self.index.is_some() && self.values.is_some()
    }

    /// Derived sizes for each level, by walking the prefix-sum structure.
    /// Fails with [PackError::Unsupported] if any mode is `Fixed`.
    pub fn size(&self) -> Result<Size, PackError> {
        let index = self.index.as_ref().expect("storage not yet populated");
        let mut level_sizes = Vec::with_capacity(index.len());
        let mut prev: i128 = 1;

        for (i, mode_index) in index.iter().enumerate() {
            match self.format.mode(i).kind() {
                ModeKind::Dense => {
                    level_sizes.push(LevelSize { pos_len: 1, idx_len: 0 });
                    prev *= mode_index.pos.get(0);
                }
                ModeKind::Sparse => {
                    let idx_len = mode_index.pos.get(prev as usize);
                    level_sizes.push(LevelSize { pos_len: prev as usize + 1, idx_len: idx_len as usize });
                    prev = idx_len;
                }
                ModeKind::Fixed => {
                    return Err(PackError::Unsupported("Size for Fixed-mode storage"));
                }
            }
        }

        Ok(Size { level_sizes, values_len: prev as usize })
    }

    /// Depth-first enumeration of `(0-based coordinates, value)` pairs in the
    /// packed representation's natural order. For `Dense` modes this walks
    /// every dimension value, including absent coordinates (whose value is
    /// `0.0`); for `Fixed` modes it includes padded, duplicated positions.
    /// Neither is a defect: both mirror exactly what the packer materialized.
    pub fn entries(&self) -> Vec<(Vec<i64>, f64)> {
        let index = self.index.as_ref().expect("storage not yet populated");
        let values = self.values.as_deref().expect("storage not yet populated");
        let order = self.format.order();

        let mut seg_cursor = vec![0usize; order];
        let mut prefix = Vec::with_capacity(order);
        let mut out = Vec::new();
        let mut leaf_offset = 0usize;

        walk(self, index, values, order, 0, &mut seg_cursor, &mut prefix, &mut leaf_offset, &mut out);
        out
    }

    /// Writes a human-readable diagnostic dump: `L{i}:` blocks with `ptr`/`idx`
    /// contents, followed by the values buffer. Mirrors the teacher's
    /// `Storage::operator<<` shape, adapted to a generic `Write`.
    pub fn print<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        let size = self.size().ok();
        let index = self.index.as_ref();

        for i in 0..self.format.order() {
            writeln!(w, "L{i}:")?;
            if let (Some(index), Some(size)) = (index, size.as_ref()) {
                let level = &index[i];
                let level_size = size.level_sizes[i];
                if level_size.pos_len > 0 {
                    write!(w, "  ptr: {{")?;
                    write_joined(w, &level.pos, level_size.pos_len)?;
                    writeln!(w, "}}")?;
                }
                if level_size.idx_len > 0 {
                    write!(w, "  idx: {{")?;
                    write_joined(w, &level.idx, level_size.idx_len)?;
                    writeln!(w, "}}")?;
                }
            }
        }

        if let Some(values) = &self.values {
            let n_values = values.len() / VALUE_WIDTH;
            write!(w, "vals: {{")?;
            for i in 0..n_values {
                if i > 0 {
                    write!(w, ", ")?;
                }
                let mut bytes = [0u8; VALUE_WIDTH];
                bytes.copy_from_slice(&values[i * VALUE_WIDTH..(i + 1) * VALUE_WIDTH]);
                write!(w, "{}", f64::from_ne_bytes(bytes))?;
            }
            write!(w, "}}")?;
        }

        Ok(())
    }
}

fn write_joined<W: Write>(w: &mut W, buf: &TypedIndexBuffer, len: usize) -> std::io::Result<()> {
    for k in 0..len {
        if k > 0 {
            write!(w, ", ")?;
        }
        write!(w, "{}", buf.get(k))?;
    }
    Ok(())
}

fn emit_leaf(values: &[u8], prefix: &[i64], leaf_offset: &mut usize, out: &mut Vec<(Vec<i64>, f64)>) {
    let mut bytes = [0u8; VALUE_WIDTH];
    let start = *leaf_offset * VALUE_WIDTH;
    bytes.copy_from_slice(&values[start..start + VALUE_WIDTH]);
    out.push((prefix.to_vec(), f64::from_ne_bytes(bytes)));
    *leaf_offset += 1;
}

#[allow(clippy::too_many_arguments)]
fn walk(
    storage: &Storage,
    index: &[ModeIndex],
    values: &[u8],
    order: usize,
    level: usize,
    seg_cursor: &mut [usize],
    prefix: &mut Vec<i64>,
    leaf_offset: &mut usize,
    out: &mut Vec<(Vec<i64>, f64)>,
) {
    let kind = storage.format.mode(level).kind();
    let level_index = &index[level];

    match kind {
        ModeKind::Dense => {
            let dim = level_index.pos.get(0) as i64;
            for j in 0..dim {
                prefix.push(j);
                if level + 1 == order {
                    emit_leaf(values, prefix, leaf_offset, out);
                } else {
                    walk(storage, index, values, order, level + 1, seg_cursor, prefix, leaf_offset, out);
                }
                prefix.pop();
            }
        }
        ModeKind::Sparse => {
            let seg = seg_cursor[level];
            seg_cursor[level] += 1;
            let begin = level_index.pos.get(seg) as usize;
            let end = level_index.pos.get(seg + 1) as usize;
            for k in begin..end {
                let child = level_index.idx.get(k);
                prefix.push(child as i64);
                if level + 1 == order {
                    emit_leaf(values, prefix, leaf_offset, out);
                } else {
                    walk(storage, index, values, order, level + 1, seg_cursor, prefix, leaf_offset, out);
                }
                prefix.pop();
            }
        }
        ModeKind::Fixed => {
            let fan_out = level_index.pos.get(0) as usize;
            let seg = seg_cursor[level];
            seg_cursor[level] += 1;
            let begin = seg * fan_out;
            let end = begin + fan_out;
            for k in begin..end {
                let child = level_index.idx.get(k);
                prefix.push(child as i64);
                if level + 1 == order {
                    emit_leaf(values, prefix, leaf_offset, out);
                } else {
                    walk(storage, index, values, order, level + 1, seg_cursor, prefix, leaf_offset, out);
                }
                prefix.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            format::ModeEncoding,
            typed_buffer::IndexType,
        },
        pretty_assertions::assert_eq,
    };

    #[test]
    fn defined_requires_both_index_and_values() {
        let format = Format::new(vec![ModeEncoding::dense()]);
        let mut storage = Storage::new(format);
        assert!(!storage.defined());
        storage.set_index(vec![]);
        assert!(!storage.defined());
        storage.set_values(vec![]);
        assert!(storage.defined());
    }

    #[test]
    fn size_dense_sparse() {
        let format = Format::new(vec![ModeEncoding::dense(), ModeEncoding::sparse()]);
        let mut storage = Storage::new(format);

        let mut dense_pos = TypedIndexBuffer::new(IndexType::I32);
        dense_pos.push(3).unwrap();

        let mut sparse_pos = TypedIndexBuffer::new(IndexType::I32);
        for v in [0, 2, 2, 3] {
            sparse_pos.push(v).unwrap();
        }
        let mut sparse_idx = TypedIndexBuffer::new(IndexType::I32);
        for v in [0, 2, 1] {
            sparse_idx.push(v).unwrap();
        }

        storage.set_index(vec![
            ModeIndex { pos: dense_pos, idx: TypedIndexBuffer::new(IndexType::I32) },
            ModeIndex { pos: sparse_pos, idx: sparse_idx },
        ]);
        storage.set_values(vec![0u8; 3 * VALUE_WIDTH]);

        let size = storage.size().unwrap();
        assert_eq!(size.level_sizes[0], LevelSize { pos_len: 1, idx_len: 0 });
        assert_eq!(size.level_sizes[1], LevelSize { pos_len: 4, idx_len: 3 });
        assert_eq!(size.values_len, 3);
    }

    #[test]
    fn size_rejects_fixed() {
        let format = Format::new(vec![ModeEncoding::fixed()]);
        let mut storage = Storage::new(format);
        let mut pos = TypedIndexBuffer::new(IndexType::I32);
        pos.push(2).unwrap();
        storage.set_index(vec![ModeIndex { pos, idx: TypedIndexBuffer::new(IndexType::I32) }]);
        storage.set_values(vec![0u8; 2 * VALUE_WIDTH]);
        assert!(matches!(storage.size(), Err(PackError::Unsupported(_))));
    }
}
