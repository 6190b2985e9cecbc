//! A growable buffer of integers whose element width is fixed at construction
//! time. The packer picks a width per mode (`pos_type`/`idx_type` in
//! [crate::format::ModeEncoding]) so that generated code can size its own
//! index arithmetic to match; this type keeps that width exact in memory
//! rather than widening everything to `i64`.

use {
    crate::error::PackError,
    std::convert::TryInto,
};

/// The supported integer widths for a typed index buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IndexType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IndexType {
    /// Size, in bytes, of one element of this type.
    pub fn byte_width(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 => 4,
            Self::I64 | Self::U64 => 8,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }
}

/// A growable contiguous buffer over one of the eight supported integer
/// widths, chosen once at construction. Acts as a polymorphic vector over the
/// per-mode index type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypedIndexBuffer {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
}

impl TypedIndexBuffer {
    /// Creates an empty buffer of the given index type.
    pub fn new(index_type: IndexType) -> Self {
        match index_type {
            IndexType::I8 => Self::I8(Vec::new()),
            IndexType::I16 => Self::I16(Vec::new()),
            IndexType::I32 => Self::I32(Vec::new()),
            IndexType::I64 => Self::I64(Vec::new()),
            IndexType::U8 => Self::U8(Vec::new()),
            IndexType::U16 => Self::U16(Vec::new()),
            IndexType::U32 => Self::U32(Vec::new()),
            IndexType::U64 => Self::U64(Vec::new()),
        }
    }

    /// The index type this buffer was constructed with.
    pub fn index_type(&self) -> IndexType {
        match self {
            Self::I8(_) => IndexType::I8,
            Self::I16(_) => IndexType::I16,
            Self::I32(_) => IndexType::I32,
            Self::I64(_) => IndexType::I64,
            Self::U8(_) => IndexType::U8,
            Self::U16(_) => IndexType::U16,
            Self::U32(_) => IndexType::U32,
            Self::U64(_) => IndexType::U64,
        }
    }

    /// Byte width of one element.
    #[inline]
    pub fn byte_width(&self) -> usize {
        self.index_type().byte_width()
    }

    /// Number of elements currently stored.
    pub fn len(&self) -> usize {
        match self {
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards all elements, keeping the buffer's index type and capacity.
    pub fn clear(&mut self) {
        match self {
            Self::I8(v) => v.clear(),
            Self::I16(v) => v.clear(),
            Self::I32(v) => v.clear(),
            Self::I64(v) => v.clear(),
            Self::U8(v) => v.clear(),
            Self::U16(v) => v.clear(),
            Self::U32(v) => v.clear(),
            Self::U64(v) => v.clear(),
        }
    }

    /// Reads back the element at `k` as a widened `i128`.
    pub fn get(&self, k: usize) -> i128 {
        match self {
            Self::I8(v) => v[k] as i128,
            Self::I16(v) => v[k] as i128,
            Self::I32(v) => v[k] as i128,
            Self::I64(v) => v[k] as i128,
            Self::U8(v) => v[k] as i128,
            Self::U16(v) => v[k] as i128,
            Self::U32(v) => v[k] as i128,
            Self::U64(v) => v[k] as i128,
        }
    }

    /// Appends `value`, failing with [PackError::Overflow] if it does not fit
    /// the buffer's chosen width.
    pub fn push(&mut self, value: i128) -> Result<(), PackError> {
        macro_rules! push_narrowed {
            ($vec:expr, $ty:ty, $name:expr) => {{
                let narrowed: $ty = value.try_into().map_err(|_| PackError::Overflow {
                    index_type: $name,
                    value,
                })?;
                $vec.push(narrowed);
                Ok(())
            }};
        }

        match self {
            Self::I8(v) => push_narrowed!(v, i8, "i8"),
            Self::I16(v) => push_narrowed!(v, i16, "i16"),
            Self::I32(v) => push_narrowed!(v, i32, "i32"),
            Self::I64(v) => push_narrowed!(v, i64, "i64"),
            Self::U8(v) => push_narrowed!(v, u8, "u8"),
            Self::U16(v) => push_narrowed!(v, u16, "u16"),
            Self::U32(v) => push_narrowed!(v, u32, "u32"),
            Self::U64(v) => push_narrowed!(v, u64, "u64"),
        }
    }

    /// Appends every element of `other`, widening/narrowing element-wise.
    /// Fails with [PackError::Overflow] on the first element that doesn't fit.
    pub fn push_range(&mut self, other: &TypedIndexBuffer) -> Result<(), PackError> {
        for k in 0..other.len() {
            self.push(other.get(k))?;
        }
        Ok(())
    }

    /// The buffer's contents as native-endian bytes.
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            Self::I8(v) => v.iter().map(|x| *x as u8).collect(),
            Self::I16(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            Self::I32(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            Self::I64(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            Self::U8(v) => v.clone(),
            Self::U16(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            Self::U32(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            Self::U64(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
        }
    }
}

impl IntoIterator for &TypedIndexBuffer {
    type Item = i128;
    type IntoIter = std::vec::IntoIter<i128>;

    fn into_iter(self) -> Self::IntoIter {
        (0..self.len()).map(|k| self.get(k)).collect::<Vec<_>>().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    #[test]
    fn push_and_get_roundtrip() {
        let mut buf = TypedIndexBuffer::new(IndexType::I16);
        buf.push(100).unwrap();
        buf.push(-5).unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.get(0), 100);
        assert_eq!(buf.get(1), -5);
    }

    #[test]
    fn push_overflow_fails() {
        let mut buf = TypedIndexBuffer::new(IndexType::U8);
        assert!(buf.push(256).is_err());
        assert!(buf.push(-1).is_err());
        assert!(buf.push(255).is_ok());
    }

    #[test]
    fn push_range_widens() {
        let mut narrow = TypedIndexBuffer::new(IndexType::I8);
        narrow.push(1).unwrap();
        narrow.push(2).unwrap();

        let mut wide = TypedIndexBuffer::new(IndexType::I64);
        wide.push_range(&narrow).unwrap();
        assert_eq!(wide.len(), 2);
        assert_eq!(wide.get(0), 1);
        assert_eq!(wide.get(1), 2);
    }

    #[test]
    fn push_range_overflow() {
        let mut wide = TypedIndexBuffer::new(IndexType::I32);
        wide.push(1000).unwrap();

        let mut narrow = TypedIndexBuffer::new(IndexType::U8);
        assert!(narrow.push_range(&wide).is_err());
    }

    #[test]
    fn byte_width_matches_index_type() {
        assert_eq!(TypedIndexBuffer::new(IndexType::I8).byte_width(), 1);
        assert_eq!(TypedIndexBuffer::new(IndexType::U64).byte_width(), 8);
    }

    #[test]
    fn as_bytes_native_endian() {
        let mut buf = TypedIndexBuffer::new(IndexType::U32);
        buf.push(1).unwrap();
        assert_eq!(buf.as_bytes(), 1u32.to_ne_bytes().to_vec());
    }

    #[test]
    fn clear_keeps_index_type() {
        let mut buf = TypedIndexBuffer::new(IndexType::I32);
        buf.push(7).unwrap();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.index_type(), IndexType::I32);
    }
}
