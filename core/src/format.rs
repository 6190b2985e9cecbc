//! The format descriptor: an ordered list of per-mode encodings that tells
//! the packer, for each tensor axis, how to materialize it.

use crate::typed_buffer::IndexType;

/// How a single tensor mode is materialized.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ModeKind {
    /// Every value in `[0, dimension)` exists at this level; no arrays emitted.
    Dense,
    /// `pos`/`idx` arrays sized to the actual number of distinct children per parent.
    Sparse,
    /// `pos`/`idx` arrays padded so every parent has the same fan-out.
    Fixed,
}

/// The encoding chosen for one tensor mode, plus the integer widths its
/// `pos`/`idx` arrays (when it has any) should use.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ModeEncoding {
    kind: ModeKind,
    pos_type: IndexType,
    idx_type: IndexType,
}

impl ModeEncoding {
    /// Constructs a mode encoding. `pos_type`/`idx_type` are only consulted
    /// for `Sparse`/`Fixed`; `Dense` modes carry them but never allocate
    /// buffers of those widths.
    pub fn new(kind: ModeKind, pos_type: IndexType, idx_type: IndexType) -> Self {
        Self { kind, pos_type, idx_type }
    }

    /// Convenience constructor for a `Dense` mode with the default `i32` widths.
    pub fn dense() -> Self {
        Self::new(ModeKind::Dense, IndexType::I32, IndexType::I32)
    }

    /// Convenience constructor for a `Sparse` mode with the default `i32` widths.
    pub fn sparse() -> Self {
        Self::new(ModeKind::Sparse, IndexType::I32, IndexType::I32)
    }

    /// Convenience constructor for a `Fixed` mode with the default `i32` widths.
    pub fn fixed() -> Self {
        Self::new(ModeKind::Fixed, IndexType::I32, IndexType::I32)
    }

    #[inline]
    pub fn kind(&self) -> ModeKind {
        self.kind
    }

    #[inline]
    pub fn pos_type(&self) -> IndexType {
        self.pos_type
    }

    #[inline]
    pub fn idx_type(&self) -> IndexType {
        self.idx_type
    }
}

/// An ordered list of per-mode encodings. The order must equal the
/// coordinate stream's order for any tensor packed with this format.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Format {
    modes: Vec<ModeEncoding>,
}

impl Format {
    pub fn new(modes: Vec<ModeEncoding>) -> Self {
        Self { modes }
    }

    /// Number of modes (tensor order) this format describes.
    #[inline]
    pub fn order(&self) -> usize {
        self.modes.len()
    }

    #[inline]
    pub fn modes(&self) -> &[ModeEncoding] {
        &self.modes
    }

    #[inline]
    pub fn mode(&self, i: usize) -> ModeEncoding {
        self.modes[i]
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn order_matches_mode_count() {
        let format = Format::new(vec![ModeEncoding::dense(), ModeEncoding::sparse()]);
        assert_eq!(format.order(), 2);
        assert_eq!(format.mode(0).kind(), ModeKind::Dense);
        assert_eq!(format.mode(1).kind(), ModeKind::Sparse);
    }
}
