//! Low-level offset, padding and bit-packing primitives shared by the offset
//! calculator and the flattener.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of a byte.

/// Number of bits in one byte; a bit field never spans two bytes.
pub const BITS_PER_BYTE: usize = 8;

/// Bytes needed to move `offset` up to the next multiple of `alignment`.
///
/// `alignment` must be non-zero; callers validate it before laying out fields.
pub fn padding_for(offset: usize, alignment: usize) -> usize {
    debug_assert!(alignment > 0);
    (alignment - offset % alignment) % alignment
}

/// Rounds `offset` up to the next multiple of `alignment`, or `None` when the
/// result does not fit in `usize`.
pub fn align_up(offset: usize, alignment: usize) -> Option<usize> {
    offset.checked_add(padding_for(offset, alignment))
}

/// Running bit position inside the byte currently being filled by consecutive
/// bit fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitCursor {
    pos: usize,
}

impl BitCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a field of `width` bits and returns its bit offset within its byte.
    ///
    /// A field that does not fit in the remaining bits starts a fresh byte. Once a
    /// byte is full the cursor wraps to 0.
    pub fn place(&mut self, width: usize) -> usize {
        debug_assert!(width > 0 && width <= BITS_PER_BYTE);

        if self.pos + width > BITS_PER_BYTE {
            self.pos = 0;
        }

        let at = self.pos;
        self.pos += width;

        if self.pos == BITS_PER_BYTE {
            self.pos = 0;
        }

        at
    }

    /// Closes the current partial byte, if any.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// True when no partial byte is open.
    pub fn is_byte_aligned(&self) -> bool {
        self.pos == 0
    }
}
