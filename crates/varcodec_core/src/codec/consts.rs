//! Shared constants between encoding and decoding logic.

/// Continuation flag, set on every varint byte except the last.
pub const VARINT_CONTINUE: u8 = 0x80;
/// Sign flag. Only the first varint byte carries it.
pub const VARINT_SIGN: u8 = 0x40;

/// Magnitude bits stored in the first varint byte.
pub const VARINT_HEAD_MASK: u8 = 0x3f;
pub const VARINT_HEAD_BITS: u32 = 6;

/// Magnitude bits stored in every following varint byte.
pub const VARINT_TAIL_MASK: u8 = 0x7f;
pub const VARINT_TAIL_BITS: u32 = 7;

/// Longest varint needed for a 64-bit magnitude (6 + 7 * 9 >= 64).
pub const VARINT_MAX_BYTES: usize = 10;

pub const BOOL_TRUE: u8 = 1;
pub const BOOL_FALSE: u8 = 0;

/// Array arity of an envelope: the type id, then the payload.
pub const ENVELOPE_ARITY: usize = 2;

// options are arrays of zero or one element
pub const OPTION_NONE: usize = 0;
pub const OPTION_SOME: usize = 1;

/// Upper bound on elements reserved up front when decoding a sequence.
pub const SEQ_PREALLOC_MAX: usize = 1024;
