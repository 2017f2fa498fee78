//! RFC 1035 message codec.
//!
//! All multi-byte integers are big-endian. Name compression uses a single
//! reuse slot: the first name written into a message may be referenced by
//! later names through a two-byte pointer (top two bits set, low 14 bits an
//! offset from the start of the header). The encoder emits at most one
//! level of indirection; the decoder follows deeper chains but rejects
//! loops and forward pointers.

mod bytes;
mod message;
mod name;

pub use bytes::{ByteReader, ByteWriter};
pub use message::{decode_message, encode_message};
