//! Utilities to encode and decode binary messages.
//!
//! This crate is the byte-level layer underneath the soxide SOCKS
//! implementation: a [`Reader`] for parsing network messages out of a
//! byte slice, and a [`Writer`] trait for building them back up.  A
//! `Reader` never consumes past the end of its input; when a message is
//! not fully present yet it reports [`Error::Truncated`], so a caller
//! holding a partially received message can keep its buffer and try
//! again once more bytes arrive.
//!
//! These tools are meant for handshake-sized messages of at most a few
//! hundred bytes.  They are not a general-purpose serialization
//! framework, and they are unsuitable for bulk data.

#![deny(missing_docs)]
#![warn(noop_method_call)]
#![deny(unreachable_pub)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::cognitive_complexity)]
#![deny(clippy::debug_assert_with_mut_call)]
#![deny(clippy::exhaustive_enums)]
#![deny(clippy::exhaustive_structs)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![deny(clippy::fallible_impl_from)]
#![deny(clippy::large_stack_arrays)]
#![warn(clippy::manual_ok_or)]
#![deny(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::option_option)]
#![warn(clippy::rc_buffer)]
#![deny(clippy::ref_option_ref)]
#![warn(clippy::trait_duplication_in_bounds)]
#![warn(clippy::unseparated_literal_suffix)]

mod err;
mod impls;
mod reader;
mod writer;

pub use err::Error;
pub use reader::Reader;
pub use writer::Writer;

/// Result type returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for an object that can be encoded onto a Writer by reference.
pub trait Writeable {
    /// Encode this object onto the writer `b`.
    fn write_onto<B: Writer + ?Sized>(&self, b: &mut B);
}

/// Trait for an object that can be extracted from a Reader.
pub trait Readable: Sized {
    /// Try to decode a value of this type from the reader `b`.
    fn take_from(b: &mut Reader<'_>) -> Result<Self>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn writer() {
        let mut v: Vec<u8> = Vec::new();
        v.write_u8(0x05);
        v.write_u16(0x01bb);
        v.write_u32(0x7f000001);
        v.write_all(b"proxyville");
        v.write_zeros(2);
        assert_eq!(
            &v[..],
            &b"\x05\x01\xbb\x7f\x00\x00\x01proxyville\x00\x00"[..]
        );
    }
}
