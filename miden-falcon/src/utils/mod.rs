//! Utilities used in this crate which can also be generally useful downstream.

pub use winter_utils::{
    ByteReader, ByteWriter, Deserializable, DeserializationError, Serializable, SliceReader,
};

pub mod zeroize {
    //! Securely zero memory holding key material.
    pub use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};
}
