//! File format handlers

pub mod bmg;

// Re-export main container types
pub use bmg::{
    MessageContainer, MessageEntry, StringEncoding, parse_bmg_bytes, read_bmg, serialize_bmg,
    write_bmg,
};
