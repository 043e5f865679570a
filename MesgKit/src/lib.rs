//! # `MesgKit`
//!
//! A pure-Rust library for working with BMG (`MESGbmg1`) message containers,
//! the big-endian string tables used by `GameCube` and Wii era titles.
//!
//! ## Supported Formats
//!
//! - **BMG** - Binary container with INF1, DAT1 and optional MID1 sections
//! - **TXT** - Editable decoded text, one message per line, with escape
//!   records rendered as `{gg:nnnn[:hex]}` markup
//!
//! ## Quick Start
//!
//! ### Reading and Writing Containers
//!
//! ```no_run
//! use mesgkit::formats::bmg::{read_bmg, write_bmg};
//!
//! let mut container = read_bmg("message.bmg")?;
//! println!("Found {} messages", container.len());
//!
//! container.entries[0].text = "Hello{1a:0001}".to_string();
//! write_bmg("message_edited.bmg", &container)?;
//! # Ok::<(), mesgkit::Error>(())
//! ```
//!
//! ### Converting to Text and Back
//!
//! ```no_run
//! use mesgkit::converter::{convert_bmg_to_txt, convert_txt_to_bmg};
//!
//! convert_bmg_to_txt("message.bmg", "message.txt")?;
//! convert_txt_to_bmg("message.txt", "message.bmg")?;
//! # Ok::<(), mesgkit::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! ```
//! use mesgkit::prelude::*;
//!
//! let mut container = MessageContainer::new(true);
//! container.entries.push(MessageEntry::new("Hello", vec![0, 0, 0, 0], Some(5)));
//! let bytes = serialize_bmg(&container)?;
//! assert_eq!(parse_bmg_bytes(&bytes)?, container);
//! # Ok::<(), mesgkit::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `mesgkit` command-line binary

pub mod converter;
pub mod error;
pub mod formats;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::bmg::{
        EscapeRecord, MessageContainer, MessageEntry, StringEncoding, decode_string,
        encode_string, from_text, parse_bmg_bytes, read_bmg, read_bmg_text, serialize_bmg,
        to_text, write_bmg, write_bmg_text,
    };

    pub use crate::converter;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
