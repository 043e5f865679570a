//! BMG and decoded-text conversions
//!
//! Handles conversions between the two message formats:
//! - BMG (binary) - `MESGbmg1` container as shipped with the game
//! - TXT - line-per-message text with escape markup, for editing

mod bmg_to_txt;
mod txt_to_bmg;

pub use bmg_to_txt::{bmg_to_text_string, convert_bmg_to_txt, convert_bmg_to_txt_with_progress};
pub use txt_to_bmg::{convert_txt_to_bmg, convert_txt_to_bmg_with_progress, text_to_bmg_bytes};
