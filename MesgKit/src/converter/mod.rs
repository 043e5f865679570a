//! Format conversion utilities
//!
//! This module handles conversions between the binary and text forms:
//! - BMG (binary) -> TXT (decoded, editable)
//! - TXT -> BMG

pub mod bmg;

/// Stage of a conversion, reported through [`ConvertProgressCallback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertPhase {
    ReadingSource,
    Parsing,
    Converting,
    WritingOutput,
    Complete,
}

/// Progress update for a single-file conversion
#[derive(Debug, Clone)]
pub struct ConvertProgress {
    pub phase: ConvertPhase,
    /// Current step (1-based)
    pub current: usize,
    pub total: usize,
    /// Human-readable description of the step, if any
    pub message: Option<String>,
}

impl ConvertProgress {
    #[must_use]
    pub fn new(phase: ConvertPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            message: None,
        }
    }

    /// Progress update carrying a step description
    #[must_use]
    pub fn with_file(
        phase: ConvertPhase,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            message: Some(message.into()),
        }
    }
}

/// Progress callback type for conversion operations.
pub type ConvertProgressCallback<'a> = &'a dyn Fn(&ConvertProgress);

// BMG conversion exports
pub use bmg::{
    bmg_to_text_string, convert_bmg_to_txt, convert_bmg_to_txt_with_progress,
    convert_txt_to_bmg, convert_txt_to_bmg_with_progress, text_to_bmg_bytes,
};
