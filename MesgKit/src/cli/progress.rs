//! CLI progress display utilities
//!
//! Step indicators with emojis for single-file operations.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::HumanDuration;

use crate::converter::{ConvertPhase, ConvertProgress};

/// Magnifying glass - for reading/scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Document - for parsing operations
pub static DOCUMENT: Emoji<'_, '_> = Emoji("📄 ", "");
/// Gear - for processing/conversion operations
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// Print a step indicator: `[1/4] 🔍 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{SPARKLE} Done in {}", HumanDuration(elapsed));
}

/// Progress callback for the converters that prints one step per phase
pub fn print_convert_progress(progress: &ConvertProgress) {
    let emoji = match progress.phase {
        ConvertPhase::ReadingSource => LOOKING_GLASS,
        ConvertPhase::Parsing => DOCUMENT,
        ConvertPhase::Converting => GEAR,
        ConvertPhase::WritingOutput => DISK,
        // Reported separately with the elapsed time
        ConvertPhase::Complete => return,
    };
    let msg = progress.message.as_deref().unwrap_or("");
    print_step(progress.current, progress.total, emoji, msg);
}
