//! # ESC/POS Protocol Commands
//!
//! This module implements the ESC/POS command subset used by generic
//! Bluetooth receipt printers speaking the Serial Port Profile.
//!
//! ## Protocol Overview
//!
//! ESC/POS is a byte-oriented protocol where commands are escape sequences
//! interleaved with printable text. Receipt printing needs only two of them:
//!
//! - **Select print mode** (`ESC ! n`): character size and emphasis
//! - **Line feed** (`LF`): print the line buffer and advance paper
//!
//! ## Print Frame Structure
//!
//! A complete print job for one message is a single frame:
//!
//! ```text
//! ┌──────────────┬─────────────────┬───────────┐
//! │ ESC ! n      │ UTF-8 message   │ LF LF     │
//! │ (3 bytes)    │ (variable)      │ (2 bytes) │
//! └──────────────┴─────────────────┴───────────┘
//! ```
//!
//! The trailing double line feed advances the paper clear of the print head
//! so the receipt can be torn off.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
///
/// ESC/POS commands begin with ESC (0x1B). This byte signals the start of a
/// control sequence rather than printable text.
pub const ESC: u8 = 0x1B;

/// LF (Line Feed) - Print and advance one line
///
/// Prints any data in the line buffer and advances paper by the current
/// line spacing amount.
pub const LF: u8 = 0x0A;

/// Frame suffix: two line feeds.
///
/// Advances the printed text clear of the print head before the link is
/// torn down, so the receipt can be torn off without losing the last line.
pub const LINE_FEED_SUFFIX: [u8; 2] = [LF, LF];

// ============================================================================
// PRINT MODE SELECTION
// ============================================================================

/// # Text Style (ESC ! n)
///
/// Selects character size and emphasis for subsequent text.
///
/// ## Protocol Details
///
/// | Style      | Bytes      | Effect                 |
/// |------------|------------|------------------------|
/// | Normal     | `1B 21 00` | Normal size text       |
/// | Bold       | `1B 21 08` | Emphasized             |
/// | BoldMedium | `1B 21 20` | Emphasized, 2x width   |
/// | BoldLarge  | `1B 21 10` | Emphasized, 2x height  |
///
/// [`TextStyle::Normal`] is the default used by the print dispatcher; the
/// other styles are selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    /// Normal size text
    #[default]
    Normal,
    /// Bold text
    Bold,
    /// Bold with medium (double-width) text
    BoldMedium,
    /// Bold with large (double-height) text
    BoldLarge,
}

impl TextStyle {
    /// The 3-byte `ESC ! n` mode-select sequence for this style.
    #[inline]
    pub fn prefix(self) -> [u8; 3] {
        let n = match self {
            TextStyle::Normal => 0x00,
            TextStyle::Bold => 0x08,
            TextStyle::BoldMedium => 0x20,
            TextStyle::BoldLarge => 0x10,
        };
        [ESC, b'!', n]
    }
}

/// # Build a Print Frame
///
/// Assembles the complete byte sequence for one printed message:
/// style prefix, UTF-8 message bytes, double line feed.
///
/// The message encoding is pinned to UTF-8. Printers configured for a
/// different codepage will mangle non-ASCII characters; ASCII is safe
/// everywhere.
///
/// ## Example
///
/// ```
/// use recibo::protocol::{TextStyle, text_frame};
///
/// let frame = text_frame("HELLO", TextStyle::Normal);
/// assert_eq!(
///     frame,
///     vec![0x1B, 0x21, 0x00, b'H', b'E', b'L', b'L', b'O', 0x0A, 0x0A]
/// );
/// ```
pub fn text_frame(message: &str, style: TextStyle) -> Vec<u8> {
    let mut frame = Vec::with_capacity(message.len() + 5);
    frame.extend_from_slice(&style.prefix());
    frame.extend_from_slice(message.as_bytes());
    frame.extend_from_slice(&LINE_FEED_SUFFIX);
    frame
}

// ============================================================================
// TESTS
// ============================================================================
