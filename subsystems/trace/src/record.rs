//! # Trace Records and Line Emitter
//!
//! One record becomes one line:
//!
//! ```text
//! APPLY     (000000000000abcd)  1 │├╮my_font::gsub::Single::apply: idx 3 gid 42
//! APPLY     (000000000000abcd)  2 ││├╮my_font::coverage::Coverage::get
//! APPLY     (000000000000abcd)  2 ││├╴: return 5 (line 88)
//! APPLY     (000000000000abcd)  1 │├╴: return true (line 41)
//! BLOB                            ├╴my_font::blob::Blob::sanitize: 128 bytes
//! └── name ┘└──── object ─────┘└─┘└┘└─ function ──────────────┘  └ message
//!                           depth  bars + branch
//! ```
//!
//! Lines are assembled in a fixed stack buffer and written in one call, so
//! concurrent writers never split a line.

use core::fmt::{self, Write};

use arrayvec::ArrayString;

use crate::func::sanitize;
use crate::level::{enabled, Channel};
use crate::sink;

// =============================================================================
// LAYOUT CONSTANTS
// =============================================================================

/// Width of the channel-name column
pub const NAME_WIDTH: usize = 10;

/// Hex digits of an object identity
pub const OBJECT_WIDTH: usize = 2 * core::mem::size_of::<usize>();

/// Deepest nesting rendered with bars; deeper records still show their depth number
pub const MAX_RENDER_DEPTH: u32 = 50;

/// Capacity of one rendered line in bytes
pub const LINE_CAPACITY: usize = 512;

const VBAR: &str = "\u{2502}"; // │
const VRBAR: &str = "\u{251C}"; // ├
const DLBAR: &str = "\u{256E}"; // ╮
const ULBAR: &str = "\u{256F}"; // ╯
const LBAR: &str = "\u{2574}"; // ╴
const ELLIPSIS: &str = "\u{2026}"; // …

static_assertions::const_assert!(MAX_RENDER_DEPTH > 0);
// bars alone must leave room for the rest of the line
static_assertions::const_assert!((MAX_RENDER_DEPTH as usize) * 3 + 64 < LINE_CAPACITY);

// =============================================================================
// RECORD
// =============================================================================

/// Address-sized identity of the traced object, only ever displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

impl ObjectId {
    /// Identity of `object` (its address)
    #[inline(always)]
    pub fn of<T: ?Sized>(object: &T) -> Self {
        Self((object as *const T).cast::<()>() as usize)
    }
}

impl From<usize> for ObjectId {
    fn from(raw: usize) -> Self {
        Self(raw)
    }
}

/// Position of a record in the activation tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Activation opened (`╮`)
    Enter,
    /// Return recorded, or a plain message at a depth (`╴`)
    Return,
    /// Activation closed without a return record (`╯`)
    Exit,
}

impl Direction {
    fn glyph(self) -> &'static str {
        match self {
            Self::Enter => DLBAR,
            Self::Return => LBAR,
            Self::Exit => ULBAR,
        }
    }
}

/// One diagnostic event, serialized immediately
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Channel display name
    pub channel: &'static str,
    /// Traced object, if any
    pub object: Option<ObjectId>,
    /// Raw function signature or path, sanitized when rendered
    pub func: Option<&'a str>,
    /// Render depth number, bars and a direction glyph
    pub indented: bool,
    /// Nesting depth (1 for the outermost traced activation)
    pub depth: u32,
    /// Tree direction; ignored for non-indented records
    pub direction: Direction,
    /// Formatted message
    pub message: Option<fmt::Arguments<'a>>,
}

impl Record<'_> {
    /// Gate level: nesting level for indented records, 0 otherwise
    pub fn level(&self) -> u32 {
        if self.indented {
            self.depth.saturating_sub(1)
        } else {
            0
        }
    }
}

// =============================================================================
// LINE BUFFER
// =============================================================================

/// Fixed-capacity line that truncates instead of failing
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: ArrayString<LINE_CAPACITY>,
    truncated: bool,
}

impl LineBuffer {
    /// Empty line
    pub fn new() -> Self {
        Self {
            buf: ArrayString::new(),
            truncated: false,
        }
    }

    /// Text written so far
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Whether content was dropped
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Terminate the line, marking truncation with `…`
    pub fn finish(&mut self) -> &str {
        if self.truncated {
            let keep = LINE_CAPACITY - ELLIPSIS.len() - 1;
            let mut cut = self.buf.len().min(keep);
            while !self.buf.is_char_boundary(cut) {
                cut -= 1;
            }
            self.buf.truncate(cut);
            self.buf.push_str(ELLIPSIS);
        }
        self.buf.push('\n');
        &self.buf
    }
}

impl Write for LineBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        // one byte stays free for the newline
        let room = self.buf.remaining_capacity().saturating_sub(1);
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.buf.push_str(&s[..cut]);
        self.truncated = true;
        Ok(())
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Render `record` without the trailing newline
pub fn format_record<W: Write>(out: &mut W, record: &Record<'_>) -> fmt::Result {
    write!(out, "{:<width$}", record.channel, width = NAME_WIDTH)?;

    match record.object {
        Some(id) => write!(out, "({:0width$x}) ", id.0, width = OBJECT_WIDTH)?,
        None => write!(out, " {:width$}  ", "", width = OBJECT_WIDTH)?,
    }

    if record.indented {
        write!(out, "{:2} ", record.depth)?;
        for _ in 0..record.depth.min(MAX_RENDER_DEPTH) {
            out.write_str(VBAR)?;
        }
        out.write_str(VRBAR)?;
        out.write_str(record.direction.glyph())?;
    } else {
        out.write_str("   ")?;
        out.write_str(VRBAR)?;
        out.write_str(LBAR)?;
    }

    if let Some(func) = record.func {
        out.write_str(sanitize(func))?;
    }

    if let Some(message) = record.message {
        out.write_str(": ")?;
        out.write_fmt(message)?;
    }

    Ok(())
}

/// Emit `record` on channel `C` if its level passes the gate.
///
/// Returns whether a line was written.
#[inline]
pub fn emit<C: Channel>(record: &Record<'_>) -> bool {
    if !enabled(record.level(), C::LEVEL) {
        return false;
    }
    write_record(record);
    true
}

/// Render and write unconditionally
pub fn write_record(record: &Record<'_>) {
    let mut line = LineBuffer::new();
    // LineBuffer never fails; a failing user Display impl leaves a partial line
    let _ = format_record(&mut line, record);
    sink::with_sink(|s| s.write_line(line.finish()));
}

// =============================================================================
// TESTS
// =============================================================================
