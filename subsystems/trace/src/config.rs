//! # Build-Time Configuration
//!
//! Every threshold is an integer resolved before the program runs. The
//! global level comes from the `HELIX_TRACE` build variable and seeds all
//! channels; `HELIX_TRACE_<CHANNEL>` overrides a single channel.
//!
//! ```text
//!   HELIX_TRACE=1 HELIX_TRACE_SANITIZE=3 cargo build
//!
//!   ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//!   │ option_env!  │────▶│ parse_level()  │────▶│ TraceConfig /    │
//!   │ (build env)  │     │ (const fn)     │     │ channel LEVEL    │
//!   └──────────────┘     └────────────────┘     └──────────────────┘
//! ```
//!
//! A malformed value is a build error: const evaluation panics.

use core::fmt;

// =============================================================================
// ERRORS
// =============================================================================

/// Reasons a threshold string is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelError {
    /// The string was empty (after trimming spaces)
    Empty,
    /// A byte that is not an ASCII digit
    InvalidDigit {
        /// Byte offset of the offending character
        index: usize,
    },
    /// The value does not fit in a `u32`
    Overflow,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty trace level"),
            Self::InvalidDigit { index } => {
                write!(f, "invalid digit at offset {} in trace level", index)
            },
            Self::Overflow => write!(f, "trace level does not fit in 32 bits"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LevelError {}

/// Result type for level parsing
pub type LevelResult<T> = Result<T, LevelError>;

// =============================================================================
// PARSING
// =============================================================================

/// Parse a decimal threshold.
///
/// Leading and trailing spaces are ignored. Usable in const context.
pub const fn parse_level(text: &str) -> LevelResult<u32> {
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut end = bytes.len();

    while start < end && bytes[start] == b' ' {
        start += 1;
    }
    while end > start && bytes[end - 1] == b' ' {
        end -= 1;
    }
    if start == end {
        return Err(LevelError::Empty);
    }

    let mut value: u32 = 0;
    let mut i = start;
    while i < end {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return Err(LevelError::InvalidDigit { index: i });
        }
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((b - b'0') as u32) {
                Some(v) => v,
                None => return Err(LevelError::Overflow),
            },
            None => return Err(LevelError::Overflow),
        };
        i += 1;
    }

    Ok(value)
}

/// Resolve an optional build variable to a threshold.
///
/// `None` yields `default`. Panics (a build error in const context) if the
/// variable is set but malformed.
pub const fn resolve_level(value: Option<&str>, default: u32) -> u32 {
    if FORCE_OFF {
        return 0;
    }
    match value {
        None => default,
        Some(text) => match parse_level(text) {
            Ok(level) => level,
            Err(_) => panic!("HELIX_TRACE* build variable must be a non-negative decimal integer"),
        },
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "no-trace")] {
        /// Every threshold is forced to zero
        pub const FORCE_OFF: bool = true;
    } else {
        /// Every threshold is forced to zero
        pub const FORCE_OFF: bool = false;
    }
}

// =============================================================================
// GLOBAL CONFIGURATION
// =============================================================================

/// Read-only, build-time resolved tracing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceConfig {
    /// Global debug level; the default threshold of every channel
    pub debug: u32,
    /// Whether the `no-trace` feature zeroed everything
    pub forced_off: bool,
}

impl TraceConfig {
    /// Configuration taken from the build environment
    pub const fn from_build_env() -> Self {
        Self {
            debug: resolve_level(option_env!("HELIX_TRACE"), 0),
            forced_off: FORCE_OFF,
        }
    }

    /// Threshold for a channel given its optional override
    pub const fn channel_level(&self, value: Option<&str>) -> u32 {
        resolve_level(value, self.debug)
    }
}

/// The configuration this crate was built with
pub const CONFIG: TraceConfig = TraceConfig::from_build_env();

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        assert_eq!(parse_level("0"), Ok(0));
        assert_eq!(parse_level("7"), Ok(7));
        assert_eq!(parse_level("  12 "), Ok(12));
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(parse_level(""), Err(LevelError::Empty));
        assert_eq!(parse_level("   "), Err(LevelError::Empty));
        assert_eq!(parse_level("1x"), Err(LevelError::InvalidDigit { index: 1 }));
        assert_eq!(parse_level("-1"), Err(LevelError::InvalidDigit { index: 0 }));
        assert_eq!(parse_level("4294967296"), Err(LevelError::Overflow));
    }

    #[test]
    fn test_parse_max() {
        assert_eq!(parse_level("4294967295"), Ok(u32::MAX));
    }

    #[test]
    fn test_resolve_default() {
        if !FORCE_OFF {
            assert_eq!(resolve_level(None, 3), 3);
            assert_eq!(resolve_level(Some("5"), 3), 5);
        } else {
            assert_eq!(resolve_level(Some("5"), 3), 0);
        }
    }

    #[test]
    fn test_const_resolution() {
        const LEVEL: u32 = resolve_level(Some("2"), 0);
        assert_eq!(LEVEL, if FORCE_OFF { 0 } else { 2 });
    }

    #[test]
    fn test_channel_level_inherits_global() {
        let config = TraceConfig { debug: 4, forced_off: false };
        if !FORCE_OFF {
            assert_eq!(config.channel_level(None), 4);
            assert_eq!(config.channel_level(Some("1")), 1);
        }
    }

    #[test]
    fn test_error_display() {
        use alloc::string::ToString;
        assert_eq!(
            LevelError::InvalidDigit { index: 3 }.to_string(),
            "invalid digit at offset 3 in trace level"
        );
    }
}
