//! # Helix Trace
//!
//! Hierarchical call tracing for recursive-descent code (table sanitizers,
//! lookup appliers, serializers) that costs nothing when it is switched off.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                          HELIX TRACE PIPELINE                            │
//! │                                                                          │
//! │   HELIX_TRACE*  ──▶  Channel::LEVEL  ──▶  Switch<{ LEVEL > 0 }>          │
//! │   (build env)        (const)               │                             │
//! │                                   ┌────────┴─────────┐                   │
//! │                                   ▼                  ▼                   │
//! │                              AutoTrace            NoTrace (ZST)          │
//! │                                   │                                      │
//! │                 enter / return / forced exit records                     │
//! │                                   │                                      │
//! │                     level gate: depth - 1 < LEVEL                        │
//! │                                   ▼                                      │
//! │                        LineBuffer (stack, 512 B)                         │
//! │                                   ▼                                      │
//! │                    Sink (stderr │ memory │ custom)                       │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use helix_trace::{channels::Sanitize, return_trace, trace, Depth};
//!
//! struct SanitizeContext {
//!     depth: Depth,
//!     remaining: usize,
//! }
//!
//! struct Header {
//!     length: usize,
//! }
//!
//! impl Header {
//!     fn sanitize(&self, c: &mut SanitizeContext) -> bool {
//!         let mut trace = trace!(Sanitize, bool, &c.depth, self, "length {}", self.length);
//!         let ok = self.length <= c.remaining;
//!         if ok {
//!             c.remaining -= self.length;
//!         }
//!         return_trace!(trace, ok)
//!     }
//! }
//! ```
//!
//! Build with `HELIX_TRACE_SANITIZE=2` to see two levels of nesting, or with
//! the `no-trace` feature to compile every guard away.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(missing_docs)]

// =============================================================================
// EXTERNAL DEPENDENCIES
// =============================================================================

extern crate alloc;

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Build-time thresholds
pub mod config;

/// Compile-time gate and channel trait
pub mod level;

/// Built-in channel catalogue
pub mod channels;

/// Return value rendering
pub mod printer;

/// Function-name extraction
pub mod func;

/// Records and line layout
pub mod record;

/// Output destinations
pub mod sink;

/// Activation guards
pub mod guard;

/// Instrumentation macros
mod macros;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use config::{LevelError, LevelResult, TraceConfig, CONFIG};
pub use guard::{AutoTrace, Depth, NoTrace, TraceGuard};
pub use level::{enter, Channel, Gate, Guard, Switch};
pub use printer::{Printed, TracePrint};
pub use record::{Direction, ObjectId, Record};
pub use sink::{capture, reset_sink, restore_sink, set_sink, Capture, MemorySink, NullSink, ScopedSink, Sink};

#[cfg(feature = "std")]
pub use sink::StderrSink;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    define_channel!(Sanitize = "SANITIZE", 2);
    define_channel!(Dispatch = "DISPATCH", 3);
    define_channel!(Apply = "APPLY", 1);

    struct SanitizeContext {
        depth: Depth,
        data: &'static [u8],
    }

    #[derive(Debug)]
    struct Table {
        offset: usize,
        children: &'static [Table],
    }

    impl Table {
        fn sanitize(&self, c: &SanitizeContext) -> bool {
            let mut trace = trace!(Sanitize, bool, &c.depth, self, "offset {}", self.offset);
            if self.offset >= c.data.len() {
                return_trace!(trace, false);
            }
            for child in self.children {
                if !child.sanitize(c) {
                    return_trace!(trace, false);
                }
            }
            return_trace!(trace, true)
        }
    }

    fn dispatch<R: TracePrint>(depth: &Depth, f: impl FnOnce() -> R) -> R {
        let mut trace = trace!(Dispatch, R, depth, _);
        return_trace!(trace, f())
    }

    /// Result of a shaping step, opaque to the tracer
    struct Shaped;
    trace_print_opaque!(Shaped);

    const LEAF: Table = Table { offset: 1, children: &[] };
    const BROKEN: Table = Table { offset: 99, children: &[] };

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_single_apply_activation() {
        let depth = Depth::new();
        let ((), captured) = capture(|| {
            let mut trace = enter::<Apply, bool>(Some(&depth), Some(ObjectId(0xABCD)), "static bool apply(ctx *c)", None);
            assert!(trace.ret(true));
        });
        assert_eq!(depth.get(), 0);
        assert_eq!(captured.lines.len(), 2);
        let object = alloc::format!("({:0w$x})", 0xABCD, w = record::OBJECT_WIDTH);
        assert_eq!(captured.lines[0], alloc::format!("APPLY     {}  1 │├╮apply", object));
        assert!(captured.lines[1].starts_with(&alloc::format!("APPLY     {}  1 │├╴: return true (line ", object)));
    }

    #[test]
    fn test_recursive_sanitize_tree() {
        static TWO_LEAVES: [Table; 2] = [LEAF, LEAF];
        let root = Table { offset: 0, children: &TWO_LEAVES };
        let c = SanitizeContext { depth: Depth::new(), data: &[0; 8] };

        let (ok, captured) = capture(|| root.sanitize(&c));
        assert!(ok);
        assert_eq!(c.depth.get(), 0);
        assert!(captured.bugs.is_empty());

        let lines = &captured.lines;
        assert_eq!(lines.len(), 6, "{:?}", lines);
        assert!(lines[0].contains(" 1 │├╮"));
        assert!(lines[0].ends_with("sanitize: offset 0"));
        assert!(lines[1].contains(" 2 ││├╮"));
        assert!(lines[2].contains(" 2 ││├╴: return true"));
        assert!(lines[5].contains(" 1 │├╴: return true"));
    }

    #[test]
    fn test_early_return_restores_depth() {
        static MIXED: [Table; 2] = [BROKEN, LEAF];
        let root = Table { offset: 0, children: &MIXED };
        let c = SanitizeContext { depth: Depth::new(), data: &[0; 8] };

        let (ok, captured) = capture(|| root.sanitize(&c));
        assert!(!ok);
        assert_eq!(c.depth.get(), 0);
        // the second child is never visited
        assert_eq!(captured.lines.len(), 4, "{:?}", captured.lines);
        assert_eq!(captured.lines.iter().filter(|l| l.contains("return false")).count(), 2);
    }

    #[test]
    fn test_dispatch_generic_return() {
        let depth = Depth::new();
        let ((count, _shaped), captured) = capture(|| {
            let count = dispatch(&depth, || 3u32);
            let shaped = dispatch(&depth, || Shaped);
            (count, shaped)
        });
        assert_eq!(count, 3);
        assert_eq!(depth.get(), 0);
        assert!(captured.lines[1].contains("return 3 (line "));
        assert!(captured.lines[3].contains("return something (line "));
        assert!(captured.lines[0].starts_with("DISPATCH  "));
    }

    #[test]
    fn test_sink_round_trip() {
        static SINK: MemorySink = MemorySink::new();
        let (_, _) = capture(|| {
            let previous = set_sink(&SINK);
            debug_msg!(Apply, _, "to memory");
            restore_sink(previous);
        });
        assert_eq!(SINK.take_lines().len(), 1);
    }
}
