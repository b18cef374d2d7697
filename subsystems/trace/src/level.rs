//! # Level Gate
//!
//! A channel's threshold decides, at compile time, which guard type its
//! call sites construct:
//!
//! ```text
//!   Channel::THRESHOLD ──▶ Switch<{ THRESHOLD > 0 }> ──┬─ Switch<true>  ─▶ AutoTrace
//!                                                      └─ Switch<false> ─▶ NoTrace (ZST)
//! ```
//!
//! The selection is a type projection, so a disabled channel generates no
//! branch and no call. Inside an active channel each record is then gated
//! by [`enabled`] against its nesting level.

use core::fmt;

use crate::guard::{AutoTrace, Depth, NoTrace, TraceGuard};
use crate::printer::TracePrint;
use crate::record::ObjectId;

/// The gate predicate: an event at `level` fires iff `level < max_level`
#[inline(always)]
pub const fn enabled(level: u32, max_level: u32) -> bool {
    level < max_level
}

// =============================================================================
// CHANNEL
// =============================================================================

/// A named diagnostic category with a build-time threshold
///
/// Implemented by [`define_channel!`](crate::define_channel); implementing it
/// by hand is possible but the macro keeps `Gate` consistent with `LEVEL`.
pub trait Channel: 'static {
    /// Display name, rendered in the first column
    const NAME: &'static str;

    /// Threshold; 0 disables the channel entirely
    const LEVEL: u32;

    /// Guard selector derived from `LEVEL`
    type Gate: Gate;

    /// Whether an event at `level` passes this channel's gate
    #[inline(always)]
    fn enabled(level: u32) -> bool {
        enabled(level, Self::LEVEL)
    }
}

// =============================================================================
// GATE
// =============================================================================

/// Compile-time choice between the active and the no-op guard
pub trait Gate {
    /// Guard type constructed at call sites of channels using this gate
    type Guard<'a, C: Channel, R: TracePrint>: TraceGuard<R>;

    /// Construct the guard for one activation
    fn enter<'a, C: Channel, R: TracePrint>(
        depth: Option<&'a Depth>,
        object: Option<ObjectId>,
        func: &'static str,
        message: Option<fmt::Arguments<'_>>,
    ) -> Self::Guard<'a, C, R>;
}

/// Gate selector indexed by "threshold is non-zero"
#[derive(Debug, Clone, Copy)]
pub struct Switch<const ON: bool>;

impl Gate for Switch<true> {
    type Guard<'a, C: Channel, R: TracePrint> = AutoTrace<'a, C, R>;

    #[inline]
    fn enter<'a, C: Channel, R: TracePrint>(
        depth: Option<&'a Depth>,
        object: Option<ObjectId>,
        func: &'static str,
        message: Option<fmt::Arguments<'_>>,
    ) -> AutoTrace<'a, C, R> {
        AutoTrace::new(depth, object, func, message)
    }
}

impl Gate for Switch<false> {
    type Guard<'a, C: Channel, R: TracePrint> = NoTrace<R>;

    #[inline(always)]
    fn enter<'a, C: Channel, R: TracePrint>(
        _depth: Option<&'a Depth>,
        _object: Option<ObjectId>,
        _func: &'static str,
        _message: Option<fmt::Arguments<'_>>,
    ) -> NoTrace<R> {
        NoTrace::new()
    }
}

/// Guard type a call site on channel `C` returning `R` binds
pub type Guard<'a, C, R> = <<C as Channel>::Gate as Gate>::Guard<'a, C, R>;

/// Construct the guard for channel `C`.
///
/// Prefer the [`trace!`](crate::trace) macro, which fills in the function name.
#[inline(always)]
pub fn enter<'a, C: Channel, R: TracePrint>(
    depth: Option<&'a Depth>,
    object: Option<ObjectId>,
    func: &'static str,
    message: Option<fmt::Arguments<'_>>,
) -> Guard<'a, C, R> {
    <C::Gate as Gate>::enter::<C, R>(depth, object, func, message)
}

// =============================================================================
// CHANNEL DEFINITION
// =============================================================================

/// Declare a channel type.
///
/// ```rust
/// helix_trace::define_channel!(
///     /// Glyph cache lookups
///     pub GlyphCache = "GLYPHCACHE", 2
/// );
///
/// assert_eq!(GlyphCache::THRESHOLD, 2);
/// ```
///
/// The threshold may be any const `u32` expression, including
/// `CONFIG.channel_level(option_env!("..."))`.
#[macro_export]
macro_rules! define_channel {
    ($(#[$meta:meta])* $vis:vis $ty:ident = $name:literal, $level:expr $(,)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis struct $ty;

        impl $ty {
            /// Resolved threshold of this channel
            pub const THRESHOLD: u32 = $level;
        }

        impl $crate::Channel for $ty {
            const NAME: &'static str = $name;
            const LEVEL: u32 = $ty::THRESHOLD;
            type Gate = $crate::Switch<{ $ty::THRESHOLD > 0 }>;
        }
    };
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    crate::define_channel!(Off = "OFF", 0);
    crate::define_channel!(One = "ONE", 1);
    crate::define_channel!(Three = "THREE", 1 + 2);

    #[test]
    fn test_gate_boundary() {
        assert!(enabled(0, 1));
        assert!(!enabled(1, 1));
        assert!(enabled(2, 3));
        assert!(!enabled(3, 3));
        assert!(!enabled(0, 0));
    }

    #[test]
    fn test_channel_constants() {
        assert_eq!(<Off as Channel>::NAME, "OFF");
        assert_eq!(<Three as Channel>::LEVEL, 3);
        assert_eq!(Three::THRESHOLD, 3);
        assert!(One::enabled(0));
        assert!(!One::enabled(1));
        assert!(!Off::enabled(0));
    }

    #[test]
    fn test_disabled_channel_selects_no_trace() {
        fn is_no_trace<R>(_: &NoTrace<R>) {}
        let guard = enter::<Off, bool>(None, None, "f", None);
        is_no_trace(&guard);
        assert_eq!(core::mem::size_of_val(&guard), 0);
    }

    #[test]
    fn test_enabled_channel_selects_auto_trace() {
        fn is_auto_trace<C: Channel, R: TracePrint>(_: &AutoTrace<'_, C, R>) {}
        crate::sink::capture(|| {
            let mut guard = enter::<One, bool>(None, None, "f", None);
            is_auto_trace(&guard);
            guard.ret(true);
        });
    }
}
