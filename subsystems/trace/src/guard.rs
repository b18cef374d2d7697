//! # Trace Guards
//!
//! A guard stands for one activation of a traced function. It is bound at
//! function entry and released when the activation's scope ends, on every
//! exit path.
//!
//! ```text
//!                 new()                 ret(v)
//!   ─────────▶ [Unreturned] ──────────────────────▶ [Returned]
//!              depth += 1    emit "return v",        │ ret(v) again:
//!              emit enter    depth -= 1              │ report double return
//!                  │                                 │
//!                  │ drop                            │ drop: nothing
//!                  ▼                                 ▼
//!   report missing return (unless R = ())       [Destroyed]
//!   emit forced exit, depth -= 1
//! ```
//!
//! [`NoTrace`] has the same surface and no state at all; channels with a
//! zero threshold construct it instead of [`AutoTrace`].

use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;

use crate::level::Channel;
use crate::printer::{Printed, TracePrint};
use crate::record::{emit, Direction, ObjectId, Record};
use crate::sink::with_sink;

/// Reported when an activation ends without recording its return value
pub const MISSING_RETURN_MESSAGE: &str =
    "BUG: traced function returned without calling return_trace!(); please report.\n";

/// Reported when an activation records its return value twice
pub const DOUBLE_RETURN_MESSAGE: &str =
    "BUG: return_trace!() called twice for one traced activation; please report.\n";

// =============================================================================
// DEPTH COUNTER
// =============================================================================

/// Nesting depth of traced activations within one operation
///
/// Owned by the operation's context and shared by reference with every
/// guard below it. Not `Sync`: concurrent operations use separate counters.
#[derive(Debug, Default)]
pub struct Depth(Cell<u32>);

static_assertions::assert_not_impl_any!(Depth: Sync);

impl Depth {
    /// Counter at zero
    pub const fn new() -> Self {
        Self(Cell::new(0))
    }

    /// Current depth
    #[inline]
    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// Increment and return the new depth
    #[inline]
    pub fn enter(&self) -> u32 {
        let depth = self.0.get().saturating_add(1);
        self.0.set(depth);
        depth
    }

    /// Decrement, never below zero
    #[inline]
    pub fn leave(&self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

// =============================================================================
// GUARD TRAIT
// =============================================================================

/// Surface shared by the active and the no-op guard
pub trait TraceGuard<R> {
    /// Record `value` as this activation's return value and pass it through.
    ///
    /// Call exactly once per activation; [`return_trace!`](crate::return_trace)
    /// makes that the `return` expression.
    #[track_caller]
    fn ret(&mut self, value: R) -> R;
}

// =============================================================================
// ACTIVE GUARD
// =============================================================================

/// Active guard of channel `C` for a function returning `R`
#[must_use = "a trace guard must be bound to a variable for the activation's lifetime"]
pub struct AutoTrace<'a, C: Channel, R: TracePrint> {
    depth: Option<&'a Depth>,
    object: Option<ObjectId>,
    func: &'static str,
    returned: bool,
    _marker: PhantomData<(fn() -> C, fn(R) -> R)>,
}

impl<'a, C: Channel, R: TracePrint> AutoTrace<'a, C, R> {
    /// Open an activation: bump `depth` and emit the enter line
    pub fn new(
        depth: Option<&'a Depth>,
        object: Option<ObjectId>,
        func: &'static str,
        message: Option<fmt::Arguments<'_>>,
    ) -> Self {
        let level = depth.map_or(0, Depth::enter);
        emit::<C>(&Record {
            channel: C::NAME,
            object,
            func: Some(func),
            indented: true,
            depth: level,
            direction: Direction::Enter,
            message,
        });

        Self {
            depth,
            object,
            func,
            returned: false,
            _marker: PhantomData,
        }
    }

    /// Whether the return value has been recorded
    pub fn has_returned(&self) -> bool {
        self.returned
    }

    fn current_depth(&self) -> u32 {
        self.depth.map_or(0, Depth::get)
    }
}

impl<C: Channel, R: TracePrint> TraceGuard<R> for AutoTrace<'_, C, R> {
    #[track_caller]
    fn ret(&mut self, value: R) -> R {
        if self.returned {
            with_sink(|s| s.report_bug(DOUBLE_RETURN_MESSAGE));
            return value;
        }

        let line = core::panic::Location::caller().line();
        emit::<C>(&Record {
            channel: C::NAME,
            object: self.object,
            func: None,
            indented: true,
            depth: self.current_depth(),
            direction: Direction::Return,
            message: Some(format_args!("return {} (line {})", Printed(&value), line)),
        });

        if let Some(depth) = self.depth {
            depth.leave();
        }
        self.returned = true;
        value
    }
}

impl<C: Channel, R: TracePrint> Drop for AutoTrace<'_, C, R> {
    fn drop(&mut self) {
        if self.returned {
            return;
        }

        if R::NEEDS_RETURN {
            with_sink(|s| s.report_bug(MISSING_RETURN_MESSAGE));
        }

        emit::<C>(&Record {
            channel: C::NAME,
            object: self.object,
            func: Some(self.func),
            indented: true,
            depth: self.current_depth(),
            direction: Direction::Exit,
            message: None,
        });

        if let Some(depth) = self.depth {
            depth.leave();
        }
    }
}

impl<C: Channel, R: TracePrint> fmt::Debug for AutoTrace<'_, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoTrace")
            .field("channel", &C::NAME)
            .field("func", &self.func)
            .field("depth", &self.current_depth())
            .field("returned", &self.returned)
            .finish()
    }
}

// =============================================================================
// NO-OP GUARD
// =============================================================================

/// Guard of a disabled channel: no state, no output
#[must_use = "a trace guard must be bound to a variable for the activation's lifetime"]
pub struct NoTrace<R>(PhantomData<fn(R) -> R>);

static_assertions::assert_eq_size!(NoTrace<u64>, ());
static_assertions::assert_eq_size!(NoTrace<[u8; 64]>, ());

impl<R> NoTrace<R> {
    /// The no-op guard
    #[inline(always)]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R> Default for NoTrace<R> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<R> TraceGuard<R> for NoTrace<R> {
    #[inline(always)]
    fn ret(&mut self, value: R) -> R {
        value
    }
}

impl<R> fmt::Debug for NoTrace<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoTrace")
    }
}

// =============================================================================
// TESTS
// =============================================================================
