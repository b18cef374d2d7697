//! # Instrumentation Macros
//!
//! ```rust
//! use helix_trace::{define_channel, return_trace, trace, Depth};
//!
//! define_channel!(pub Apply = "APPLY", 1);
//!
//! struct Context {
//!     depth: Depth,
//! }
//!
//! struct Lookup;
//!
//! impl Lookup {
//!     fn apply(&self, c: &Context, index: usize) -> bool {
//!         let mut trace = trace!(Apply, bool, &c.depth, self, "index {}", index);
//!         return_trace!(trace, index % 2 == 0)
//!     }
//! }
//!
//! let c = Context { depth: Depth::new() };
//! assert!(Lookup.apply(&c, 4));
//! assert_eq!(c.depth.get(), 0);
//! ```
//!
//! Functions returning `()` bind the guard to a named variable and never
//! call `return_trace!`. Binding to `_` drops the guard at once.

/// Open a traced activation and evaluate to its guard.
///
/// `trace!(Channel, ReturnType, depth, object [, format, args...])`
///
/// - `depth`: `&Depth`, `Option<&Depth>` or `None`
/// - `object`: a reference whose address identifies the traced object, or
///   `_` for none
///
/// On a channel with threshold 0 this is a zero-sized [`NoTrace`](crate::NoTrace)
/// and none of `depth`, `object` or the message arguments is evaluated.
#[macro_export]
macro_rules! trace {
    ($chan:ty, $ret:ty, $depth:expr, _ $(, $($arg:tt)+)?) => {
        $crate::__trace_enter!($chan, $ret, $depth, ::core::option::Option::None, $($($arg)+)?)
    };
    ($chan:ty, $ret:ty, $depth:expr, $obj:expr $(, $($arg:tt)+)?) => {
        $crate::__trace_enter!($chan, $ret, $depth,
            ::core::option::Option::Some($crate::ObjectId::of($obj)), $($($arg)+)?)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __trace_enter {
    ($chan:ty, $ret:ty, $depth:expr, $object:expr, $($arg:tt)*) => {
        if <$chan as $crate::Channel>::LEVEL > 0 {
            $crate::level::enter::<$chan, $ret>(
                ::core::convert::Into::<::core::option::Option<&$crate::Depth>>::into($depth),
                $object,
                $crate::function_name!(),
                $crate::__trace_message!($($arg)*),
            )
        } else {
            $crate::level::enter::<$chan, $ret>(
                ::core::option::Option::None,
                ::core::option::Option::None,
                "",
                ::core::option::Option::None,
            )
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __trace_message {
    () => {
        ::core::option::Option::None
    };
    ($($arg:tt)+) => {
        ::core::option::Option::Some(::core::format_args!($($arg)+))
    };
}

/// Record the return value on `guard` and return it from the enclosing function.
///
/// The return line carries the line number of this invocation.
#[macro_export]
macro_rules! return_trace {
    ($guard:ident, $value:expr $(,)?) => {
        return $crate::TraceGuard::ret(&mut $guard, $value)
    };
}

/// Non-indented message with no function name.
///
/// `debug_msg!(Channel, object | _, format, args...)`
#[macro_export]
macro_rules! debug_msg {
    ($chan:ty, _, $($arg:tt)+) => {
        $crate::__debug_record!($chan, ::core::option::Option::None, ::core::option::Option::None,
            false, 0, $crate::Direction::Return, $($arg)+)
    };
    ($chan:ty, $obj:expr, $($arg:tt)+) => {
        $crate::__debug_record!($chan,
            ::core::option::Option::Some($crate::ObjectId::of($obj)),
            ::core::option::Option::None,
            false, 0, $crate::Direction::Return, $($arg)+)
    };
}

/// Non-indented message prefixed with the enclosing function's name.
#[macro_export]
macro_rules! debug_msg_func {
    ($chan:ty, _, $($arg:tt)+) => {
        $crate::__debug_record!($chan, ::core::option::Option::None,
            ::core::option::Option::Some($crate::function_name!()),
            false, 0, $crate::Direction::Return, $($arg)+)
    };
    ($chan:ty, $obj:expr, $($arg:tt)+) => {
        $crate::__debug_record!($chan,
            ::core::option::Option::Some($crate::ObjectId::of($obj)),
            ::core::option::Option::Some($crate::function_name!()),
            false, 0, $crate::Direction::Return, $($arg)+)
    };
}

/// Indented message at an explicit depth and direction.
///
/// `debug_msg_level!(Channel, object | _, depth, Direction, format, args...)`
#[macro_export]
macro_rules! debug_msg_level {
    ($chan:ty, _, $depth:expr, $dir:expr, $($arg:tt)+) => {
        $crate::__debug_record!($chan, ::core::option::Option::None, ::core::option::Option::None,
            true, $depth, $dir, $($arg)+)
    };
    ($chan:ty, $obj:expr, $depth:expr, $dir:expr, $($arg:tt)+) => {
        $crate::__debug_record!($chan,
            ::core::option::Option::Some($crate::ObjectId::of($obj)),
            ::core::option::Option::None,
            true, $depth, $dir, $($arg)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __debug_record {
    ($chan:ty, $object:expr, $func:expr, $indented:expr, $depth:expr, $dir:expr, $($arg:tt)+) => {
        if <$chan as $crate::Channel>::LEVEL > 0 {
            let _ = $crate::record::emit::<$chan>(&$crate::Record {
                channel: <$chan as $crate::Channel>::NAME,
                object: $object,
                func: $func,
                indented: $indented,
                depth: $depth,
                direction: $dir,
                message: ::core::option::Option::Some(::core::format_args!($($arg)+)),
            });
        }
    };
}

/// Whether `Channel` emits anything at all
#[macro_export]
macro_rules! debug_enabled {
    ($chan:ty) => {
        <$chan as $crate::Channel>::enabled(0)
    };
}

/// Whether `Channel` emits events at `level`
#[macro_export]
macro_rules! debug_level_enabled {
    ($chan:ty, $level:expr) => {
        <$chan as $crate::Channel>::enabled($level)
    };
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use crate::guard::Depth;
    use crate::record::Direction;
    use crate::sink::capture;

    crate::define_channel!(Apply = "APPLY", 1);
    crate::define_channel!(Closure = "CLOSURE", 4);
    crate::define_channel!(Blob = "BLOB", 1);
    crate::define_channel!(Quiet = "QUIET", 0);

    struct Context {
        depth: Depth,
        index: usize,
    }

    struct Lookup {
        children: u32,
    }

    impl Lookup {
        fn apply(&self, c: &Context) -> bool {
            let mut trace = crate::trace!(Apply, bool, &c.depth, self, "index {}", c.index);
            crate::return_trace!(trace, self.children % 2 == 0)
        }

        fn closure(&self, c: &Context, remaining: u32) {
            let _trace = crate::trace!(Closure, (), &c.depth, self);
            if remaining > 0 {
                self.closure(c, remaining - 1);
            }
        }

        fn quiet(&self, c: &Context, evaluations: &Cell<u32>) -> u32 {
            let mut trace = crate::trace!(
                Quiet,
                u32,
                counted(evaluations, &c.depth),
                counted(evaluations, self),
                "{} children",
                counted(evaluations, self.children)
            );
            crate::return_trace!(trace, self.children)
        }
    }

    fn counted<T>(evaluations: &Cell<u32>, value: T) -> T {
        evaluations.set(evaluations.get() + 1);
        value
    }

    fn unreachable_message() -> &'static str {
        panic!("disabled channel formatted its message")
    }

    fn context() -> Context {
        Context { depth: Depth::new(), index: 3 }
    }

    #[test]
    fn test_apply_enter_and_return() {
        let c = context();
        let lookup = Lookup { children: 2 };
        let (result, captured) = capture(|| lookup.apply(&c));
        assert!(result);
        assert_eq!(c.depth.get(), 0);
        assert_eq!(captured.lines.len(), 2, "{:?}", captured.lines);

        let object = alloc::format!("({:0w$x})", &lookup as *const Lookup as usize, w = crate::record::OBJECT_WIDTH);
        assert!(captured.lines[0].starts_with("APPLY     "));
        assert!(captured.lines[0].contains(&object));
        assert!(captured.lines[0].contains(" 1 │├╮"));
        assert!(captured.lines[0].ends_with("apply: index 3"), "{}", captured.lines[0]);
        assert!(captured.lines[1].contains(" 1 │├╴: return true (line "));
    }

    #[test]
    fn test_void_recursion_exits() {
        let c = context();
        let lookup = Lookup { children: 0 };
        let (_, captured) = capture(|| lookup.closure(&c, 2));
        assert_eq!(c.depth.get(), 0);
        assert!(captured.bugs.is_empty());
        let lines = &captured.lines;
        assert_eq!(lines.len(), 6, "{:?}", lines);
        assert!(lines[2].contains(" 3 │││├╮"));
        assert!(lines[3].contains(" 3 │││├╯"));
        assert!(lines[5].contains(" 1 │├╯"));
    }

    #[test]
    fn test_disabled_channel_is_silent() {
        let c = context();
        let lookup = Lookup { children: 7 };
        let evaluations = Cell::new(0);
        let (value, captured) = capture(|| lookup.quiet(&c, &evaluations));
        assert_eq!(value, 7);
        assert_eq!(c.depth.get(), 0);
        assert_eq!(evaluations.get(), 0);
        assert!(captured.lines.is_empty());
    }

    #[test]
    fn test_enabled_channel_evaluates_arguments_once() {
        let c = context();
        let evaluations = Cell::new(0);
        let (_, captured) = capture(|| {
            let mut trace = crate::trace!(
                Apply,
                bool,
                counted(&evaluations, &c.depth),
                _,
                "{}",
                counted(&evaluations, 1)
            );
            crate::TraceGuard::ret(&mut trace, true)
        });
        assert_eq!(evaluations.get(), 2);
        assert_eq!(captured.lines.len(), 2);
        assert!(captured.lines[0].ends_with(": 1"));
    }

    #[test]
    fn test_debug_msg_forms() {
        let blob = [0u8; 4];
        let (_, captured) = capture(|| {
            debug_msg!(Blob, _, "{} bytes", blob.len());
            debug_msg!(Blob, &blob, "sanitized");
            debug_msg_func!(Blob, _, "done");
            debug_msg!(Quiet, _, "{}", unreachable_message());
        });
        let lines = &captured.lines;
        assert_eq!(lines.len(), 3, "{:?}", lines);
        assert!(lines[0].starts_with("BLOB      "));
        assert!(lines[0].ends_with("   ├╴: 4 bytes"));
        assert!(lines[1].starts_with("BLOB      ("));
        assert!(lines[2].contains("test_debug_msg_forms: done"), "{}", lines[2]);
    }

    #[test]
    fn test_debug_msg_level_gated() {
        let (_, captured) = capture(|| {
            debug_msg_level!(Apply, _, 1, Direction::Return, "shallow");
            debug_msg_level!(Apply, _, 2, Direction::Return, "deep");
            debug_msg_level!(Closure, _, 2, Direction::Enter, "opening");
        });
        assert_eq!(captured.lines.len(), 2);
        assert!(captured.lines[0].ends_with(" 1 │├╴: shallow"));
        assert!(captured.lines[1].ends_with(" 2 ││├╮: opening"));
    }

    #[test]
    fn test_enabled_queries() {
        assert!(debug_enabled!(Apply));
        assert!(!debug_enabled!(Quiet));
        assert!(debug_level_enabled!(Closure, 3));
        assert!(!debug_level_enabled!(Closure, 4));
        assert!(!debug_level_enabled!(Apply, 1));
    }
}
