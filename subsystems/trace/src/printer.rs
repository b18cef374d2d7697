//! # Value Printer
//!
//! Renders the value a traced function returns. The audience is a person
//! reading a trace, so types without a dedicated rendering print the
//! placeholder `something`.
//!
//! Downstream crates opt their own types in without touching this crate:
//!
//! ```rust
//! use core::fmt;
//! use helix_trace::TracePrint;
//!
//! struct GlyphId(u16);
//!
//! impl TracePrint for GlyphId {
//!     fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "gid {}", self.0)
//!     }
//! }
//!
//! /// Rendered as the placeholder
//! struct Lookup;
//! impl TracePrint for Lookup {}
//! ```

use core::fmt;

/// Text rendered for values without a dedicated printer
pub const PLACEHOLDER: &str = "something";

/// Display rendering of a traced return value
pub trait TracePrint {
    /// Whether an activation returning this type must record its return.
    ///
    /// `false` only for the no-value type `()`.
    const NEEDS_RETURN: bool = true;

    /// Write the display form of `self`
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(PLACEHOLDER)
    }
}

/// `Display` adapter over a [`TracePrint`] value
pub struct Printed<'a, T: TracePrint + ?Sized>(pub &'a T);

impl<T: TracePrint + ?Sized> fmt::Display for Printed<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.print(f)
    }
}

impl<T: TracePrint + ?Sized> fmt::Debug for Printed<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.print(f)
    }
}

// =============================================================================
// BUILT-IN PRINTERS
// =============================================================================

impl TracePrint for bool {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if *self { "true" } else { "false" })
    }
}

impl TracePrint for () {
    const NEEDS_RETURN: bool = false;

    fn print(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

macro_rules! impl_display_print {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TracePrint for $ty {
                fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(self, f)
                }
            }
        )*
    };
}

impl_display_print!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char, str);

impl<T: TracePrint + ?Sized> TracePrint for &T {
    const NEEDS_RETURN: bool = T::NEEDS_RETURN;

    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).print(f)
    }
}

impl<T: TracePrint + ?Sized> TracePrint for &mut T {
    const NEEDS_RETURN: bool = T::NEEDS_RETURN;

    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).print(f)
    }
}

impl<T: TracePrint> TracePrint for Option<T> {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(v) => {
                f.write_str("Some(")?;
                v.print(f)?;
                f.write_str(")")
            },
            None => f.write_str("None"),
        }
    }
}

impl<T: TracePrint, E: TracePrint> TracePrint for Result<T, E> {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ok(v) => {
                f.write_str("Ok(")?;
                v.print(f)?;
            },
            Err(e) => {
                f.write_str("Err(")?;
                e.print(f)?;
            },
        }
        f.write_str(")")
    }
}

/// Give several types the placeholder rendering at once.
///
/// ```rust
/// struct Coverage;
/// struct ClassDef;
/// helix_trace::trace_print_opaque!(Coverage, ClassDef);
/// ```
#[macro_export]
macro_rules! trace_print_opaque {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::TracePrint for $ty {})+
    };
}

// =============================================================================
// TESTS
// =============================================================================
