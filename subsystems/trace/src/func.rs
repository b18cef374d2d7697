//! # Function Names
//!
//! Reduces a raw signature to the name shown in a trace line:
//!
//! | Input                                   | Output                 |
//! |-----------------------------------------|------------------------|
//! | `static bool foo(int x)`                | `foo`                  |
//! | `typename T bar()`                      | `bar`                  |
//! | `bool Lookup<A, B>::apply(Ctx *c) const`| `Lookup<A, B>::apply`  |
//! | `helix_font::gsub::Single::apply`       | unchanged              |
//!
//! Rust call sites get their raw name from [`function_name!`](crate::function_name).

const STATIC_PREFIX: &str = "static ";
const TYPENAME_PREFIX: &str = "typename ";

/// Strip storage class, `typename`, return type and parameter list.
///
/// Spaces and parentheses inside angle brackets belong to the identifier.
pub fn sanitize(raw: &str) -> &str {
    let mut func = raw.strip_prefix(STATIC_PREFIX).unwrap_or(raw);
    func = func.strip_prefix(TYPENAME_PREFIX).unwrap_or(func);

    let end = top_level_position(func, |b| b == b'(').unwrap_or(func.len());
    let head = func[..end].trim_end();
    let start = top_level_last_position(head, |b| b == b' ').map_or(0, |i| i + 1);
    &head[start..]
}

/// First byte outside angle brackets matching `pred`
fn top_level_position(text: &str, pred: impl Fn(u8) -> bool) -> Option<usize> {
    let mut nesting = 0usize;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'<' => nesting += 1,
            b'>' => nesting = nesting.saturating_sub(1),
            _ if nesting == 0 && pred(b) => return Some(i),
            _ => {},
        }
    }
    None
}

/// Last byte outside angle brackets matching `pred`
fn top_level_last_position(text: &str, pred: impl Fn(u8) -> bool) -> Option<usize> {
    let mut nesting = 0usize;
    let mut found = None;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'<' => nesting += 1,
            b'>' => nesting = nesting.saturating_sub(1),
            _ if nesting == 0 && pred(b) => found = Some(i),
            _ => {},
        }
    }
    found
}

/// Remove the marker item and closure segments `function_name!` leaves behind.
pub fn strip_path_markers(path: &'static str) -> &'static str {
    let mut path = path.strip_suffix("::__helix_trace_marker").unwrap_or(path);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path
}

#[doc(hidden)]
pub fn type_name_of<T>(_: T) -> &'static str {
    core::any::type_name::<T>()
}

/// Path of the enclosing function, e.g. `my_crate::gsub::Single::apply`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __helix_trace_marker() {}
        $crate::func::strip_path_markers($crate::func::type_name_of(__helix_trace_marker))
    }};
}

// =============================================================================
// TESTS
// =============================================================================
