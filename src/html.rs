//! Markup string builders.
//!
//! [`html`] joins literal segments and interpolated values the way a tagged
//! template does: `segments[0] + values[0] + segments[1] + ...`. A missing
//! value (`None`, `()`) contributes nothing. The [`html!`](crate::html!)
//! macro is the everyday spelling:
//!
//! ```
//! use dim::html;
//!
//! let name: Option<&str> = None;
//! assert_eq!(html!("<a>", name, "</a>"), "<a></a>");
//! assert_eq!(html!("<b>", 3, "</b>"), "<b>3</b>");
//! ```
//!
//! Values are inserted verbatim, not escaped.

use std::fmt::Write;

/// A value that can be interpolated into markup.
pub trait Interpolate {
    /// Append this value's text to `out`.
    fn write_to(&self, out: &mut String);
}

impl Interpolate for str {
    fn write_to(&self, out: &mut String) {
        out.push_str(self);
    }
}

impl Interpolate for String {
    fn write_to(&self, out: &mut String) {
        out.push_str(self);
    }
}

impl Interpolate for char {
    fn write_to(&self, out: &mut String) {
        out.push(*self);
    }
}

impl Interpolate for bool {
    fn write_to(&self, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }
}

impl Interpolate for () {
    fn write_to(&self, _out: &mut String) {}
}

impl<T: Interpolate + ?Sized> Interpolate for &T {
    fn write_to(&self, out: &mut String) {
        (**self).write_to(out);
    }
}

impl<T: Interpolate> Interpolate for Option<T> {
    fn write_to(&self, out: &mut String) {
        if let Some(value) = self {
            value.write_to(out);
        }
    }
}

macro_rules! impl_interpolate_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Interpolate for $ty {
                fn write_to(&self, out: &mut String) {
                    let _ = write!(out, "{self}");
                }
            }
        )*
    };
}

impl_interpolate_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Join literal `segments` with interpolated `values`.
///
/// `values[i]` goes between `segments[i]` and `segments[i + 1]`. Values
/// without a following segment are still written; missing values write
/// nothing.
pub fn html(segments: &[&str], values: &[&dyn Interpolate]) -> String {
    let mut out = String::new();
    let Some((first, rest)) = segments.split_first() else {
        return out;
    };
    out.push_str(first);
    for (i, segment) in rest.iter().enumerate() {
        if let Some(value) = values.get(i) {
            value.write_to(&mut out);
        }
        out.push_str(segment);
    }
    out
}

/// Concatenate markup parts. Each part is any [`Interpolate`] value.
#[macro_export]
macro_rules! html {
    ($($part:expr),* $(,)?) => {{
        let mut out = ::std::string::String::new();
        $( $crate::html::Interpolate::write_to(&$part, &mut out); )*
        out
    }};
}

/// Serialize style declarations: `"prop: value; prop2: value2"`.
///
/// Order follows the input; no trailing separator.
pub fn style_map<K, V>(styles: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    styles
        .into_iter()
        .map(|(key, value)| format!("{}: {}", key.as_ref(), value.as_ref()))
        .collect::<Vec<_>>()
        .join("; ")
}
