use std::sync::Arc;

/// Detects the "absent" sentinel of a key or value type.
///
/// The cache refuses to store absent keys or values. Types with no such
/// sentinel implement [`AlwaysPresent`] instead.
pub trait Presence {
    fn is_absent(&self) -> bool;
}

impl<T: Presence> Presence for Option<T> {
    fn is_absent(&self) -> bool {
        match self {
            Some(inner) => inner.is_absent(),
            None => true,
        }
    }
}

impl Presence for String {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl Presence for &str {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Presence + ?Sized> Presence for Arc<T> {
    fn is_absent(&self) -> bool {
        T::is_absent(self)
    }
}

impl<T> Presence for T
where
    T: AlwaysPresent,
{
    fn is_absent(&self) -> bool {
        false
    }
}

/// Marker for types where every value counts as present.
///
/// ```
/// use bounded_lru::{AlwaysPresent, BoundedLru};
///
/// #[derive(Clone, PartialEq, Eq, Hash)]
/// struct UserId(u64);
/// impl AlwaysPresent for UserId {}
///
/// let cache = BoundedLru::new(8).unwrap();
/// cache.add_or_update(UserId(7), 42u32).unwrap();
/// ```
pub trait AlwaysPresent {}

impl AlwaysPresent for u8 {}
impl AlwaysPresent for u16 {}
impl AlwaysPresent for u32 {}
impl AlwaysPresent for u64 {}
impl AlwaysPresent for u128 {}
impl AlwaysPresent for usize {}

impl AlwaysPresent for i8 {}
impl AlwaysPresent for i16 {}
impl AlwaysPresent for i32 {}
impl AlwaysPresent for i64 {}
impl AlwaysPresent for i128 {}
impl AlwaysPresent for isize {}

impl AlwaysPresent for f32 {}
impl AlwaysPresent for f64 {}
impl AlwaysPresent for bool {}
impl AlwaysPresent for char {}
impl AlwaysPresent for () {}

impl<T> AlwaysPresent for Vec<T> {}
impl<A: AlwaysPresent, B: AlwaysPresent> AlwaysPresent for (A, B) {}
