use crate::value::Value;

/// Result of a `Collection::filter` predicate.
///
/// Only an exact `false` drops an element. Other falsy looking results like `0`, `""` or
/// `Value::Null` keep it.
pub trait Keep {
    fn keep(&self) -> bool;
}

impl Keep for bool {
    #[inline]
    fn keep(&self) -> bool {
        *self
    }
}

impl Keep for Value {
    #[inline]
    fn keep(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }
}

impl Keep for i64 {
    #[inline]
    fn keep(&self) -> bool {
        true
    }
}

impl Keep for () {
    #[inline]
    fn keep(&self) -> bool {
        true
    }
}

impl<T: Keep> Keep for Option<T> {
    #[inline]
    fn keep(&self) -> bool {
        self.as_ref().map_or(true, Keep::keep)
    }
}
