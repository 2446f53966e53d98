use crate::key::Key;
use crate::value::Value;
use std::iter::FusedIterator;

/// Borrowing iterator over the entries of a `Collection` in order.
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, (Key, Value)>,
}

impl<'a> Iter<'a> {
    #[inline]
    pub(super) fn new(entries: &'a [(Key, Value)]) -> Self {
        Self {
            inner: entries.iter(),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Key, &'a Value);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.inner.nth(n).map(|(k, v)| (k, v))
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}

impl<'a> FusedIterator for Iter<'a> {}

/// Owning iterator over the entries of a `Collection`.
pub struct IntoIter {
    inner: std::vec::IntoIter<(Key, Value)>,
}

impl IntoIter {
    #[inline]
    pub(super) fn new(entries: Vec<(Key, Value)>) -> Self {
        Self {
            inner: entries.into_iter(),
        }
    }
}

impl Iterator for IntoIter {
    type Item = (Key, Value);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for IntoIter {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for IntoIter {}
