//! Iterator adapters.

use std::fmt::Debug;

/// Zips two iterators that are expected to have the same number of elements.
///
/// # Panics
///
/// Unlike [`Iterator::zip`], the returned iterator panics when one of the
/// iterators yields more elements than the other.
pub fn zip_exact<A, B>(a: A, b: B) -> ZipExact<A::IntoIter, B::IntoIter>
where
    A: IntoIterator,
    B: IntoIterator,
{
    ZipExact {
        a: a.into_iter(),
        b: b.into_iter(),
    }
}

pub struct ZipExact<A, B> {
    a: A,
    b: B,
}

impl<A: Iterator, B: Iterator> Iterator for ZipExact<A, B>
where
    A::Item: Debug,
    B::Item: Debug,
{
    type Item = (A::Item, B::Item);

    fn next(&mut self) -> Option<Self::Item> {
        match (self.a.next(), self.b.next()) {
            (Some(a), Some(b)) => Some((a, b)),
            (None, None) => None,
            (a, b) => panic!("zip_exact: iterators have different lengths ({a:?} vs. {b:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_lengths() {
        let pairs: Vec<_> = zip_exact([1, 2], ["a", "b"]).collect();
        assert_eq!(pairs, [(1, "a"), (2, "b")]);
    }

    #[test]
    #[should_panic = "different lengths"]
    fn unequal_lengths() {
        zip_exact([1, 2, 3], ["a"]).count();
    }
}
