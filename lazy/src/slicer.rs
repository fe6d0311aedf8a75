//! The capability a payload needs to be stored in the leaves of an
//! [`Array`](crate::Array).

/// A payload that knows its length and can cut out a contiguous window of
/// itself.
///
/// The array never looks inside a payload. Positions are whatever unit
/// `len` counts in: bytes for strings, elements for slices and vectors.
pub trait Slicer: Sized {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the window `[offset, offset + count)`.
    ///
    /// The array only ever asks for windows that lie within `self.len()`,
    /// and never for empty ones.
    fn slice(&self, offset: usize, count: usize) -> Self;
}

/// A payload whose segments can be joined back into a single payload.
///
/// Only needed for flattening an array (and for the operations built on top
/// of it, like comparison and serialization).
pub trait Concat: Slicer {
    /// Joins `segments`, whose lengths add up to `len`.
    fn concat<I: IntoIterator<Item = Self>>(segments: I, len: usize) -> Self;
}

impl<'a> Slicer for &'a str {
    fn len(&self) -> usize {
        str::len(self)
    }

    // Like string indexing, this panics if the window doesn't fall on char
    // boundaries. Arrays only slice their leaves when traversed, so the panic
    // shows up in `for_each`/`segments`, not in `Array::slice`. Use `&[u8]`
    // for arbitrary byte offsets.
    fn slice(&self, offset: usize, count: usize) -> &'a str {
        &self[offset..offset + count]
    }
}

impl<'a, T> Slicer for &'a [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn slice(&self, offset: usize, count: usize) -> &'a [T] {
        &self[offset..offset + count]
    }
}

impl Slicer for String {
    fn len(&self) -> usize {
        String::len(self)
    }

    fn slice(&self, offset: usize, count: usize) -> String {
        self[offset..offset + count].to_owned()
    }
}

impl Concat for String {
    fn concat<I: IntoIterator<Item = Self>>(segments: I, len: usize) -> String {
        let mut ret = String::with_capacity(len);
        for segment in segments {
            ret.push_str(&segment);
        }
        ret
    }
}

impl<T: Clone> Slicer for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn slice(&self, offset: usize, count: usize) -> Vec<T> {
        self[offset..offset + count].to_vec()
    }
}

impl<T: Clone> Concat for Vec<T> {
    fn concat<I: IntoIterator<Item = Self>>(segments: I, len: usize) -> Vec<T> {
        let mut ret = Vec::with_capacity(len);
        for segment in segments {
            ret.extend(segment);
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_windows() {
        let s = "hello";
        assert_eq!(Slicer::slice(&s, 1, 3), "ell");
        assert_eq!(Slicer::len(&s), 5);

        let xs: &[u32] = &[1, 2, 3, 4];
        assert_eq!(Slicer::slice(&xs, 2, 2), &[3, 4]);
        assert!(!Slicer::is_empty(&xs));
    }

    #[test]
    #[should_panic(expected = "char boundary")]
    fn str_windows_split_chars() {
        let arr = crate::Array::new("h\u{e9}llo").slice(1, 1);
        assert_eq!(arr.len(), 1);
        arr.segments().for_each(drop);
    }

    #[test]
    fn byte_windows_split_chars() {
        let arr = crate::Array::new("h\u{e9}llo".as_bytes()).slice(1, 1);
        assert_eq!(arr.segments().collect::<Vec<_>>(), vec![&[0xc3][..]]);
    }

    #[test]
    fn owned_concat() {
        let s = String::from("jimbo");
        let parts = [Slicer::slice(&s, 0, 2), Slicer::slice(&s, 4, 1)];
        assert_eq!(<String as Concat>::concat(parts, 3), "jio");

        let v = vec![1, 2, 3];
        let joined = <Vec<_> as Concat>::concat([v.slice(1, 2), v.slice(0, 1)], 3);
        assert_eq!(joined, vec![2, 3, 1]);
    }
}
