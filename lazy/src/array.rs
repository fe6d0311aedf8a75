use std::{collections::HashSet, iter::FusedIterator, ops::Range, sync::Arc};

use log::trace;

use crate::{Concat, RangeError, Slicer};

/// What a view points into: either a raw payload or another array.
#[derive(Debug)]
enum Source<T> {
    Leaf(Arc<T>),
    Array(Arc<Array<T>>),
}

// Manual impls, because deriving would require `T: Clone`.
impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        match self {
            Source::Leaf(leaf) => Source::Leaf(Arc::clone(leaf)),
            Source::Array(array) => Source::Array(Arc::clone(array)),
        }
    }
}

impl<T: Slicer> Source<T> {
    fn len(&self) -> usize {
        match self {
            Source::Leaf(leaf) => leaf.len(),
            Source::Array(array) => array.count,
        }
    }
}

impl<T> Source<T> {
    fn window(&self, offset: usize, count: usize) -> Window<'_, T> {
        match self {
            Source::Leaf(leaf) => Window::Leaf {
                leaf: leaf.as_ref(),
                offset,
                count,
            },
            Source::Array(array) => Window::Array {
                array: array.as_ref(),
                offset,
                count,
            },
        }
    }
}

#[derive(Debug)]
enum Node<T> {
    /// No content. Only ever paired with a count of zero.
    Empty,
    /// `count` items of `source`, starting at `offset`. A plain leaf is a
    /// slice at offset zero covering its whole payload.
    Slice { source: Source<T>, offset: usize },
    /// `source` with the `removed` items starting at `offset` replaced by
    /// `replacement`.
    Splice {
        source: Source<T>,
        offset: usize,
        removed: usize,
        replacement: Arc<Array<T>>,
    },
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Empty => Node::Empty,
            Node::Slice { source, offset } => Node::Slice {
                source: source.clone(),
                offset: *offset,
            },
            Node::Splice {
                source,
                offset,
                removed,
                replacement,
            } => Node::Splice {
                source: source.clone(),
                offset: *offset,
                removed: *removed,
                replacement: Arc::clone(replacement),
            },
        }
    }
}

/// A persistent array whose slices and splices are recorded rather than
/// performed.
///
/// Both [`Array::slice`] and [`Array::splice`] run in constant time: they
/// build a small node pointing at their operands, which are shared rather
/// than copied. The content only gets assembled when someone walks it with
/// [`Array::for_each`] or [`Array::segments`], which hand out the pieces of
/// the original payloads in order.
///
/// Every wrapping operation costs one unit of the array's `limit`. The array
/// itself never acts on the limit; callers that want to bound the nesting
/// depth check it and [`flatten`](Array::flatten) when it runs out (see
/// [`FlattenPolicy`](crate::FlattenPolicy)).
///
/// Borrowed payloads such as `&str` must strictly outlive every array that
/// refers to them, including arrays declared earlier in the same scope:
/// dropping an array walks its nodes, so the borrow checker counts the drop
/// as a use of the payload.
///
/// # Examples
///
/// ```rust
/// # use lazy_array::Array;
/// let hello = Array::new("hello");
/// let jello = hello.splice(0, 1, Array::new("j"));
/// let jimbo = jello.splice(1, 3, Array::new("imb"));
///
/// let mut out = String::new();
/// jimbo.for_each(|segment, _| out.push_str(segment));
/// assert_eq!(out, "jimbo");
///
/// // Older versions are untouched.
/// assert_eq!(hello.segments().collect::<String>(), "hello");
/// ```
#[derive(Debug)]
pub struct Array<T> {
    limit: i64,
    count: usize,
    node: Node<T>,
}

impl<T> Clone for Array<T> {
    fn clone(&self) -> Self {
        Array {
            limit: self.limit,
            count: self.count,
            node: self.node.clone(),
        }
    }
}

// Views can be nested arbitrarily deep, so tear them down with an explicit
// stack instead of letting the default drop glue recurse.
impl<T> Drop for Array<T> {
    fn drop(&mut self) {
        let mut orphans: Vec<Arc<Array<T>>> = Vec::new();
        let mut node = std::mem::replace(&mut self.node, Node::Empty);

        loop {
            match node {
                Node::Empty => {}
                Node::Slice { source, .. } => {
                    if let Source::Array(array) = source {
                        orphans.push(array);
                    }
                }
                Node::Splice {
                    source,
                    replacement,
                    ..
                } => {
                    if let Source::Array(array) = source {
                        orphans.push(array);
                    }
                    orphans.push(replacement);
                }
            }

            // Shared arrays just lose a reference; only the ones we held the
            // last reference to get taken apart.
            node = loop {
                let Some(array) = orphans.pop() else {
                    return;
                };
                if let Some(mut array) = Arc::into_inner(array) {
                    break std::mem::replace(&mut array.node, Node::Empty);
                }
            };
        }
    }
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Array {
            limit: 0,
            count: 0,
            node: Node::Empty,
        }
    }
}

impl<T: Slicer> From<T> for Array<T> {
    fn from(value: T) -> Self {
        Array::new(value)
    }
}

impl<T> Array<T> {
    /// The number of items in this array.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The remaining nesting budget. It may well be negative if nobody
    /// flattened the array when it hit zero.
    pub fn limit(&self) -> i64 {
        self.limit
    }

    fn empty(limit: i64) -> Self {
        Array {
            limit,
            count: 0,
            node: Node::Empty,
        }
    }

    /// Wraps this whole array as the source of a new view, which costs one
    /// unit of nesting budget.
    fn wrap(&self) -> (Source<T>, i64) {
        let limit = self.limit.saturating_sub(1);
        trace!("wrapping array of length {} (limit now {limit})", self.count);
        (Source::Array(Arc::new(self.clone())), limit)
    }

    /// Returns the sub-array `[offset, offset + count)`, or an error if that
    /// window doesn't fit.
    ///
    /// Slicing a leaf or a slice just shifts the window, so chains of slices
    /// never get deeper. Slicing a splice has to keep the splice around, and
    /// so it decrements the limit.
    pub fn try_slice(&self, offset: usize, count: usize) -> Result<Self, RangeError> {
        RangeError::check(offset, count, self.count)?;

        if offset == 0 && count == self.count {
            return Ok(self.clone());
        }
        if count == 0 {
            return Ok(Array::empty(self.limit));
        }

        let ret = match &self.node {
            Node::Slice {
                source,
                offset: base,
            } => Array {
                limit: self.limit,
                count,
                node: Node::Slice {
                    source: source.clone(),
                    offset: base + offset,
                },
            },
            // An empty node has nothing to slice, so this is really only splices.
            Node::Empty | Node::Splice { .. } => {
                let (source, limit) = self.wrap();
                Array {
                    limit,
                    count,
                    node: Node::Slice { source, offset },
                }
            }
        };
        Ok(ret)
    }

    /// Returns the sub-array `[offset, offset + count)`.
    ///
    /// # Panics
    ///
    /// Panics if the window doesn't fit inside the array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use lazy_array::Array;
    /// let arr = Array::new(&[0, 1, 2, 3, 4, 5][..]);
    /// let sliced = arr.slice(1, 4).slice(1, 2);
    /// assert_eq!(sliced.segments().collect::<Vec<_>>(), vec![&[2, 3][..]]);
    /// ```
    pub fn slice(&self, offset: usize, count: usize) -> Self {
        self.try_slice(offset, count).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Replaces the `count` items starting at `offset` by `replacement`, or
    /// returns an error if that range doesn't fit.
    ///
    /// Splicing into a plain leaf (or a prefix of one) refers to the payload
    /// directly. Anything else gets wrapped, which decrements the limit.
    pub fn try_splice(
        &self,
        offset: usize,
        count: usize,
        replacement: Self,
    ) -> Result<Self, RangeError> {
        RangeError::check(offset, count, self.count)?;

        if offset == 0 && count == self.count {
            return Ok(replacement);
        }

        // A slice starting at zero can be skipped: the tail of the splice
        // never reaches past our own count, so the rest of its source stays
        // out of view.
        let (source, limit) = match &self.node {
            Node::Slice { source, offset: 0 } => (source.clone(), self.limit),
            _ => self.wrap(),
        };

        Ok(Array {
            limit,
            count: self.count - count + replacement.count,
            node: Node::Splice {
                source,
                offset,
                removed: count,
                replacement: Arc::new(replacement),
            },
        })
    }

    /// Replaces the `count` items starting at `offset` by `replacement`.
    ///
    /// # Panics
    ///
    /// Panics if the range doesn't fit inside the array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use lazy_array::Array;
    /// let jino = Array::new("jimbo").splice(2, 2, Array::new("n"));
    /// assert_eq!(jino.len(), 4);
    /// assert_eq!(jino.segments().collect::<Vec<_>>(), vec!["ji", "n", "o"]);
    /// ```
    pub fn splice(&self, offset: usize, count: usize, replacement: Self) -> Self {
        self.try_splice(offset, count, replacement).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Returns an iterator over the contiguous pieces of the original
    /// payloads that make up this array, from left to right.
    pub fn segments(&self) -> Segments<'_, T> {
        let mut ret = Segments {
            pending: Vec::new(),
        };
        ret.push(Window::Array {
            array: self,
            offset: 0,
            count: self.count,
        });
        ret
    }
}

impl<T: Slicer> Array<T> {
    /// A leaf array holding `value`, with a nesting budget of zero.
    pub fn new(value: T) -> Self {
        Array::with_limit(value, 0)
    }

    /// A leaf array holding `value`, with the given nesting budget.
    pub fn with_limit(value: T, limit: i64) -> Self {
        Array {
            limit,
            count: value.len(),
            node: Node::Slice {
                source: Source::Leaf(Arc::new(value)),
                offset: 0,
            },
        }
    }

    /// Calls `visit(segment, len)` for every segment of this array, in order.
    ///
    /// The segments are disjoint and together cover the whole array.
    pub fn for_each<F: FnMut(T, usize)>(&self, mut visit: F) {
        let mut segments = self.segments();
        while let Some((segment, count)) = segments.next_window() {
            visit(segment, count);
        }
    }

    /// Checks the structural invariants of this array and everything it
    /// refers to, panicking if they fail. Meant for tests.
    pub fn check_invariants(&self) {
        let mut seen = HashSet::new();
        let mut stack = vec![self];

        while let Some(array) = stack.pop() {
            if !seen.insert(array as *const Array<T>) {
                continue;
            }

            match &array.node {
                Node::Empty => assert_eq!(array.count, 0),
                Node::Slice { source, offset } => {
                    assert!(offset + array.count <= source.len());
                    if let Source::Array(inner) = source {
                        stack.push(inner);
                    }
                }
                Node::Splice {
                    source,
                    offset,
                    removed,
                    replacement,
                } => {
                    assert!(offset + removed <= source.len());
                    assert!(offset + replacement.count <= array.count);
                    assert!(array.count + removed <= source.len() + replacement.count);
                    if let Source::Array(inner) = source {
                        stack.push(inner);
                    }
                    stack.push(replacement);
                }
            }
        }

        let mut visited = 0;
        self.for_each(|segment, count| {
            assert_eq!(segment.len(), count);
            assert!(count > 0);
            visited += count;
        });
        assert_eq!(visited, self.count);
    }
}

impl<T: Concat> Array<T> {
    /// Assembles the content of this array into a single payload.
    pub fn to_leaf(&self) -> T {
        T::concat(self.segments(), self.count)
    }

    /// Returns a single-leaf array with the same content and limit.
    ///
    /// This is the only operation that copies the payloads. The array never
    /// calls it on its own.
    pub fn flatten(&self) -> Self {
        Array::with_limit(self.to_leaf(), self.limit)
    }
}

/// Arrays compare by content, however they were built.
impl<T: Concat + PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.to_leaf() == other.to_leaf()
    }
}

impl<T: Concat + serde::Serialize> serde::Serialize for Array<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_leaf().serialize(serializer)
    }
}

impl<'de, T: Slicer + serde::Deserialize<'de>> serde::Deserialize<'de> for Array<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Array::new)
    }
}

/// A window `[offset, offset + count)` that still needs to be visited.
enum Window<'a, T> {
    Leaf {
        leaf: &'a T,
        offset: usize,
        count: usize,
    },
    Array {
        array: &'a Array<T>,
        offset: usize,
        count: usize,
    },
}

impl<T> Window<'_, T> {
    fn count(&self) -> usize {
        match self {
            Window::Leaf { count, .. } | Window::Array { count, .. } => *count,
        }
    }
}

/// The overlap of two half-open intervals, or an empty range if they don't
/// overlap.
fn intersect(a: &Range<usize>, b: &Range<usize>) -> Range<usize> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    if end > start { start..end } else { 0..0 }
}

/// Iterator over the segments of an [`Array`], created by [`Array::segments`].
///
/// Nested views are resolved with an explicit stack, so arbitrarily deep
/// arrays don't exhaust the call stack.
pub struct Segments<'a, T> {
    // Windows still to visit, with the next one on top.
    pending: Vec<Window<'a, T>>,
}

impl<'a, T> Segments<'a, T> {
    fn push(&mut self, window: Window<'a, T>) {
        if window.count() > 0 {
            self.pending.push(window);
        }
    }

    /// Replaces a window into `array` by windows into whatever `array` points
    /// at.
    fn expand(&mut self, array: &'a Array<T>, offset: usize, count: usize) {
        match &array.node {
            Node::Empty => {}
            Node::Slice {
                source,
                offset: base,
            } => self.push(source.window(base + offset, count)),
            Node::Splice {
                source,
                offset: at,
                removed,
                replacement,
            } => {
                let requested = offset..offset + count;
                let middle_end = at + replacement.count;
                let head = intersect(&requested, &(0..*at));
                let middle = intersect(&requested, &(*at..middle_end));
                let tail = intersect(&requested, &(middle_end..array.count));

                // Reverse order, so that the head comes off the stack first.
                if !tail.is_empty() {
                    // Tail positions are shifted by the length difference
                    // between the replacement and the removed range.
                    let start = tail.start + removed - replacement.count;
                    self.push(source.window(start, tail.len()));
                }
                if !middle.is_empty() {
                    self.push(Window::Array {
                        array: replacement,
                        offset: middle.start - at,
                        count: middle.len(),
                    });
                }
                self.push(source.window(head.start, head.len()));
            }
        }
    }
}

impl<T: Slicer> Segments<'_, T> {
    fn next_window(&mut self) -> Option<(T, usize)> {
        while let Some(window) = self.pending.pop() {
            match window {
                Window::Leaf {
                    leaf,
                    offset,
                    count,
                } => return Some((leaf.slice(offset, count), count)),
                Window::Array {
                    array,
                    offset,
                    count,
                } => self.expand(array, offset, count),
            }
        }
        None
    }
}

impl<T: Slicer> Iterator for Segments<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.next_window().map(|(segment, _)| segment)
    }
}

impl<T: Slicer> FusedIterator for Segments<'_, T> {}
