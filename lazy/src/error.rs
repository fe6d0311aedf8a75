/// A slice or splice asked for a window that doesn't fit inside the array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid range: offset {offset} + count {count} exceeds length {len}")]
pub struct RangeError {
    pub offset: usize,
    pub count: usize,
    pub len: usize,
}

impl RangeError {
    /// Checks that `[offset, offset + count)` lies within `[0, len)`.
    pub(crate) fn check(offset: usize, count: usize, len: usize) -> Result<(), RangeError> {
        match offset.checked_add(count) {
            Some(end) if end <= len => Ok(()),
            _ => Err(RangeError { offset, count, len }),
        }
    }
}
