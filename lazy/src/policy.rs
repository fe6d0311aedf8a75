//! Deciding when to flatten.
//!
//! An [`Array`] only keeps count of how deeply it is nested; it never does
//! anything about it. [`FlattenPolicy`] is the usual way of doing something
//! about it: give new leaves a budget, and once an array has used it up,
//! copy its content into a fresh leaf.

use log::debug;
use serde::Deserialize;

use crate::{Array, Concat, Slicer};

/// The nesting budget used when nothing else is configured.
pub const DEFAULT_LIMIT: i64 = 10;

/// How much nesting to allow before flattening.
///
/// This can be deserialized from configuration, where missing fields fall
/// back to their defaults:
///
/// ```rust
/// # use lazy_array::FlattenPolicy;
/// let policy: FlattenPolicy = serde_json::from_str(r#"{ "limit": 4 }"#).unwrap();
/// assert_eq!(policy.limit, 4);
///
/// let policy: FlattenPolicy = serde_json::from_str("{}").unwrap();
/// assert_eq!(policy, FlattenPolicy::default());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlattenPolicy {
    /// The budget handed to every leaf this policy creates.
    pub limit: i64,
}

impl Default for FlattenPolicy {
    fn default() -> Self {
        FlattenPolicy {
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FlattenPolicy {
    pub fn new(limit: i64) -> Self {
        FlattenPolicy { limit }
    }

    /// Wraps `value` in a leaf carrying this policy's budget.
    pub fn leaf<T: Slicer>(&self, value: T) -> Array<T> {
        Array::with_limit(value, self.limit)
    }

    /// Has `array` used up its budget?
    pub fn should_flatten<T>(&self, array: &Array<T>) -> bool {
        array.limit() <= 0
    }

    /// Flattens `array` into a leaf with a fresh budget if it has used up its
    /// budget, and returns it unchanged otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use lazy_array::FlattenPolicy;
    /// let policy = FlattenPolicy::new(1);
    /// let arr = policy.leaf(String::from("hello"));
    /// let arr = arr.splice(0, 1, policy.leaf("j".to_owned()));
    /// let arr = arr.splice(4, 1, policy.leaf("y".to_owned()));
    /// assert_eq!(arr.limit(), 0);
    ///
    /// let arr = policy.apply(arr);
    /// assert_eq!(arr.limit(), 1);
    /// assert_eq!(arr.to_leaf(), "jelly");
    /// ```
    pub fn apply<T: Concat>(&self, array: Array<T>) -> Array<T> {
        if !self.should_flatten(&array) {
            return array;
        }

        debug!(
            "flattening array of length {} (limit {})",
            array.len(),
            array.limit()
        );
        self.leaf(array.to_leaf())
    }
}
