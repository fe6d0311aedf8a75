//! Random editing workloads.
//!
//! Everything here is seeded, so a failing test or a benchmark run can be
//! reproduced exactly.

use rand::{rngs::StdRng, Rng, SeedableRng};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The longest range a [`Workload`] will remove in one splice, plus one.
pub const MAX_REMOVED: usize = 100;

/// A random string of ASCII letters.
pub fn random_string(len: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| char::from(LETTERS[rng.random_range(0..LETTERS.len())]))
        .collect()
}

/// One edit: replace `count` items at `offset` by `replacement`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Splice {
    pub offset: usize,
    pub count: usize,
    pub replacement: String,
}

impl Splice {
    /// Performs the edit eagerly on a string.
    pub fn apply_to_string(&self, s: &mut String) {
        s.replace_range(self.offset..self.offset + self.count, &self.replacement);
    }
}

/// An endless stream of random single-letter splices into a string whose
/// length starts at `len`.
///
/// Each splice is valid for the string obtained by applying all the previous
/// ones: it starts anywhere in the string and removes fewer than
/// [`MAX_REMOVED`] letters.
#[derive(Clone, Debug)]
pub struct Workload {
    rng: StdRng,
    len: usize,
}

impl Workload {
    pub fn new(len: usize, seed: u64) -> Self {
        Workload {
            rng: StdRng::seed_from_u64(seed),
            len,
        }
    }

    /// The length of the string once all the splices produced so far are
    /// applied.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Iterator for Workload {
    type Item = Splice;

    fn next(&mut self) -> Option<Splice> {
        let letter = char::from(b'a' + self.rng.random_range(0..26u8));

        let offset = if self.len > 0 {
            self.rng.random_range(0..self.len)
        } else {
            0
        };
        let room = (self.len - offset).min(MAX_REMOVED);
        let count = if room > 0 {
            self.rng.random_range(0..room)
        } else {
            0
        };

        self.len = self.len + 1 - count;
        Some(Splice {
            offset,
            count,
            replacement: letter.to_string(),
        })
    }
}
