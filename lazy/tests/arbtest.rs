use arbitrary::Unstructured;
use arbtest::{arbitrary, arbtest};
use lazy_array::{Array, FlattenPolicy};

// Splicing earlier versions back in can double the length each time, so
// stop doing that past this size.
const MAX_LEN: usize = 4096;

#[derive(arbitrary::Arbitrary, Debug)]
enum Op {
    Slice(usize, usize),
    Splice(usize, usize, Vec<u32>),
    // Splice(offset, count, idx) replaces the range by the version of the
    // array from `idx` steps back.
    SpliceHistory(usize, usize, usize),
    Flatten,
}

/// Turns arbitrary numbers into a valid range of a sequence of length `len`.
fn range(offset: usize, count: usize, len: usize) -> (usize, usize) {
    let offset = offset % (len + 1);
    let count = count % (len - offset + 1);
    (offset, count)
}

impl Op {
    fn apply_to_vec(&self, vec: &mut Vec<u32>, history: &[(Vec<u32>, Array<Vec<u32>>)]) {
        match self {
            Op::Slice(offset, count) => {
                let (offset, count) = range(*offset, *count, vec.len());
                vec.drain(offset + count..);
                vec.drain(..offset);
            }
            Op::Splice(offset, count, xs) => {
                let (offset, count) = range(*offset, *count, vec.len());
                vec.splice(offset..offset + count, xs.iter().copied());
            }
            Op::SpliceHistory(offset, count, idx) => {
                let (offset, count) = range(*offset, *count, vec.len());
                let (old, _) = &history[history.len() - 1 - idx % history.len()];
                if vec.len() + old.len() <= MAX_LEN {
                    vec.splice(offset..offset + count, old.iter().copied());
                }
            }
            Op::Flatten => {}
        }
    }

    fn apply_to_array(
        &self,
        array: &mut Array<Vec<u32>>,
        history: &[(Vec<u32>, Array<Vec<u32>>)],
    ) {
        match self {
            Op::Slice(offset, count) => {
                let (offset, count) = range(*offset, *count, array.len());
                *array = array.slice(offset, count);
            }
            Op::Splice(offset, count, xs) => {
                let (offset, count) = range(*offset, *count, array.len());
                *array = array.splice(offset, count, Array::new(xs.clone()));
            }
            Op::SpliceHistory(offset, count, idx) => {
                let (offset, count) = range(*offset, *count, array.len());
                let (_, old) = &history[history.len() - 1 - idx % history.len()];
                if array.len() + old.len() <= MAX_LEN {
                    *array = array.splice(offset, count, old.clone());
                }
            }
            Op::Flatten => {
                *array = array.flatten();
            }
        }
    }
}

// u.arbitrary() generates very short vecs by default:
// https://github.com/matklad/arbtest/issues/8
fn arb_vec(u: &mut Unstructured<'_>) -> arbitrary::Result<Vec<u32>> {
    let len = u.arbitrary_len::<u32>()?;
    std::iter::from_fn(|| Some(u.arbitrary::<u32>()))
        .take(len)
        .collect()
}

#[test]
fn edits() {
    arbtest(|u| {
        let mut vec: Vec<u32> = arb_vec(u)?;
        let mut array = Array::with_limit(vec.clone(), 8);
        let mut history = vec![(vec.clone(), array.clone())];
        let ops: Vec<Op> = u.arbitrary()?;

        for op in ops {
            op.apply_to_vec(&mut vec, &history);
            op.apply_to_array(&mut array, &history);

            array.check_invariants();
            assert_eq!(vec.len(), array.len());
            assert_eq!(vec, array.to_leaf());

            history.push((vec.clone(), array.clone()));
        }

        // Nothing derived later changed what the earlier versions hold.
        for (vec, array) in &history {
            assert_eq!(vec, &array.to_leaf());
        }

        Ok(())
    });
}

#[test]
fn slices_of_slices() {
    arbtest(|u| {
        let vec: Vec<u32> = arb_vec(u)?;
        let array = Array::new(vec.clone());
        let replacement: Vec<u32> = u.arbitrary()?;
        let (offset, count) = range(u.arbitrary()?, u.arbitrary()?, vec.len());

        let mut expected = vec.clone();
        expected.splice(offset..offset + count, replacement.iter().copied());
        let spliced = array.splice(offset, count, Array::new(replacement));

        let windows: Vec<(usize, usize)> = u.arbitrary()?;
        let mut current = spliced.clone();
        let mut current_expected = expected.clone();
        for (offset, count) in windows {
            let (offset, count) = range(offset, count, current.len());
            current = current.slice(offset, count);
            current_expected = current_expected[offset..offset + count].to_vec();

            assert_eq!(current.len(), current_expected.len());
            assert_eq!(current.to_leaf(), current_expected);
            assert!(current.segments().count() <= 3);
        }

        assert_eq!(spliced.to_leaf(), expected);
        Ok(())
    });
}

#[test]
fn flatten_policy() {
    arbtest(|u| {
        let policy = FlattenPolicy::new(u.int_in_range(1..=6)?);
        let mut vec: Vec<u32> = arb_vec(u)?;
        let mut array = policy.leaf(vec.clone());
        let ops: Vec<(usize, usize, Vec<u32>)> = u.arbitrary()?;

        for (offset, count, xs) in ops {
            let (offset, count) = range(offset, count, vec.len());
            vec.splice(offset..offset + count, xs.iter().copied());
            array = policy.apply(array.splice(offset, count, policy.leaf(xs)));

            assert!(array.limit() > 0);
            assert_eq!(vec, array.to_leaf());
        }

        Ok(())
    });
}
