//! Traversal and transform operations on [`Seq<T>`].
//!
//! Every operation visits elements in ascending index order and calls the
//! closure exactly once per element.

use bytemuck::Pod;

use crate::seq::Seq;

impl<T: Pod> Seq<T> {
    /// Replace the contents of `dst` with `f(x)` for each element `x`.
    ///
    /// `dst` is cleared first; its element type may differ from `T`.
    #[track_caller]
    #[must_use = "the destination may have moved; use the returned value"]
    pub fn map_into<U: Pod>(
        &self,
        dst: Seq<U>,
        mut f: impl FnMut(T) -> U,
        headroom: usize,
    ) -> Seq<U> {
        let mut dst = dst;
        dst.clear();
        for &x in self {
            dst = dst.push(f(x), headroom);
        }
        dst
    }

    /// Replace the contents of `dst` with the elements satisfying `pred`.
    #[track_caller]
    #[must_use = "the destination may have moved; use the returned value"]
    pub fn filter_into(
        &self,
        dst: Seq<T>,
        mut pred: impl FnMut(&T) -> bool,
        headroom: usize,
    ) -> Seq<T> {
        let mut dst = dst;
        dst.clear();
        for x in self {
            if pred(x) {
                dst = dst.push(*x, headroom);
            }
        }
        dst
    }

    /// Left fold: `f(... f(f(init, x0), x1) ..., xn)`.
    pub fn fold<A>(&self, init: A, f: impl FnMut(A, T) -> A) -> A {
        self.iter().copied().fold(init, f)
    }

    /// Replace each element with `f(element)`, in place.
    pub fn apply(&mut self, mut f: impl FnMut(T) -> T) {
        for x in self.as_mut_slice() {
            *x = f(*x);
        }
    }

    /// Call `f` on each element.
    pub fn for_each(&self, f: impl FnMut(T)) {
        self.iter().copied().for_each(f);
    }

    /// Keep only the elements satisfying `pred`, preserving order.
    ///
    /// Survivors are staged past the current length in the same block
    /// (growing by `headroom` if it fills up) and then shifted down over
    /// the original region. Capacity never shrinks, and every slot past
    /// the new length is zero afterwards.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn keep(self, mut pred: impl FnMut(&T) -> bool, headroom: usize) -> Self {
        let len = self.len();
        let mut seq = self;
        for i in 0..len {
            let x = *seq.get(i);
            if pred(&x) {
                seq = seq.push(x, headroom);
            }
        }
        seq.raw_mut().discard_front(len);
        seq
    }

    /// Fold every element into one, leaving a single-element sequence.
    ///
    /// The fold starts from the all-zero `T`. An empty sequence collapses
    /// to `[zeroed]`.
    pub fn collapse(&mut self, f: impl FnMut(T, T) -> T) {
        let total = self.fold(T::zeroed(), f);
        self.truncate(1);
        self.raw_mut().extend_zeroed(1);
        *self.get_mut(0) = total;
    }
}

#[cfg(test)]
mod tests {
    use crate::Seq;

    #[test]
    fn map_into_changes_element_type() {
        let src = Seq::from_slice(&[1u8, 2, 3]);
        let dst = src.map_into(Seq::<u64>::with_capacity(1), |x| u64::from(x) * 1000, 2);
        assert_eq!(dst.as_slice(), &[1000, 2000, 3000]);
    }

    #[test]
    fn map_into_clears_destination_first() {
        let src = Seq::from_slice(&[1i32]);
        let dst = src.map_into(Seq::from_slice(&[7i32, 8, 9]), |x| -x, 0);
        assert_eq!(dst.as_slice(), &[-1]);
        assert!(dst.as_raw().unused_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn filter_into_keeps_order() {
        let src = Seq::from_slice(&[5u32, 2, 8, 1, 6]);
        let dst = src.filter_into(Seq::with_capacity(1), |&x| x > 4, 0);
        assert_eq!(dst.as_slice(), &[5, 8, 6]);
    }

    #[test]
    fn filter_into_nothing_survives() {
        let src = Seq::from_slice(&[1u32, 3]);
        let dst = src.filter_into(Seq::from_slice(&[9, 9]), |&x| x % 2 == 0, 0);
        assert!(dst.is_empty());
    }

    #[test]
    fn fold_is_left_to_right() {
        let seq = Seq::from_slice(&[1u32, 2, 3]);
        let digits = seq.fold(0u32, |acc, x| acc * 10 + x);
        assert_eq!(digits, 123);
    }

    #[test]
    fn apply_visits_in_order() {
        let mut seq = Seq::from_slice(&[1i16, 2, 3]);
        let mut seen = Vec::new();
        seq.apply(|x| {
            seen.push(x);
            x * 2
        });
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(seq.as_slice(), &[2, 4, 6]);
    }

    #[test]
    fn for_each_sees_every_element() {
        let seq = Seq::from_slice(&[4u8, 5]);
        let mut sum = 0;
        seq.for_each(|x| sum += x);
        assert_eq!(sum, 9);
    }

    #[test]
    fn keep_grows_when_full_and_never_shrinks() {
        let seq = Seq::from_slice(&[2u32, 7, 4, 9, 1]);
        assert_eq!(seq.capacity(), 5);
        let seq = seq.keep(|&x| x % 2 == 0, 0);
        assert_eq!(seq.as_slice(), &[2, 4]);
        assert!(seq.capacity() >= 5);
        assert!(seq.as_raw().unused_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn keep_everything_or_nothing() {
        let all = Seq::from_slice(&[1u8, 2, 3]).keep(|_| true, 3);
        assert_eq!(all.as_slice(), &[1, 2, 3]);
        let none = Seq::from_slice(&[1u8, 2, 3]).keep(|_| false, 0);
        assert!(none.is_empty());
        assert_eq!(none.capacity(), 3);
    }

    #[test]
    fn collapse_sums_into_one_element() {
        let mut seq = Seq::from_slice(&[1u64, 2, 3, 4]);
        seq.collapse(|a, b| a + b);
        assert_eq!(seq.as_slice(), &[10]);
        assert!(seq.as_raw().unused_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn collapse_empty_yields_zero() {
        let mut seq = Seq::<i32>::with_capacity(4);
        seq.collapse(|a, b| a + b);
        assert_eq!(seq.as_slice(), &[0]);
    }
}
