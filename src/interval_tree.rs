//! Static augmented interval tree.
//!
//! Intervals are kept in one `Vec` sorted by `(start, end)`. The tree is implicit:
//! the node of the index range `[lo, hi)` is its midpoint, its children are the
//! halves on either side. Every node records the largest `end` of its subtree so
//! overlap queries can skip whole subtrees. Built once, never mutated.

use num_traits::PrimInt;
use radsort::sort_by_key;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval<N, T> {
    /// Inclusive.
    pub start: N,
    /// Exclusive.
    pub end: N,
    pub data: T,
}

#[derive(Debug, Clone)]
pub struct IntervalTree<N, T> {
    intervals: Vec<Interval<N, T>>,
    max_end: Vec<N>,
}

impl<N, T> IntervalTree<N, T>
where
    N: PrimInt + radsort::Key,
{
    pub fn new(mut intervals: Vec<Interval<N, T>>) -> Self {
        // stable passes: end first, then start
        sort_by_key(&mut intervals, |i| i.end);
        sort_by_key(&mut intervals, |i| i.start);

        let mut max_end = vec![N::min_value(); intervals.len()];
        augment_max_end(&intervals, &mut max_end, 0, intervals.len());

        IntervalTree { intervals, max_end }
    }
}

impl<N, T> IntervalTree<N, T>
where
    N: PrimInt,
{
    /// All intervals with `start < end && interval.end > start`, lazily, in
    /// ascending `(start, end)` order. The returned iterator can be cloned to
    /// walk the same result again.
    pub fn query(&self, start: N, end: N) -> Overlaps<'_, N, T> {
        let stack = if self.intervals.is_empty() || start >= end {
            Vec::new()
        } else {
            vec![Frame::Descend(0, self.intervals.len())]
        };
        Overlaps {
            tree: self,
            start,
            end,
            stack,
        }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

fn augment_max_end<N: PrimInt, T>(
    intervals: &[Interval<N, T>],
    max_end: &mut [N],
    lo: usize,
    hi: usize,
) -> Option<N> {
    if lo >= hi {
        return None;
    }
    let mid = lo + (hi - lo) / 2;
    let mut best = intervals[mid].end;
    if let Some(left) = augment_max_end(intervals, max_end, lo, mid) {
        best = best.max(left);
    }
    if let Some(right) = augment_max_end(intervals, max_end, mid + 1, hi) {
        best = best.max(right);
    }
    max_end[mid] = best;
    Some(best)
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    Descend(usize, usize),
    Visit(usize),
}

#[derive(Debug)]
pub struct Overlaps<'a, N, T> {
    tree: &'a IntervalTree<N, T>,
    start: N,
    end: N,
    stack: Vec<Frame>,
}

impl<N: Copy, T> Clone for Overlaps<'_, N, T> {
    fn clone(&self) -> Self {
        Overlaps {
            tree: self.tree,
            start: self.start,
            end: self.end,
            stack: self.stack.clone(),
        }
    }
}

impl<'a, N: PrimInt, T> Iterator for Overlaps<'a, N, T> {
    type Item = &'a Interval<N, T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Descend(lo, hi) => {
                    if lo >= hi {
                        continue;
                    }
                    let mid = lo + (hi - lo) / 2;
                    // nothing below ends after the query start
                    if self.tree.max_end[mid] <= self.start {
                        continue;
                    }
                    // right half starts at or after intervals[mid].start
                    if self.tree.intervals[mid].start < self.end {
                        self.stack.push(Frame::Descend(mid + 1, hi));
                        self.stack.push(Frame::Visit(mid));
                    }
                    self.stack.push(Frame::Descend(lo, mid));
                }
                Frame::Visit(idx) => {
                    let iv = &self.tree.intervals[idx];
                    if iv.start < self.end && iv.end > self.start {
                        return Some(iv);
                    }
                }
            }
        }
        None
    }
}
