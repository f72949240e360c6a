use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Range where lower bound is inclusive, upper bound is exclusive or unbounded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range<T>(T, Option<T>);

impl<T> Range<T>
where
    T: Ord,
{
    pub fn new(from: T, to: Option<T>) -> Self {
        if let Some(ref to) = to {
            if from >= *to {
                panic!("ranges must go from low to high")
            }
        }
        Range(from, to)
    }

    pub fn contains(&self, val: &T) -> bool {
        if let Some(end) = &self.1 {
            val >= &self.0 && val < end
        } else {
            val >= &self.0
        }
    }
}

/// An ordered list of non-overlapping ranges, each with a label used for display.
#[derive(Debug, Clone)]
pub struct RangeSet<T> {
    ranges: Vec<(Range<T>, &'static str)>,
}

impl<T> RangeSet<T> {
    pub fn new(ranges: Vec<(Range<T>, &'static str)>) -> Self {
        Self { ranges }
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ranges.iter().map(|(_, label)| *label)
    }
}

impl<T> RangeSet<T>
where
    T: Ord,
{
    /// The index of the first range containing `value`.
    pub fn position(&self, value: &T) -> Option<usize> {
        self.ranges.iter().position(|(range, _)| range.contains(value))
    }

    pub fn label_for(&self, value: &T) -> Option<&'static str> {
        self.position(value).map(|idx| self.ranges[idx].1)
    }

    /// Count how many values fall in each range, with an extra trailing bucket for `None`.
    pub fn bucket_values_with_missing<I, B>(&self, values: I) -> RangeSetCountsWithMissing<'_, T>
    where
        I: Iterator<Item = Option<B>>,
        B: Borrow<T>,
    {
        let mut counts = vec![0usize; self.ranges.len() + 1];
        let last = self.ranges.len();
        for value in values {
            match value {
                Some(value) => {
                    if let Some(idx) = self.position(value.borrow()) {
                        counts[idx] += 1;
                    }
                }
                None => counts[last] += 1,
            }
        }
        RangeSetCountsWithMissing { set: self, counts }
    }
}

/// A range set with values bucketed, and bucket sizes recorded.
pub struct RangeSetCountsWithMissing<'a, T> {
    set: &'a RangeSet<T>,
    counts: Vec<usize>,
}

impl<'a, T> RangeSetCountsWithMissing<'a, T> {
    pub fn iter(&self) -> impl Iterator<Item = (Option<&'static str>, usize)> + '_ {
        self.set
            .labels()
            .zip_longest(self.counts.iter().copied())
            .map(|el| match el {
                EitherOrBoth::Left(_) => unreachable!(),
                EitherOrBoth::Right(count) => (None, count),
                EitherOrBoth::Both(label, count) => (Some(label), count),
            })
    }

    pub fn for_display(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.iter()
            .map(|(label, count)| (label.unwrap_or("missing data"), count))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
