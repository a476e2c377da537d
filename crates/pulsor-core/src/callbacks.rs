//! Insertion-ordered callback set.
//!
//! Every insert gets a fresh sequence number. Walking the set with
//! [`CallbackSet::next_after`] is a live walk: entries removed ahead of the
//! cursor are skipped, entries inserted during the walk are reached.

use crate::function::{Callback, CallbackId};
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

/// Position of a callback in its set.
pub(crate) type Seq = u64;

#[derive(Debug, Default)]
pub(crate) struct CallbackSet {
    next_seq: Seq,
    order: BTreeMap<Seq, Callback>,
    index: HashMap<CallbackId, Seq>,
}

impl CallbackSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn contains(&self, callback: &Callback) -> bool {
        self.index.contains_key(&callback.id())
    }

    /// Append a callback. Returns `false` if it is already present.
    pub(crate) fn insert(&mut self, callback: Callback) -> bool {
        if self.contains(&callback) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(callback.id(), seq);
        self.order.insert(seq, callback);
        true
    }

    /// Remove a callback. Returns `true` if it was present.
    pub(crate) fn remove(&mut self, callback: &Callback) -> bool {
        match self.index.remove(&callback.id()) {
            Some(seq) => {
                self.order.remove(&seq);
                true
            }
            None => false,
        }
    }

    /// Remove everything, returning how many callbacks were dropped.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.order.len();
        self.order.clear();
        self.index.clear();
        count
    }

    /// The first live callback after `cursor`, or the first one when `cursor` is `None`.
    pub(crate) fn next_after(&self, cursor: Option<Seq>) -> Option<(Seq, Callback)> {
        let lower = match cursor {
            Some(seq) => Bound::Excluded(seq),
            None => Bound::Unbounded,
        };
        self.order
            .range((lower, Bound::Unbounded))
            .next()
            .map(|(seq, cb)| (*seq, cb.clone()))
    }
}
