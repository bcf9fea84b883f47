// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sibling-list iteration.

use core::iter::FusedIterator;

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

/// Iterates the direct children of a node in sibling-list order.
///
/// Sibling-list order is the order built by
/// [`add_child`](NodeStore::add_child) and
/// [`insert_before`](NodeStore::insert_before). Draw order additionally
/// stable-sorts the children of sortable containers by z-index during
/// evaluation; see
/// [`NodeStore::traversal_order`].
///
/// Created by [`NodeStore::children`].
#[derive(Clone, Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    next: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, first: u32) -> Self {
        Self { store, next: first }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.next == INVALID {
            return None;
        }
        let id = self.store.id_at(self.next);
        self.next = self.store.next_sibling[self.next as usize];
        Some(id)
    }
}

impl FusedIterator for Children<'_> {}
