//! Set of node indices with pending messages.

use rand::Rng;

/// Dense set supporting O(1) insert, remove, and uniform random pick.
#[derive(Clone, Debug)]
pub(super) struct ActiveSet {
    members: Vec<usize>,
    positions: Vec<Option<usize>>,
}

impl ActiveSet {
    pub(super) fn with_capacity(nodes: usize) -> Self {
        Self {
            members: Vec::with_capacity(nodes),
            positions: vec![None; nodes],
        }
    }

    pub(super) fn insert(&mut self, node: usize) {
        let Some(position) = self.positions.get_mut(node) else {
            return;
        };
        if position.is_none() {
            *position = Some(self.members.len());
            self.members.push(node);
        }
    }

    pub(super) fn remove(&mut self, node: usize) {
        let Some(position) = self.positions.get_mut(node).and_then(Option::take) else {
            return;
        };
        self.members.swap_remove(position);
        if let Some(&moved) = self.members.get(position)
            && let Some(slot) = self.positions.get_mut(moved)
        {
            *slot = Some(position);
        }
    }

    pub(super) fn pick<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.members.is_empty() {
            return None;
        }
        self.members.get(rng.gen_range(0..self.members.len())).copied()
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.members.len()
    }
}
