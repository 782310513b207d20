//! Path nodes for move playback, stored in an index arena.

use blocks_core::{Placement, Step};

/// Index of a `Movement` in its arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct MovementHandle(u32);

impl MovementHandle {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of a path. Following `previous` leads back to the start state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Movement {
    pub placement: Placement,
    pub previous: Option<MovementHandle>,
}

/// Fixed-capacity node storage, reused between searches.
#[derive(Clone, Debug, Default)]
pub struct MovementArena {
    nodes: Vec<Movement>,
    capacity: usize,
}

impl MovementArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a node (panics in debug if over capacity)
    #[inline]
    pub fn push(&mut self, placement: Placement, previous: Option<MovementHandle>) -> MovementHandle {
        debug_assert!(self.nodes.len() < self.capacity, "MovementArena overflow");
        let handle = MovementHandle(self.nodes.len() as u32);
        self.nodes.push(Movement { placement, previous });
        handle
    }

    #[inline(always)]
    pub fn get(&self, handle: MovementHandle) -> &Movement {
        &self.nodes[handle.index()]
    }

    /// Appends `placement` reached from `parent`, skipping detours: when an
    /// older ancestor is one step away from `placement`, the node links to
    /// the oldest such ancestor instead.
    pub fn add_movement_and_remove_detour(
        &mut self,
        placement: Placement,
        parent: Option<MovementHandle>,
        rotation_count: usize,
    ) -> MovementHandle {
        let mut link = parent;
        let mut ancestor = parent.and_then(|handle| self.get(handle).previous);
        while let Some(handle) = ancestor {
            let node = self.get(handle);
            if Step::between(node.placement, placement, rotation_count).is_some() {
                link = Some(handle);
            }
            ancestor = node.previous;
        }
        self.push(placement, link)
    }

    /// Placements from the start state to `handle`, inclusive.
    pub fn path(&self, handle: MovementHandle, out: &mut Vec<Placement>) {
        out.clear();
        let mut current = Some(handle);
        while let Some(h) = current {
            let node = self.get(h);
            out.push(node.placement);
            current = node.previous;
        }
        out.reverse();
    }

    /// Elementary moves replaying the path to `handle`.
    pub fn steps(&self, handle: MovementHandle, rotation_count: usize, out: &mut Vec<Step>) {
        out.clear();
        let mut current = handle;
        while let Some(previous) = self.get(current).previous {
            let from = self.get(previous).placement;
            let to = self.get(current).placement;
            if let Some(step) = Step::between(from, to, rotation_count) {
                out.push(step);
            }
            current = previous;
        }
        out.reverse();
    }
}
