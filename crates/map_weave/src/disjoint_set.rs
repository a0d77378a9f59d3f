//! Union-find over indices `0..n`, used by the area-connection steps.
//!
//! `union` reports which root absorbed which, so callers can merge dependent
//! bookkeeping (e.g. combined position sets) directly from the return value
//! instead of subscribing to merge events.

/// Result of a successful union: `absorbing` is the surviving root,
/// `absorbed` the root that was folded into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Union {
    pub absorbing: usize,
    pub absorbed: usize,
}

/// Union-find structure with path compression and union by size.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parents: Vec<usize>,
    sizes: Vec<usize>,
    count: usize,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parents: (0..n).collect(),
            sizes: vec![1; n],
            count: n,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Number of remaining disjoint sets.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Root of the set containing `i`, compressing the path on the way.
    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parents[root] != root {
            root = self.parents[root];
        }
        let mut cursor = i;
        while self.parents[cursor] != root {
            let next = self.parents[cursor];
            self.parents[cursor] = root;
            cursor = next;
        }
        root
    }

    pub fn in_same_set(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Merge the sets containing `a` and `b`. The larger set absorbs the
    /// smaller one. Returns `None` if they were already in the same set.
    pub fn union(&mut self, a: usize, b: usize) -> Option<Union> {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return None;
        }
        let (absorbing, absorbed) = if self.sizes[ra] >= self.sizes[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parents[absorbed] = absorbing;
        self.sizes[absorbing] += self.sizes[absorbed];
        self.count -= 1;
        Some(Union {
            absorbing,
            absorbed,
        })
    }
}
