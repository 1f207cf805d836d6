//! Comment thread reconstruction.
//!
//! Comments arrive as a flat, ordered list where each item may name a
//! parent. [`Thread::build`] turns that list into a forest stored as an
//! arena: one `Vec` of nodes plus per-node child index lists. Items whose
//! parent is absent from the list (for example filtered as spam) become
//! roots. Sibling order always follows the input order.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::DbId;

/// Anything that can be placed in a [`Thread`].
pub trait ThreadItem {
    fn id(&self) -> DbId;
    fn parent_id(&self) -> Option<DbId>;
    /// Nesting depth as stored with the item (0 for top-level comments).
    fn depth(&self) -> i32;
}

#[derive(Debug)]
struct Node<T> {
    item: T,
    parent: Option<usize>,
    children: Vec<usize>,
    level: usize,
}

/// A materialized comment forest.
#[derive(Debug)]
pub struct Thread<T> {
    nodes: Vec<Node<T>>,
    index: HashMap<DbId, usize>,
    roots: Vec<usize>,
}

impl<T: ThreadItem> Thread<T> {
    /// Build the forest from a flat list.
    ///
    /// Duplicate ids keep their first occurrence. A parent chain that loops
    /// back on itself is broken by promoting every item on the loop to a
    /// root.
    pub fn build(items: Vec<T>) -> Self {
        let mut index = HashMap::with_capacity(items.len());
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            let id = item.id();
            if index.contains_key(&id) {
                continue;
            }
            index.insert(id, nodes.len());
            nodes.push(Node {
                item,
                parent: None,
                children: Vec::new(),
                level: 0,
            });
        }

        let tentative: Vec<Option<usize>> = nodes
            .iter()
            .map(|n| n.item.parent_id().and_then(|p| index.get(&p).copied()))
            .collect();

        let mut roots = Vec::new();
        for i in 0..nodes.len() {
            let parent = tentative[i].filter(|_| !on_cycle(&tentative, i));
            nodes[i].parent = parent;
            match parent {
                Some(p) => nodes[p].children.push(i),
                None => roots.push(i),
            }
        }

        let mut stack: Vec<(usize, usize)> = roots.iter().map(|&r| (r, 0)).collect();
        while let Some((i, level)) = stack.pop() {
            nodes[i].level = level;
            stack.extend(nodes[i].children.iter().map(|&c| (c, level + 1)));
        }

        Self {
            nodes,
            index,
            roots,
        }
    }

    /// Number of distinct items in the forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Count of all comments reachable from the roots, for display counters.
    pub fn total_count(&self) -> usize {
        fn count<T>(nodes: &[Node<T>], i: usize) -> usize {
            1 + nodes[i]
                .children
                .iter()
                .map(|&c| count(nodes, c))
                .sum::<usize>()
        }
        self.roots.iter().map(|&r| count(&self.nodes, r)).sum()
    }

    /// Items in insertion order, regardless of nesting.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter().map(|n| &n.item)
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_, T>> {
        self.roots.iter().map(move |&i| NodeRef { thread: self, idx: i })
    }

    /// Look up a node by comment id.
    pub fn find(&self, id: DbId) -> Option<NodeRef<'_, T>> {
        self.index
            .get(&id)
            .map(|&i| NodeRef { thread: self, idx: i })
    }

    /// The comment that `id` replies to, if it is present in the thread.
    pub fn replying_to(&self, id: DbId) -> Option<&T> {
        self.find(id).and_then(|n| n.parent()).map(|p| p.item())
    }

    /// Whether replying to `id` is allowed under `max_depth`.
    ///
    /// Uses the stored depth, which matches what the server enforces even
    /// when a filtered ancestor has promoted the comment to a root here.
    pub fn can_reply(&self, id: DbId, max_depth: i32) -> bool {
        self.find(id)
            .is_some_and(|n| n.item().depth() < max_depth)
    }

    /// Consume the forest into an owned nested view.
    pub fn into_views(self, max_depth: i32) -> Vec<ThreadView<T>> {
        let mut slots: Vec<Option<T>> = Vec::with_capacity(self.nodes.len());
        let mut shape: Vec<(Vec<usize>, usize)> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            slots.push(Some(node.item));
            shape.push((node.children, node.level));
        }

        fn take<T: ThreadItem>(
            i: usize,
            slots: &mut [Option<T>],
            shape: &[(Vec<usize>, usize)],
            max_depth: i32,
        ) -> Option<ThreadView<T>> {
            let comment = slots[i].take()?;
            let replies = shape[i]
                .0
                .iter()
                .filter_map(|&c| take(c, slots, shape, max_depth))
                .collect();
            Some(ThreadView {
                can_reply: comment.depth() < max_depth,
                level: shape[i].1,
                comment,
                replies,
            })
        }

        self.roots
            .iter()
            .filter_map(|&r| take(r, &mut slots, &shape, max_depth))
            .collect()
    }
}

/// Follow tentative parent links from `start`; true when they lead back to it.
fn on_cycle(parents: &[Option<usize>], start: usize) -> bool {
    let mut cur = parents[start];
    for _ in 0..parents.len() {
        match cur {
            Some(p) if p == start => return true,
            Some(p) => cur = parents[p],
            None => return false,
        }
    }
    false
}

/// Borrowed handle to one node of a [`Thread`].
pub struct NodeRef<'a, T> {
    thread: &'a Thread<T>,
    idx: usize,
}

impl<'a, T> NodeRef<'a, T> {
    pub fn item(&self) -> &'a T {
        &self.thread.nodes[self.idx].item
    }

    /// Distance from the node's root within this forest.
    pub fn level(&self) -> usize {
        self.thread.nodes[self.idx].level
    }

    pub fn parent(&self) -> Option<NodeRef<'a, T>> {
        self.thread.nodes[self.idx].parent.map(|p| NodeRef {
            thread: self.thread,
            idx: p,
        })
    }

    pub fn replies(&self) -> impl Iterator<Item = NodeRef<'a, T>> + 'a {
        let thread = self.thread;
        thread.nodes[self.idx]
            .children
            .iter()
            .map(move |&c| NodeRef { thread, idx: c })
    }
}

/// Owned nested form of a thread, serialized for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadView<T> {
    #[serde(flatten)]
    pub comment: T,
    pub level: usize,
    pub can_reply: bool,
    pub replies: Vec<ThreadView<T>>,
}
