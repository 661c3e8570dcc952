//! Balanced rope over measurable leaves.
//!
//! [`Rope`] is a height-balanced (AVL-style) binary tree whose leaves are
//! values implementing [`Measure`]. Every branch caches the combined
//! [`Metrics`] of its subtree, its leaf count and its depth. Nodes are shared
//! through `Arc`, so `split`/`concat` reuse untouched subtrees instead of
//! copying them.
//!
//! Structural operations (`split`, `concat`, `insert`, `delete`, `get`,
//! `locate`, `metrics_before`) are `O(log n)` in the number of leaves.
//! [`Rope::walk`] visits every leaf once in order and is the only supported
//! way to iterate; calling `get` in a loop is `O(n log n)` and must be avoided.

use crate::text::metrics::{Measure, Metrics};
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

/// Result of a visitor callback during [`Rope::walk`].
pub type WalkControl = ControlFlow<()>;

enum Node<T: Measure> {
    Leaf {
        value: T,
        metrics: T::Metrics,
    },
    Branch {
        left: Arc<Node<T>>,
        right: Arc<Node<T>>,
        metrics: T::Metrics,
        count: usize,
        depth: u32,
    },
}

impl<T: Measure> Node<T> {
    fn leaf(value: T) -> Arc<Self> {
        let metrics = value.measure();
        Arc::new(Self::Leaf { value, metrics })
    }

    fn branch(left: Arc<Self>, right: Arc<Self>) -> Arc<Self> {
        let metrics = T::Metrics::combine(left.metrics(), right.metrics());
        let count = left.count() + right.count();
        let depth = left.depth().max(right.depth()) + 1;
        Arc::new(Self::Branch {
            left,
            right,
            metrics,
            count,
            depth,
        })
    }

    fn metrics(&self) -> &T::Metrics {
        match self {
            Self::Leaf { metrics, .. } | Self::Branch { metrics, .. } => metrics,
        }
    }

    fn count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Branch { count, .. } => *count,
        }
    }

    fn depth(&self) -> u32 {
        match self {
            Self::Leaf { .. } => 0,
            Self::Branch { depth, .. } => *depth,
        }
    }

    fn children(&self) -> Option<(&Arc<Self>, &Arc<Self>)> {
        match self {
            Self::Leaf { .. } => None,
            Self::Branch { left, right, .. } => Some((left, right)),
        }
    }

    fn walk<F>(&self, f: &mut F) -> WalkControl
    where
        F: FnMut(&T) -> WalkControl,
    {
        match self {
            Self::Leaf { value, .. } => f(value),
            Self::Branch { left, right, .. } => {
                left.walk(f)?;
                right.walk(f)
            }
        }
    }
}

/// Build a balanced subtree from leaves already wrapped in nodes.
fn build<T: Measure>(leaves: &[Arc<Node<T>>]) -> Option<Arc<Node<T>>> {
    match leaves.len() {
        0 => None,
        1 => Some(Arc::clone(&leaves[0])),
        n => {
            let (left, right) = leaves.split_at(n / 2);
            Some(Node::branch(build(left)?, build(right)?))
        }
    }
}

/// Concatenate two balanced trees, keeping the result balanced.
fn join<T: Measure>(left: Arc<Node<T>>, right: Arc<Node<T>>) -> Arc<Node<T>> {
    let (dl, dr) = (left.depth(), right.depth());
    if dl > dr + 1 {
        if let Some((ll, lr)) = left.children() {
            let joined = join(Arc::clone(lr), right);
            return rebalance(Arc::clone(ll), joined);
        }
    } else if dr > dl + 1 {
        if let Some((rl, rr)) = right.children() {
            let joined = join(left, Arc::clone(rl));
            return rebalance(joined, Arc::clone(rr));
        }
    }
    Node::branch(left, right)
}

/// Join two subtrees whose depths differ by at most two, rotating as needed.
fn rebalance<T: Measure>(left: Arc<Node<T>>, right: Arc<Node<T>>) -> Arc<Node<T>> {
    if left.depth() > right.depth() + 1 {
        if let Some((ll, lr)) = left.children() {
            if ll.depth() >= lr.depth() {
                return Node::branch(Arc::clone(ll), Node::branch(Arc::clone(lr), right));
            }
            if let Some((lrl, lrr)) = lr.children() {
                return Node::branch(
                    Node::branch(Arc::clone(ll), Arc::clone(lrl)),
                    Node::branch(Arc::clone(lrr), right),
                );
            }
        }
    } else if right.depth() > left.depth() + 1 {
        if let Some((rl, rr)) = right.children() {
            if rr.depth() >= rl.depth() {
                return Node::branch(Node::branch(left, Arc::clone(rl)), Arc::clone(rr));
            }
            if let Some((rll, rlr)) = rl.children() {
                return Node::branch(
                    Node::branch(left, Arc::clone(rll)),
                    Node::branch(Arc::clone(rlr), Arc::clone(rr)),
                );
            }
        }
    }
    Node::branch(left, right)
}

fn join_opt<T: Measure>(
    left: Option<Arc<Node<T>>>,
    right: Option<Arc<Node<T>>>,
) -> Option<Arc<Node<T>>> {
    match (left, right) {
        (Some(l), Some(r)) => Some(join(l, r)),
        (l, None) => l,
        (None, r) => r,
    }
}

type SplitNodes<T> = (Option<Arc<Node<T>>>, Option<Arc<Node<T>>>);

fn split_node<T: Measure>(node: &Arc<Node<T>>, index: usize) -> SplitNodes<T> {
    if index == 0 {
        return (None, Some(Arc::clone(node)));
    }
    if index >= node.count() {
        return (Some(Arc::clone(node)), None);
    }
    let Some((left, right)) = node.children() else {
        return (Some(Arc::clone(node)), None);
    };
    let left_count = left.count();
    if index < left_count {
        let (a, b) = split_node(left, index);
        (a, join_opt(b, Some(Arc::clone(right))))
    } else if index == left_count {
        (Some(Arc::clone(left)), Some(Arc::clone(right)))
    } else {
        let (a, b) = split_node(right, index - left_count);
        (join_opt(Some(Arc::clone(left)), a), b)
    }
}

/// Balanced tree of measurable leaves.
pub struct Rope<T: Measure> {
    root: Option<Arc<Node<T>>>,
}

impl<T: Measure> Clone for Rope<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<T: Measure> Default for Rope<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Measure> fmt::Debug for Rope<T>
where
    T::Metrics: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rope")
            .field("len", &self.len())
            .field("depth", &self.depth())
            .field("metrics", &self.metrics())
            .finish()
    }
}

impl<T: Measure> Rope<T> {
    /// Create an empty rope.
    #[must_use]
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Build a balanced rope from leaves in order.
    #[must_use]
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let leaves: Vec<_> = items.into_iter().map(Node::leaf).collect();
        Self {
            root: build(&leaves),
        }
    }

    /// Number of leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.count())
    }

    /// Check if the rope has no leaves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Tree depth (0 for a single leaf or an empty rope).
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.root.as_ref().map_or(0, |n| n.depth())
    }

    /// Metrics of the whole rope.
    #[must_use]
    pub fn metrics(&self) -> T::Metrics {
        self.root
            .as_ref()
            .map_or_else(T::Metrics::default, |n| n.metrics().clone())
    }

    /// Leaf at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        let mut node = self.root.as_ref()?;
        let mut index = index;
        if index >= node.count() {
            return None;
        }
        loop {
            match &**node {
                Node::Leaf { value, .. } => return Some(value),
                Node::Branch { left, right, .. } => {
                    let left_count = left.count();
                    if index < left_count {
                        node = left;
                    } else {
                        index -= left_count;
                        node = right;
                    }
                }
            }
        }
    }

    /// Concatenate two ropes.
    #[must_use]
    pub fn concat(left: Self, right: Self) -> Self {
        Self {
            root: join_opt(left.root, right.root),
        }
    }

    /// Split into the first `index` leaves and the rest.
    ///
    /// `index` past the end yields `(self, empty)`.
    #[must_use]
    pub fn split(&self, index: usize) -> (Self, Self) {
        let Some(root) = self.root.as_ref() else {
            return (Self::new(), Self::new());
        };
        let (left, right) = split_node(root, index);
        (Self { root: left }, Self { root: right })
    }

    /// Insert leaves before leaf `index` (clamped to the end).
    pub fn insert<I>(&mut self, index: usize, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let middle = Self::from_items(items);
        if middle.is_empty() {
            return;
        }
        let (left, right) = self.split(index);
        *self = Self::concat(Self::concat(left, middle), right);
    }

    /// Remove leaves in `start..end` (clamped to the rope).
    pub fn delete(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let (left, rest) = self.split(start);
        let (_, right) = rest.split(end - start);
        *self = Self::concat(left, right);
    }

    /// Visit every leaf in order.
    ///
    /// The visitor returns [`ControlFlow::Break`] to stop early. No
    /// allocation; recursion depth is the tree depth.
    pub fn walk<F>(&self, mut f: F) -> WalkControl
    where
        F: FnMut(&T) -> WalkControl,
    {
        match self.root.as_ref() {
            Some(root) => root.walk(&mut f),
            None => ControlFlow::Continue(()),
        }
    }

    /// Find the leaf containing unit `target` of the metric picked by `measure`.
    ///
    /// Returns the leaf index and the remaining units into that leaf, or
    /// `None` when `target` is at or past the rope's total for that metric.
    #[must_use]
    pub fn locate<F>(&self, target: usize, measure: F) -> Option<(usize, usize)>
    where
        F: Fn(&T::Metrics) -> usize,
    {
        let mut node = self.root.as_ref()?;
        if target >= measure(node.metrics()) {
            return None;
        }
        let mut target = target;
        let mut index = 0;
        loop {
            match &**node {
                Node::Leaf { .. } => return Some((index, target)),
                Node::Branch { left, right, .. } => {
                    let left_units = measure(left.metrics());
                    if target < left_units {
                        node = left;
                    } else {
                        target -= left_units;
                        index += left.count();
                        node = right;
                    }
                }
            }
        }
    }

    /// Combined metrics of leaves `0..index`.
    #[must_use]
    pub fn metrics_before(&self, index: usize) -> T::Metrics {
        let mut acc = T::Metrics::default();
        let Some(mut node) = self.root.as_ref() else {
            return acc;
        };
        let mut index = index;
        loop {
            if index == 0 {
                return acc;
            }
            if index >= node.count() {
                return T::Metrics::combine(&acc, node.metrics());
            }
            let Some((left, right)) = node.children() else {
                return acc;
            };
            let left_count = left.count();
            if index < left_count {
                node = left;
            } else {
                acc = T::Metrics::combine(&acc, left.metrics());
                index -= left_count;
                node = right;
            }
        }
    }

    /// Call `f(node, left, right)` with the metrics of every branch.
    ///
    /// Diagnostic hook for checking the combine invariant; not used on hot
    /// paths.
    pub fn visit_branches<F>(&self, mut f: F)
    where
        F: FnMut(&T::Metrics, &T::Metrics, &T::Metrics),
    {
        fn go<T: Measure, F>(node: &Node<T>, f: &mut F)
        where
            F: FnMut(&T::Metrics, &T::Metrics, &T::Metrics),
        {
            if let Node::Branch {
                left,
                right,
                metrics,
                ..
            } = node
            {
                f(metrics, left.metrics(), right.metrics());
                go::<T, F>(left, f);
                go::<T, F>(right, f);
            }
        }
        if let Some(root) = self.root.as_ref() {
            go::<T, F>(root, &mut f);
        }
    }

    /// Check that every branch is height-balanced and its cached depth and
    /// leaf count match its children.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        fn go<T: Measure>(node: &Node<T>) -> bool {
            match node {
                Node::Leaf { .. } => true,
                Node::Branch {
                    left,
                    right,
                    count,
                    depth,
                    ..
                } => {
                    left.depth().abs_diff(right.depth()) <= 1
                        && *depth == left.depth().max(right.depth()) + 1
                        && *count == left.count() + right.count()
                        && go::<T>(left)
                        && go::<T>(right)
                }
            }
        }
        self.root.as_ref().is_none_or(|root| go::<T>(root))
    }
}
