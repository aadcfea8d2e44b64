//! Genealogical trees.
//!
//! A [`Tree`] is an arena of [`Clade`]s. Clades are addressed by [`CladeId`] and built bottom-up
//! with a [`TreeBuilder`], which derives the weight of every internal clade from its children.

pub mod stat;

/// Index of a clade in the arena of its [`Tree`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CladeId(pub(crate) usize);

/// A subtree and the branch leading to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Clade {
    weight: usize,
    branch_length: f64,
    children: Vec<CladeId>,
}

impl Clade {
    /// Returns the length of the branch above this clade.
    ///
    /// This is the time during which the ancestral lineage carried exactly [`Clade::weight`]
    /// descendants.
    pub fn branch_length(&self) -> f64 {
        self.branch_length
    }

    /// Returns the ids of the children.
    pub fn children(&self) -> &[CladeId] {
        &self.children
    }

    /// Returns `true` if the clade has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the number of leaves descending from this clade.
    pub fn weight(&self) -> usize {
        self.weight
    }
}

/// A rooted tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
    clades: Vec<Clade>,
    root: CladeId,
}

impl Tree {
    /// Returns the clade with the provided id.
    ///
    /// # Panics
    ///
    /// If the id was issued by a different tree and is out of bounds.
    pub fn clade(&self, id: CladeId) -> &Clade {
        &self.clades[id.0]
    }

    /// Returns an iterator over all clades, leaves and internal clades alike, in arena order.
    pub fn clades(&self) -> std::slice::Iter<'_, Clade> {
        self.clades.iter()
    }

    /// Returns the children of the clade with the provided id.
    pub fn children(&self, id: CladeId) -> impl Iterator<Item = &Clade> + '_ {
        self.clade(id).children.iter().map(|&child| self.clade(child))
    }

    /// Returns an iterator over the depth of every leaf, counted in edges from the root.
    pub fn leaf_depths(&self) -> LeafDepths<'_> {
        LeafDepths {
            tree: self,
            stack: vec![(self.root, 0)],
        }
    }

    /// Returns the number of leaves.
    pub fn leaves(&self) -> usize {
        self.root().weight
    }

    /// Returns the root clade.
    pub fn root(&self) -> &Clade {
        self.clade(self.root)
    }

    /// Returns the id of the root clade.
    pub fn root_id(&self) -> CladeId {
        self.root
    }

    /// Returns the sum of all branch lengths, including that of the root.
    pub fn total_length(&self) -> f64 {
        self.clades.iter().map(|clade| clade.branch_length).sum()
    }
}

/// Depth-first iterator over leaf depths, see [`Tree::leaf_depths`].
#[derive(Debug)]
pub struct LeafDepths<'a> {
    tree: &'a Tree,
    stack: Vec<(CladeId, usize)>,
}

impl<'a> Iterator for LeafDepths<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            let clade = self.tree.clade(id);

            if clade.is_leaf() {
                return Some(depth);
            }

            self.stack
                .extend(clade.children.iter().map(|&child| (child, depth + 1)));
        }

        None
    }
}

/// Bottom-up construction of a [`Tree`].
///
/// Children must be added before their parent, and every clade may be used as a child at most
/// once.
#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    clades: Vec<Clade>,
}

impl TreeBuilder {
    /// Creates a new builder with capacity for a tree with the provided number of leaves.
    pub fn with_leaves(leaves: usize) -> Self {
        Self {
            clades: Vec::with_capacity(2 * leaves),
        }
    }

    /// Adds a leaf.
    pub fn add_leaf(&mut self, branch_length: f64) -> CladeId {
        self.push(Clade {
            weight: 1,
            branch_length,
            children: Vec::new(),
        })
    }

    /// Adds an internal clade with the provided children.
    ///
    /// # Panics
    ///
    /// If `children` is empty or contains an id not issued by this builder.
    pub fn add_internal(&mut self, children: Vec<CladeId>, branch_length: f64) -> CladeId {
        assert!(!children.is_empty(), "internal clade without children");

        let weight = children.iter().map(|child| self.clades[child.0].weight).sum();

        self.push(Clade {
            weight,
            branch_length,
            children,
        })
    }

    /// Sets the branch length of an existing clade.
    pub fn set_branch_length(&mut self, id: CladeId, branch_length: f64) {
        self.clades[id.0].branch_length = branch_length;
    }

    /// Finishes the tree, rooted at the provided clade.
    pub fn build(self, root: CladeId) -> Tree {
        debug_assert!(root.0 < self.clades.len());

        Tree {
            clades: self.clades,
            root,
        }
    }

    fn push(&mut self, clade: Clade) -> CladeId {
        debug_assert!(clade.branch_length >= 0.0, "negative branch length");

        let id = CladeId(self.clades.len());
        self.clades.push(clade);
        id
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// ((a:1,b:1):2,(c:0.5,(d:0.25,e:0.25):0.25):2.5); with a root branch of length zero.
    pub fn five_leaves() -> Tree {
        let mut builder = TreeBuilder::with_leaves(5);

        let a = builder.add_leaf(1.0);
        let b = builder.add_leaf(1.0);
        let ab = builder.add_internal(vec![a, b], 2.0);

        let c = builder.add_leaf(0.5);
        let d = builder.add_leaf(0.25);
        let e = builder.add_leaf(0.25);
        let de = builder.add_internal(vec![d, e], 0.25);
        let cde = builder.add_internal(vec![c, de], 2.5);

        let root = builder.add_internal(vec![ab, cde], 0.0);
        builder.build(root)
    }

    /// A single multifurcation, e.g. (a:1,b:1,c:1,d:1); for four leaves.
    pub fn star(leaves: usize) -> Tree {
        let mut builder = TreeBuilder::with_leaves(leaves);
        let children = (0..leaves).map(|_| builder.add_leaf(1.0)).collect();
        let root = builder.add_internal(children, 0.0);
        builder.build(root)
    }

    #[test]
    fn test_weights_derived_from_children() {
        let tree = five_leaves();

        assert_eq!(tree.leaves(), 5);

        let weights = tree.clades().map(Clade::weight).collect::<Vec<_>>();
        assert_eq!(weights, [1, 1, 2, 1, 1, 1, 2, 3, 5]);
    }

    #[test]
    fn test_leaf_depths() {
        let mut depths = five_leaves().leaf_depths().collect::<Vec<_>>();
        depths.sort();

        assert_eq!(depths, [2, 2, 2, 3, 3]);
    }

    #[test]
    fn test_total_length() {
        assert_eq!(five_leaves().total_length(), 7.75);
        assert_eq!(star(4).total_length(), 4.0);
    }

    #[test]
    fn test_children_of_root() {
        let tree = five_leaves();

        let weights = tree
            .children(tree.root_id())
            .map(Clade::weight)
            .collect::<Vec<_>>();

        assert_eq!(weights, [2, 3]);
    }
}
