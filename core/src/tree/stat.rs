//! Shape statistics of trees.
//!
//! Every statistic maps a [`Tree`] to a number, or to [`Outcome::Rejected`] if the shape of the
//! tree does not meet the precondition of the statistic. Only [`balance_ratios`] can reject.

use std::fmt;

use super::{Clade, Tree};

/// The result of evaluating a statistic on a tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome<T> {
    /// The statistic is defined for the tree.
    Accepted(T),
    /// The statistic is undefined for the tree, which should be discarded.
    Rejected,
}

impl<T> Outcome<T> {
    /// Returns the accepted value, if any.
    pub fn accepted(self) -> Option<T> {
        match self {
            Outcome::Accepted(t) => Some(t),
            Outcome::Rejected => None,
        }
    }

    /// Returns `true` if the outcome is [`Outcome::Rejected`].
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected)
    }

    /// Maps an accepted value.
    pub fn map<U, F>(self, op: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Accepted(t) => Outcome::Accepted(op(t)),
            Outcome::Rejected => Outcome::Rejected,
        }
    }
}

/// A value that can be flattened into a sample of scalar observations.
///
/// Vector-valued results contribute each component as a separate observation, even though the
/// components of one result are not independent.
pub trait Observation {
    /// Appends the components of the value to `values`.
    fn flatten_into(self, values: &mut Vec<f64>);
}

impl Observation for f64 {
    fn flatten_into(self, values: &mut Vec<f64>) {
        values.push(self);
    }
}

impl Observation for usize {
    fn flatten_into(self, values: &mut Vec<f64>) {
        values.push(self as f64);
    }
}

impl<const N: usize> Observation for [f64; N] {
    fn flatten_into(self, values: &mut Vec<f64>) {
        values.extend(self);
    }
}

/// A statistic to evaluate on generated trees.
///
/// Implemented for [`ShapeStatistic`] and for closures returning an [`Outcome`].
pub trait Statistic {
    /// The type of an accepted result.
    type Value: Observation;

    /// Evaluates the statistic on a tree.
    fn evaluate(&mut self, tree: &Tree) -> Outcome<Self::Value>;
}

impl<F, T> Statistic for F
where
    F: FnMut(&Tree) -> Outcome<T>,
    T: Observation,
{
    type Value = T;

    fn evaluate(&mut self, tree: &Tree) -> Outcome<Self::Value> {
        self(tree)
    }
}

/// Number of clades with exactly two leaf children.
pub fn cherry_count(tree: &Tree) -> usize {
    tree.clades()
        .filter(|clade| clade.children().len() == 2 && tree.children_weight(clade) == 2)
        .count()
}

/// Sum over binary splits of the absolute weight difference between the two children.
///
/// Multifurcations contribute zero.
pub fn colless_index(tree: &Tree) -> usize {
    tree.clades()
        .filter_map(|clade| match clade.children() {
            &[left, right] => Some(tree.clade(left).weight().abs_diff(tree.clade(right).weight())),
            _ => None,
        })
        .sum()
}

/// Mean depth of leaves, in edges from the root.
pub fn sackin_index(tree: &Tree) -> f64 {
    let (sum, count) = tree
        .leaf_depths()
        .fold((0, 0), |(sum, count), depth| (sum + depth, count + 1));

    sum as f64 / count as f64
}

/// The fraction of leaves below each of the two children of the root.
///
/// Rejected if the root is a multifurcation, since the split is then not a pair.
pub fn balance_ratios(tree: &Tree) -> Outcome<[f64; 2]> {
    let leaves = tree.leaves() as f64;

    match tree.root().children() {
        &[left, right] => Outcome::Accepted([
            tree.clade(left).weight() as f64 / leaves,
            tree.clade(right).weight() as f64 / leaves,
        ]),
        _ => Outcome::Rejected,
    }
}

impl Tree {
    fn children_weight(&self, clade: &Clade) -> usize {
        clade
            .children()
            .iter()
            .map(|&child| self.clade(child).weight())
            .sum()
    }
}

/// The result of a [`ShapeStatistic`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Observed {
    /// A single number.
    Scalar(f64),
    /// A pair of numbers from the same tree.
    Pair([f64; 2]),
}

impl Observation for Observed {
    fn flatten_into(self, values: &mut Vec<f64>) {
        match self {
            Observed::Scalar(x) => x.flatten_into(values),
            Observed::Pair(pair) => pair.flatten_into(values),
        }
    }
}

/// The built-in shape statistics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShapeStatistic {
    /// See [`cherry_count`].
    Cherries,
    /// See [`colless_index`].
    Colless,
    /// See [`sackin_index`].
    Sackin,
    /// See [`balance_ratios`].
    BalanceRatios,
}

impl ShapeStatistic {
    /// Returns the name of the statistic.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeStatistic::Cherries => "cherries",
            ShapeStatistic::Colless => "colless",
            ShapeStatistic::Sackin => "sackin",
            ShapeStatistic::BalanceRatios => "balance",
        }
    }
}

impl Statistic for ShapeStatistic {
    type Value = Observed;

    fn evaluate(&mut self, tree: &Tree) -> Outcome<Self::Value> {
        match self {
            ShapeStatistic::Cherries => {
                Outcome::Accepted(Observed::Scalar(cherry_count(tree) as f64))
            }
            ShapeStatistic::Colless => {
                Outcome::Accepted(Observed::Scalar(colless_index(tree) as f64))
            }
            ShapeStatistic::Sackin => Outcome::Accepted(Observed::Scalar(sackin_index(tree))),
            ShapeStatistic::BalanceRatios => balance_ratios(tree).map(Observed::Pair),
        }
    }
}

impl fmt::Display for ShapeStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tree::{
        tests::{five_leaves, star},
        TreeBuilder,
    };

    /// ((a,b),(c,d)); every split perfectly balanced.
    fn balanced_four() -> Tree {
        let mut builder = TreeBuilder::with_leaves(4);
        let leaves = (0..4).map(|_| builder.add_leaf(1.0)).collect::<Vec<_>>();
        let ab = builder.add_internal(vec![leaves[0], leaves[1]], 1.0);
        let cd = builder.add_internal(vec![leaves[2], leaves[3]], 1.0);
        let root = builder.add_internal(vec![ab, cd], 0.0);
        builder.build(root)
    }

    /// (a,(b,c,d)); binary root over a multifurcation.
    fn binary_root_over_star() -> Tree {
        let mut builder = TreeBuilder::with_leaves(4);
        let a = builder.add_leaf(2.0);
        let bcd = (0..3).map(|_| builder.add_leaf(1.0)).collect();
        let bcd = builder.add_internal(bcd, 1.0);
        let root = builder.add_internal(vec![a, bcd], 0.0);
        builder.build(root)
    }

    #[test]
    fn test_cherry_count() {
        assert_eq!(cherry_count(&five_leaves()), 2);
        assert_eq!(cherry_count(&balanced_four()), 2);
        assert_eq!(cherry_count(&star(4)), 0);
        assert_eq!(cherry_count(&star(2)), 1);
    }

    #[test]
    fn test_colless_index() {
        // Root 2 vs 3, cde 1 vs 2, and two cherries
        assert_eq!(colless_index(&five_leaves()), 2);
        assert_eq!(colless_index(&star(5)), 0);
        assert_eq!(colless_index(&binary_root_over_star()), 2);
    }

    #[test]
    fn test_colless_index_zero_if_perfectly_balanced() {
        assert_eq!(colless_index(&balanced_four()), 0);
    }

    #[test]
    fn test_sackin_index() {
        assert_eq!(sackin_index(&five_leaves()), 12.0 / 5.0);
        assert_eq!(sackin_index(&balanced_four()), 2.0);
        assert_eq!(sackin_index(&star(7)), 1.0);
    }

    #[test]
    fn test_balance_ratios() {
        assert_eq!(balance_ratios(&five_leaves()), Outcome::Accepted([0.4, 0.6]));
        assert_eq!(
            balance_ratios(&binary_root_over_star()),
            Outcome::Accepted([0.25, 0.75])
        );
    }

    #[test]
    fn test_balance_ratios_rejects_multifurcating_root() {
        assert!(balance_ratios(&star(3)).is_rejected());
    }

    #[test]
    fn test_flatten_observations() {
        let mut values = Vec::new();

        1.5.flatten_into(&mut values);
        3usize.flatten_into(&mut values);
        Observed::Pair([0.25, 0.75]).flatten_into(&mut values);

        assert_eq!(values, [1.5, 3.0, 0.25, 0.75]);
    }

    #[test]
    fn test_shape_statistic_evaluate() {
        let tree = five_leaves();

        assert_eq!(
            ShapeStatistic::Colless.evaluate(&tree),
            Outcome::Accepted(Observed::Scalar(2.0))
        );
        assert_eq!(
            ShapeStatistic::BalanceRatios.evaluate(&star(4)),
            Outcome::Rejected
        );
    }

    #[test]
    fn test_closure_as_statistic() {
        let mut leaves = |tree: &Tree| Outcome::Accepted(tree.leaves());

        assert_eq!(leaves.evaluate(&five_leaves()), Outcome::Accepted(5));
    }
}
