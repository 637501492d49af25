//! Pattern Compiler: typed pattern trees and ordered rule-sets.
//!
//! A rule-set source is a flat list of `lhs => rhs` triples. Each side is
//! parsed into an [`Expr`]; the left side binds variables, the right side may
//! only use them.

mod compile;
mod display;


use std::collections::BTreeMap;

use crate::schema::NodeId;
use crate::span::Span;

pub use compile::{compile_rule_set, compile_rules, parse_match, Bound};
pub use display::ExprDisplay;

/// What a pattern position matches.
#[derive(Clone, Debug, PartialEq)]
pub enum Head {
    /// `_`: anything, binds nothing.
    Wildcard,
    /// A free variable: binds on the left side, refers on the right side.
    Var(String),
    /// A node of this kind.
    Node(NodeId),
}

/// `[field value]`: payload field equals a literal.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub field: String,
    pub value: String,
    pub span: Span,
}

/// One pattern position and its subtree.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub head: Head,
    /// Operand patterns; exactly the node's arity when `head` is a node.
    pub children: Vec<Expr>,
    /// `name:(...)` alias for the whole subtree.
    pub binding: Option<String>,
    pub constraints: Vec<Constraint>,
    pub span: Span,
}

/// One `lhs => rhs` rewrite.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub lhs: Expr,
    pub rhs: Expr,
    /// Node kind at the root of `lhs`.
    pub root: NodeId,
    pub span: Span,
}

/// A named, ordered list of rules. Source order is match priority.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    pub name: String,
    pub rules: Vec<Rule>,
    by_node: BTreeMap<NodeId, Vec<usize>>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, rule: Rule) {
        self.by_node
            .entry(rule.root)
            .or_default()
            .push(self.rules.len());
        self.rules.push(rule);
    }

    /// Rules rooted at `node`, in source order.
    pub fn rules_for(&self, node: NodeId) -> impl Iterator<Item = &Rule> {
        self.by_node
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&i| &self.rules[i])
    }

    /// Node kinds owning at least one rule, in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.by_node.keys().copied()
    }
}
