//! Schema Model: the Node Table and Group Table.
//!
//! Names are resolved to [`NodeId`] / [`GroupId`] indices once, when the
//! schema is loaded. Later stages hold ids and only go through the name
//! index when reading user-written patterns.

mod loader;


use std::collections::HashMap;

use crate::span::Span;

pub use loader::load;
pub(crate) use loader::is_identifier;

/// Index into the Node Table (declaration order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Index into the Group Table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u32);

/// One IR node kind.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDef {
    pub name: String,
    /// Fixed operand count.
    pub inputs: u32,
    /// Raw payload struct body, braces included.
    pub payload: Option<String>,
    pub span: Span,
}

/// A named set of same-arity nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupDef {
    pub name: String,
    pub members: Vec<NodeId>,
    /// Arity shared by every member.
    pub inputs: u32,
    pub span: Span,
}

/// Read-only node and group tables for one generation run.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    nodes: Vec<NodeDef>,
    groups: Vec<GroupDef>,
    node_index: HashMap<String, NodeId>,
    group_index: HashMap<String, GroupId>,
}

impl Schema {
    pub fn nodes(&self) -> &[NodeDef] {
        &self.nodes
    }

    pub fn groups(&self) -> &[GroupDef] {
        &self.groups
    }

    pub fn node(&self, id: NodeId) -> &NodeDef {
        &self.nodes[id.0 as usize]
    }

    pub fn group(&self, id: GroupId) -> &GroupDef {
        &self.groups[id.0 as usize]
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    pub fn group_id(&self, name: &str) -> Option<GroupId> {
        self.group_index.get(name).copied()
    }

    /// Node ids in declaration order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Nodes that declared a payload body, in declaration order.
    pub fn payload_nodes(&self) -> impl Iterator<Item = (&NodeDef, &str)> {
        self.nodes
            .iter()
            .filter_map(|n| n.payload.as_deref().map(|body| (n, body)))
    }

    fn push_node(&mut self, def: NodeDef) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.node_index.insert(def.name.clone(), id);
        self.nodes.push(def);
        id
    }

    fn push_group(&mut self, def: GroupDef) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        self.group_index.insert(def.name.clone(), id);
        self.groups.push(def);
        id
    }
}
