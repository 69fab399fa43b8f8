//! Tree operations: insert, remove, reparent, walk, clone.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId, NodeKind};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The central node tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// Shadow roots are not children of their host: they hang off the host through
/// a separate pair of maps, so plain tree walks never enter them.
#[derive(Debug)]
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    shadow_roots: SecondaryMap<NodeId, NodeId>,
    shadow_hosts: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
}

impl Dom {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            shadow_roots: SecondaryMap::new(),
            shadow_hosts: SecondaryMap::new(),
            root: None,
        }
    }

    /// Insert a detached node (no parent).
    ///
    /// If no root has been set yet, this node becomes the root.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        debug_assert!(self.nodes.contains_key(parent), "parent node does not exist");
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        id
    }

    /// Detach `node` from its parent, keeping its subtree intact.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(old_parent) = self.parent.remove(node) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != node);
            }
        }
    }

    /// Move `node` to become the last child of `new_parent`.
    ///
    /// The node keeps its subtree intact. If `node` was previously a child of
    /// another parent, it is detached first. Returns `false` when either node
    /// is missing or the move would make a node its own ancestor.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> bool {
        if !self.nodes.contains_key(node) || !self.nodes.contains_key(new_parent) {
            return false;
        }
        if node == new_parent || self.ancestors(new_parent).contains(&node) {
            return false;
        }

        self.detach(node);
        self.parent.insert(node, new_parent);
        if let Some(siblings) = self.children.get_mut(new_parent) {
            siblings.push(node);
        }
        true
    }

    /// Remove a node and everything it owns: descendants, attached shadow
    /// trees and template content.
    ///
    /// Returns the ids of every removed node, `node` first.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }

        self.detach(id);
        if let Some(host) = self.shadow_hosts.remove(id) {
            self.shadow_roots.remove(host);
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let mut removed = Vec::new();
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            if let Some(shadow) = self.shadow_roots.remove(current) {
                self.shadow_hosts.remove(shadow);
                to_remove.push_back(shadow);
            }
            self.parent.remove(current);
            if let Some(data) = self.nodes.remove(current) {
                if let Some(content) = data.template_content {
                    to_remove.push_back(content);
                }
                removed.push(current);
            }
        }

        removed
    }

    /// Deep-clone the subtree rooted at `id` into a new detached subtree.
    ///
    /// Template content is cloned along with its template; shadow roots are
    /// not (they belong to live element instances).
    pub fn clone_subtree(&mut self, id: NodeId) -> Option<NodeId> {
        let mut data = self.nodes.get(id)?.clone();
        let content = data.template_content.take();
        let copy = self.nodes.insert(data);
        self.children.insert(copy, Vec::new());

        if let Some(content) = content {
            if let Some(content_copy) = self.clone_subtree(content) {
                if let Some(node) = self.nodes.get_mut(copy) {
                    node.template_content = Some(content_copy);
                }
            }
        }

        let kids = self.children(id).to_vec();
        for child in kids {
            if let Some(child_copy) = self.clone_subtree(child) {
                self.parent.insert(child_copy, copy);
                if let Some(siblings) = self.children.get_mut(copy) {
                    siblings.push(child_copy);
                }
            }
        }
        Some(copy)
    }

    /// Attach `shadow` as the shadow root of `host`.
    pub(crate) fn attach_shadow_root(&mut self, host: NodeId, shadow: NodeId) {
        self.shadow_roots.insert(host, shadow);
        self.shadow_hosts.insert(shadow, host);
    }

    /// The shadow root attached to `host`, if any.
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.shadow_roots.get(host).copied()
    }

    /// The host a shadow root is attached to.
    pub fn shadow_host(&self, shadow: NodeId) -> Option<NodeId> {
        self.shadow_hosts.get(shadow).copied()
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// The parent, or the host when `id` is a shadow root.
    pub fn composed_parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).or_else(|| self.shadow_host(id))
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the top of its tree, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself. The walk stops at a
    /// shadow root; it does not continue into the host.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `id` is reachable from the root, crossing shadow boundaries.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let mut current = id;
        loop {
            if current == root {
                return true;
            }
            match self.composed_parent(current) {
                Some(next) => current = next,
                None => return false,
            }
        }
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Kind of a node, if it exists.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(|data| data.kind)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Explicitly set the root node.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the arena contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Pre-order traversal that also enters shadow trees.
    ///
    /// A host is followed by its shadow tree, then by its light children.
    pub fn walk_composed(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
            if let Some(shadow) = self.shadow_root(current) {
                stack.push(shadow);
            }
        }
        result
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let a = dom.insert_child(root, NodeData::element("section").with_id("a"));
        let b = dom.insert_child(root, NodeData::element("aside").with_id("b"));
        let c = dom.insert_child(a, NodeData::element("button").with_id("c"));
        let d = dom.insert_child(a, NodeData::text("d"));
        (dom, root, a, b, c, d)
    }

    #[test]
    fn insert_sets_root() {
        let mut dom = Dom::new();
        let id = dom.insert(NodeData::document());
        assert_eq!(dom.root(), Some(id));
        let _detached = dom.insert(NodeData::element("div"));
        assert_eq!(dom.root(), Some(id));
    }

    #[test]
    fn children_and_parents() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.children(root), &[a, b]);
        assert_eq!(dom.children(a), &[c, d]);
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), None);
        assert_eq!(dom.ancestors(c), vec![a, root]);
    }

    #[test]
    fn remove_subtree_returns_all_ids() {
        let (mut dom, root, a, b, c, d) = build_tree();
        let removed = dom.remove(a);
        assert_eq!(removed, vec![a, c, d]);
        assert!(!dom.contains(c));
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn remove_nonexistent() {
        let mut dom = Dom::new();
        let id = dom.insert(NodeData::element("x"));
        dom.remove(id);
        assert!(dom.remove(id).is_empty());
        assert_eq!(dom.root(), None);
    }

    #[test]
    fn reparent_moves_subtree() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        assert!(dom.reparent(c, b));
        assert_eq!(dom.parent(c), Some(b));
        assert!(!dom.children(a).contains(&c));
        assert_eq!(dom.ancestors(c), vec![b, root]);
    }

    #[test]
    fn reparent_rejects_cycles() {
        let (mut dom, _root, a, _b, c, _d) = build_tree();
        assert!(!dom.reparent(a, c));
        assert!(!dom.reparent(a, a));
        assert_eq!(dom.parent(c), Some(a));
    }

    #[test]
    fn shadow_root_is_not_a_child() {
        let (mut dom, root, _a, b, _c, _d) = build_tree();
        let shadow = dom.insert(NodeData::shadow_root());
        dom.attach_shadow_root(b, shadow);
        let inner = dom.insert_child(shadow, NodeData::element("p"));

        assert!(!dom.children(b).contains(&shadow));
        assert_eq!(dom.shadow_root(b), Some(shadow));
        assert_eq!(dom.shadow_host(shadow), Some(b));
        assert_eq!(dom.ancestors(inner), vec![shadow]);
        assert_eq!(dom.composed_parent(shadow), Some(b));
        assert!(dom.is_connected(inner));
        assert!(!dom.walk_depth_first(root).contains(&inner));
        assert!(dom.walk_composed(root).contains(&inner));
    }

    #[test]
    fn remove_host_removes_shadow_tree() {
        let (mut dom, _root, _a, b, _c, _d) = build_tree();
        let shadow = dom.insert(NodeData::shadow_root());
        dom.attach_shadow_root(b, shadow);
        let inner = dom.insert_child(shadow, NodeData::element("p"));
        let removed = dom.remove(b);
        assert!(removed.contains(&shadow));
        assert!(removed.contains(&inner));
        assert!(!dom.contains(inner));
    }

    #[test]
    fn detached_nodes_are_not_connected() {
        let (mut dom, _root, a, ..) = build_tree();
        let loose = dom.insert(NodeData::element("div"));
        assert!(dom.is_connected(a));
        assert!(!dom.is_connected(loose));
        dom.detach(a);
        assert!(!dom.is_connected(a));
    }

    #[test]
    fn clone_subtree_copies_template_content() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::document());
        let template = dom.insert_child(root, NodeData::element("template").with_id("t"));
        let content = dom.insert(NodeData::fragment());
        dom.get_mut(template).unwrap().template_content = Some(content);
        let main = dom.insert_child(content, NodeData::element("main"));

        let copy = dom.clone_subtree(template).unwrap();
        let copied_content = dom.get(copy).unwrap().template_content.unwrap();
        assert_ne!(copied_content, content);
        let copied_main = dom.children(copied_content)[0];
        assert_ne!(copied_main, main);
        assert_eq!(dom.get(copied_main).unwrap().tag, "main");
        assert_eq!(dom.parent(copy), None);
    }

    #[test]
    fn walk_orders() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(dom.walk_depth_first(a), vec![a, c, d]);
        assert_eq!(dom.walk_composed(root), vec![root, a, c, d, b]);
    }

    #[test]
    fn default_impl() {
        let dom = Dom::default();
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
    }
}
