/// Ordered parent/child hierarchy keyed by unique string ids
///
/// The tree owns structure only: ids, parent links and sibling ordering.
/// Removing a node never removes its descendants; callers that need a
/// cascade collect `get_children_recursive` first and clean up per node.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{DesignerError, Entity, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode<T> {
    pub id: String,
    pub parent: Option<String>,
    pub order: i64,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree<T> {
    items: BTreeMap<String, TreeNode<T>>,
    /// Top-level ids in insertion sequence
    roots: Vec<String>,
    /// Child ids per parent in insertion sequence (tie-breaker for equal orders)
    children: BTreeMap<String, Vec<String>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Tree {
            items: BTreeMap::new(),
            roots: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a node. `order` defaults to the current number of siblings.
    pub fn add_item(
        &mut self,
        id: impl Into<String>,
        parent: Option<&str>,
        data: T,
        order: Option<i64>,
    ) -> Result<()> {
        let id = id.into();
        if self.items.contains_key(&id) {
            return Err(DesignerError::conflict(Entity::Node, id));
        }
        if let Some(parent) = parent {
            if !self.items.contains_key(parent) {
                return Err(DesignerError::not_found(Entity::Node, parent));
            }
        }

        let siblings = self.sibling_list_mut(parent);
        let order = order.unwrap_or(siblings.len() as i64);
        siblings.push(id.clone());

        self.items.insert(
            id.clone(),
            TreeNode {
                id,
                parent: parent.map(str::to_string),
                order,
                data,
            },
        );
        Ok(())
    }

    /// Remove a single node. Its children stay in place, detached.
    pub fn remove_item(&mut self, id: &str) -> Option<TreeNode<T>> {
        let node = self.items.remove(id)?;
        match node.parent.as_deref() {
            Some(parent) => {
                if let Some(list) = self.children.get_mut(parent) {
                    list.retain(|s| s != id);
                    if list.is_empty() && !self.items.contains_key(parent) {
                        self.children.remove(parent);
                    }
                }
            }
            None => self.roots.retain(|s| s != id),
        }
        if self.children.get(id).is_some_and(|c| c.is_empty()) {
            self.children.remove(id);
        }
        Some(node)
    }

    /// Swap the payload of an existing node
    pub fn update_item(&mut self, id: &str, data: T) -> Result<()> {
        let node = self
            .items
            .get_mut(id)
            .ok_or_else(|| DesignerError::not_found(Entity::Node, id))?;
        node.data = data;
        Ok(())
    }

    /// Move a node under a new parent, keeping its order value.
    pub fn change_parent(&mut self, id: &str, new_parent: &str) -> Result<()> {
        let old_parent = match self.items.get(id) {
            Some(node) => node.parent.clone(),
            None => return Err(DesignerError::not_found(Entity::Node, id)),
        };
        if !self.items.contains_key(new_parent) {
            return Err(DesignerError::not_found(Entity::Node, new_parent));
        }
        if id == new_parent || self.is_descendant(new_parent, id) {
            return Err(DesignerError::invalid(format!(
                "cannot move '{}' under its own descendant '{}'",
                id, new_parent
            )));
        }
        if old_parent.as_deref() == Some(new_parent) {
            return Ok(());
        }

        self.sibling_list_mut(old_parent.as_deref()).retain(|s| s != id);
        self.sibling_list_mut(Some(new_parent)).push(id.to_string());
        if let Some(node) = self.items.get_mut(id) {
            node.parent = Some(new_parent.to_string());
        }
        Ok(())
    }

    /// Re-key a node, keeping its position and re-linking its children
    pub fn rename_item(&mut self, id: &str, new_id: &str) -> Result<()> {
        if self.items.contains_key(new_id) {
            return Err(DesignerError::conflict(Entity::Node, new_id));
        }
        let mut node = self
            .items
            .remove(id)
            .ok_or_else(|| DesignerError::not_found(Entity::Node, id))?;

        for sibling in self.sibling_list_mut(node.parent.as_deref()) {
            if sibling == id {
                *sibling = new_id.to_string();
            }
        }
        if let Some(child_ids) = self.children.remove(id) {
            for child in &child_ids {
                if let Some(child_node) = self.items.get_mut(child) {
                    child_node.parent = Some(new_id.to_string());
                }
            }
            self.children.insert(new_id.to_string(), child_ids);
        }

        node.id = new_id.to_string();
        self.items.insert(new_id.to_string(), node);
        Ok(())
    }

    pub fn set_item_order(&mut self, id: &str, order: i64) -> Result<()> {
        let node = self
            .items
            .get_mut(id)
            .ok_or_else(|| DesignerError::not_found(Entity::Node, id))?;
        node.order = order;
        Ok(())
    }

    /// Stable-sort the stored sibling sequence by order.
    /// `None` resorts every sibling list in the tree.
    pub fn sort_items(&mut self, parent: Option<&str>) {
        let items = &self.items;
        let key = |id: &String| items.get(id).map(|n| n.order).unwrap_or(i64::MAX);

        match parent {
            Some(parent) => {
                if let Some(list) = self.children.get_mut(parent) {
                    list.sort_by_key(key);
                }
            }
            None => {
                self.roots.sort_by_key(key);
                for list in self.children.values_mut() {
                    list.sort_by_key(key);
                }
            }
        }
    }

    pub fn item_exists(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn get_item(&self, id: &str) -> Result<&TreeNode<T>> {
        self.items
            .get(id)
            .ok_or_else(|| DesignerError::not_found(Entity::Node, id))
    }

    pub fn get_item_mut(&mut self, id: &str) -> Result<&mut TreeNode<T>> {
        self.items
            .get_mut(id)
            .ok_or_else(|| DesignerError::not_found(Entity::Node, id))
    }

    pub fn get_item_data(&self, id: &str) -> Result<&T> {
        self.get_item(id).map(|node| &node.data)
    }

    pub fn parent_id(&self, id: &str) -> Option<&str> {
        self.items.get(id).and_then(|node| node.parent.as_deref())
    }

    pub fn has_children(&self, id: &str) -> bool {
        self.children.get(id).is_some_and(|c| !c.is_empty())
    }

    /// Direct children ordered by `order`, ties in insertion sequence
    pub fn get_children(&self, id: &str) -> Vec<&TreeNode<T>> {
        self.ordered(self.children.get(id).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Top-level nodes ordered by `order`
    pub fn roots(&self) -> Vec<&TreeNode<T>> {
        self.ordered(&self.roots)
    }

    /// Every descendant id, depth-first, each exactly once
    pub fn get_children_recursive(&self, id: &str) -> Vec<String> {
        let mut result = Vec::new();
        self.collect_descendants(id, &mut result);
        result
    }

    /// All nodes in id order
    pub fn items(&self) -> impl Iterator<Item = &TreeNode<T>> {
        self.items.values()
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut TreeNode<T>> {
        self.items.values_mut()
    }

    /// True when `id` sits somewhere below `ancestor`
    pub fn is_descendant(&self, id: &str, ancestor: &str) -> bool {
        let mut current = self.parent_id(id);
        // Bounded by node count so a corrupted parent chain can't spin forever
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.items.len() {
                return false;
            }
            current = self.parent_id(parent);
        }
        false
    }

    /// Check that parent links and sibling lists agree and contain no cycles
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut listed = 0usize;
        for id in &self.roots {
            match self.items.get(id) {
                Some(node) if node.parent.is_none() => listed += 1,
                Some(_) => return Err(format!("root '{}' has a parent", id)),
                None => return Err(format!("root '{}' has no node", id)),
            }
        }
        for (parent, child_ids) in &self.children {
            if !self.items.contains_key(parent) {
                return Err(format!("children listed for missing node '{}'", parent));
            }
            for id in child_ids {
                match self.items.get(id) {
                    Some(node) if node.parent.as_deref() == Some(parent.as_str()) => listed += 1,
                    Some(_) => {
                        return Err(format!("node '{}' is listed under the wrong parent", id))
                    }
                    None => return Err(format!("child '{}' has no node", id)),
                }
            }
        }
        if listed != self.items.len() {
            return Err(format!(
                "{} nodes are not linked into the hierarchy",
                self.items.len().saturating_sub(listed)
            ));
        }
        for (id, node) in &self.items {
            if node.id != *id {
                return Err(format!("node key '{}' does not match id '{}'", id, node.id));
            }
            if node.parent.is_some() && self.is_descendant(id, id) {
                return Err(format!("cycle through '{}'", id));
            }
        }
        // A cycle detached from every root still counts every node once; catch it by reachability
        let mut reachable = 0usize;
        for id in &self.roots {
            reachable += 1 + self.get_children_recursive(id).len();
        }
        if reachable != self.items.len() {
            return Err("nodes unreachable from any root".to_string());
        }
        Ok(())
    }

    fn collect_descendants(&self, id: &str, out: &mut Vec<String>) {
        if let Some(child_ids) = self.children.get(id) {
            for child in child_ids {
                if out.iter().any(|seen| seen == child) {
                    continue;
                }
                out.push(child.clone());
                self.collect_descendants(child, out);
            }
        }
    }

    fn ordered(&self, ids: &[String]) -> Vec<&TreeNode<T>> {
        let mut nodes: Vec<&TreeNode<T>> =
            ids.iter().filter_map(|id| self.items.get(id)).collect();
        nodes.sort_by_key(|node| node.order);
        nodes
    }

    fn sibling_list_mut(&mut self, parent: Option<&str>) -> &mut Vec<String> {
        match parent {
            Some(parent) => self.children.entry(parent.to_string()).or_default(),
            None => &mut self.roots,
        }
    }
}
