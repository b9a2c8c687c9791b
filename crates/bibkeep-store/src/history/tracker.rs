//! Persisted commit graph of one document
//!
//! The graph is an arena of commit ids with two adjacency maps. Every commit
//! has a timestamp entry, so the timestamp map doubles as the set of ids.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    /// Children of each commit in append order; childless commits may be absent
    #[serde(rename = "parent_to_childs")]
    pub parent_to_children: BTreeMap<String, Vec<String>>,
    pub child_to_parent: BTreeMap<String, String>,
    #[serde(rename = "BOTTOM")]
    pub bottom: String,
    /// Most recently created commit
    #[serde(rename = "TOP")]
    pub top: String,
    #[serde(rename = "current_parent")]
    pub current: String,
    #[serde(rename = "timestamp")]
    pub timestamps: BTreeMap<String, String>,
    #[serde(default)]
    pub comments: BTreeMap<String, String>,
}

impl Tracker {
    /// A graph holding only its root commit
    pub fn new(root_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        let root_id = root_id.into();
        let mut timestamps = BTreeMap::new();
        timestamps.insert(root_id.clone(), timestamp.into());
        Self {
            parent_to_children: BTreeMap::new(),
            child_to_parent: BTreeMap::new(),
            bottom: root_id.clone(),
            top: root_id.clone(),
            current: root_id,
            timestamps,
            comments: BTreeMap::new(),
        }
    }

    pub fn contains(&self, commit_id: &str) -> bool {
        self.timestamps.contains_key(commit_id)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn parent(&self, commit_id: &str) -> Option<&str> {
        self.child_to_parent.get(commit_id).map(String::as_str)
    }

    pub fn children(&self, commit_id: &str) -> &[String] {
        self.parent_to_children
            .get(commit_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The child redo follows: the one appended last
    pub fn latest_child(&self, commit_id: &str) -> Option<&str> {
        self.children(commit_id).last().map(String::as_str)
    }

    pub fn timestamp(&self, commit_id: &str) -> Option<&str> {
        self.timestamps.get(commit_id).map(String::as_str)
    }

    pub fn comment(&self, commit_id: &str) -> Option<&str> {
        self.comments.get(commit_id).map(String::as_str)
    }

    /// Ancestors of a commit, nearest first, ending at the root
    pub fn ancestors(&self, commit_id: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut cursor = commit_id;
        while let Some(parent) = self.parent(cursor) {
            if chain.len() >= self.len() {
                break;
            }
            chain.push(parent);
            cursor = parent;
        }
        chain
    }

    /// Descendants along latest children, nearest first, up to `limit` commits
    pub fn redo_path(&self, commit_id: &str, limit: usize) -> Vec<&str> {
        let mut path = Vec::new();
        let mut cursor = commit_id;
        while path.len() < limit {
            match self.latest_child(cursor) {
                Some(child) => {
                    path.push(child);
                    cursor = child;
                }
                None => break,
            }
        }
        path
    }

    /// Record `child` under `parent` and move `current` and `top` to it
    ///
    /// Returns true when `parent` already had children, i.e. a new branch
    /// was started.
    pub fn add_child(&mut self, parent: &str, child: &str, timestamp: impl Into<String>) -> bool {
        let siblings = self.parent_to_children.entry(parent.to_string()).or_default();
        let branched = !siblings.is_empty();
        siblings.push(child.to_string());
        self.child_to_parent
            .insert(child.to_string(), parent.to_string());
        self.timestamps.insert(child.to_string(), timestamp.into());
        self.current = child.to_string();
        self.top = child.to_string();
        branched
    }

    /// Pre-order walk from the root, children in append order, with depth
    pub fn pre_order(&self) -> Vec<(&str, usize)> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack = vec![(self.bottom.as_str(), 0usize)];
        let mut seen = BTreeSet::new();
        while let Some((id, depth)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push((id, depth));
            for child in self.children(id).iter().rev() {
                stack.push((child.as_str(), depth + 1));
            }
        }
        order
    }

    /// Check pointers and adjacency maps agree with each other
    ///
    /// Returns a human-readable reason for the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        for (label, id) in [
            ("BOTTOM", &self.bottom),
            ("TOP", &self.top),
            ("current_parent", &self.current),
        ] {
            if !self.contains(id) {
                return Err(format!("{label} points at unknown commit {id:?}"));
            }
        }
        if self.child_to_parent.contains_key(&self.bottom) {
            return Err(format!("root commit {} has a parent", self.bottom));
        }

        for id in self.timestamps.keys() {
            if *id != self.bottom && !self.child_to_parent.contains_key(id) {
                return Err(format!("commit {id} has no parent"));
            }
        }
        for (child, parent) in &self.child_to_parent {
            if !self.contains(child) || !self.contains(parent) {
                return Err(format!("edge {parent} -> {child} names an unknown commit"));
            }
            if !self.children(parent).contains(child) {
                return Err(format!("{child} is missing from the children of {parent}"));
            }
        }
        for (parent, children) in &self.parent_to_children {
            for child in children {
                if self.parent(child) != Some(parent.as_str()) {
                    return Err(format!("{child} is listed under {parent} but has another parent"));
                }
            }
        }
        for id in self.comments.keys() {
            if !self.contains(id) {
                return Err(format!("comment attached to unknown commit {id}"));
            }
        }

        // Every commit must be reachable from the root; a cycle would hide some.
        let reachable = self.pre_order().len();
        if reachable != self.len() {
            return Err(format!(
                "{} of {} commits are unreachable from the root",
                self.len() - reachable,
                self.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> Tracker {
        let mut tracker = Tracker::new("root", "t0");
        tracker.add_child("root", "a", "t1");
        tracker.add_child("a", "b", "t2");
        tracker
    }

    #[test]
    fn test_new_tracker_points_at_root() {
        let tracker = Tracker::new("root", "t0");
        assert_eq!(tracker.bottom, "root");
        assert_eq!(tracker.top, "root");
        assert_eq!(tracker.current, "root");
        assert_eq!(tracker.len(), 1);
        assert!(tracker.validate().is_ok());
    }

    #[test]
    fn test_add_child_reports_branching() {
        let mut tracker = linear();
        tracker.current = "a".to_string();

        let branched = tracker.add_child("a", "c", "t3");

        assert!(branched);
        assert_eq!(tracker.children("a"), ["b".to_string(), "c".to_string()]);
        assert_eq!(tracker.latest_child("a"), Some("c"));
        assert_eq!(tracker.current, "c");
        assert_eq!(tracker.top, "c");
        assert!(tracker.validate().is_ok());
    }

    #[test]
    fn test_ancestors_and_redo_path() {
        let tracker = linear();
        assert_eq!(tracker.ancestors("b"), vec!["a", "root"]);
        assert!(tracker.ancestors("root").is_empty());
        assert_eq!(tracker.redo_path("root", 5), vec!["a", "b"]);
        assert_eq!(tracker.redo_path("root", 1), vec!["a"]);
    }

    #[test]
    fn test_pre_order_visits_children_in_append_order() {
        let mut tracker = linear();
        tracker.add_child("root", "x", "t3");
        let order: Vec<_> = tracker.pre_order();
        assert_eq!(order, vec![("root", 0), ("a", 1), ("b", 2), ("x", 1)]);
    }

    #[test]
    fn test_json_shape_uses_persisted_names() {
        let tracker = linear();
        let json = serde_json::to_value(&tracker).unwrap();
        assert_eq!(json["BOTTOM"], "root");
        assert_eq!(json["TOP"], "b");
        assert_eq!(json["current_parent"], "b");
        assert_eq!(json["parent_to_childs"]["root"][0], "a");
        assert_eq!(json["child_to_parent"]["b"], "a");
        assert_eq!(json["timestamp"]["a"], "t1");
        assert!(json["comments"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_validate_detects_dangling_pointer() {
        let mut tracker = linear();
        tracker.current = "ghost".to_string();
        assert!(tracker.validate().unwrap_err().contains("current_parent"));
    }

    #[test]
    fn test_validate_detects_disagreeing_maps() {
        let mut tracker = linear();
        tracker.parent_to_children.insert("root".to_string(), vec![]);
        assert!(tracker.validate().is_err());
    }

    #[test]
    fn test_validate_detects_cycle() {
        let mut tracker = linear();
        // a <-> b, detached from the root
        tracker.child_to_parent.insert("a".to_string(), "b".to_string());
        tracker.parent_to_children.insert("root".to_string(), vec![]);
        tracker
            .parent_to_children
            .insert("b".to_string(), vec!["a".to_string()]);
        assert!(tracker.validate().is_err());
    }
}
