//! Table link groups
//!
//! Tables in a group keep their own orders and are only billed together.

use crate::util::natural_cmp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkGroup {
    pub group_id: String,
    pub leader: String,
    /// Every table in the group, leader included, in natural order
    pub members: Vec<String>,
}

impl LinkGroup {
    pub fn new(group_id: impl Into<String>, leader: impl Into<String>, members: &[String]) -> Self {
        let leader = leader.into();
        let mut all: Vec<String> = members.to_vec();
        all.push(leader.clone());
        all.sort_by(|a, b| natural_cmp(a, b));
        all.dedup();
        Self {
            group_id: group_id.into(),
            leader,
            members: all,
        }
    }

    pub fn contains(&self, table: &str) -> bool {
        self.members.iter().any(|m| m == table)
    }

    /// Remove a single table. Returns `false` if it was not a member.
    ///
    /// When the leader leaves, the next member in natural order leads.
    pub fn remove(&mut self, table: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != table);
        if self.members.len() == before {
            return false;
        }
        if self.leader == table
            && let Some(next) = self.members.first()
        {
            self.leader = next.clone();
        }
        true
    }

    /// A group needs at least two tables to mean anything
    pub fn is_dissolved(&self) -> bool {
        self.members.len() < 2
    }
}

/// Create link payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkCreate {
    pub leader: String,
    pub members: Vec<String>,
}

/// Unlink payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkRemove {
    pub table: String,
    #[serde(default)]
    pub unlink_all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_includes_leader_sorted() {
        let group = LinkGroup::new("g1", "10", &["2".to_string(), "4".to_string()]);
        assert_eq!(group.members, vec!["2", "4", "10"]);
        assert_eq!(group.leader, "10");
    }

    #[test]
    fn test_remove_member_keeps_leader() {
        let mut group = LinkGroup::new("g1", "1", &["2".to_string(), "3".to_string()]);
        assert!(group.remove("2"));
        assert_eq!(group.members, vec!["1", "3"]);
        assert_eq!(group.leader, "1");
        assert!(!group.is_dissolved());
        assert!(!group.remove("2"));
    }

    #[test]
    fn test_remove_leader_promotes_next() {
        let mut group = LinkGroup::new("g1", "1", &["5".to_string(), "3".to_string()]);
        assert!(group.remove("1"));
        assert_eq!(group.leader, "3");
    }

    #[test]
    fn test_dissolves_below_two() {
        let mut group = LinkGroup::new("g1", "1", &["2".to_string()]);
        group.remove("2");
        assert!(group.is_dissolved());
    }
}
