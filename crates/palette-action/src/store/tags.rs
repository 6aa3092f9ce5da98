//! Per-user tags added by commands. Additive only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User id to the tags added to that user, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserTagIndex {
    tags: BTreeMap<u32, Vec<String>>,
}

impl UserTagIndex {
    pub fn add(&mut self, user_id: u32, tag: &str) {
        self.tags.entry(user_id).or_default().push(tag.to_string());
    }

    pub fn tags_for(&self, user_id: u32) -> &[String] {
        self.tags.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// How many times `tag` was added to `user_id`.
    pub fn count(&self, user_id: u32, tag: &str) -> usize {
        self.tags_for(user_id).iter().filter(|t| *t == tag).count()
    }

    pub fn tagged_users(&self) -> impl Iterator<Item = u32> + '_ {
        self.tags.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_order() {
        let mut index = UserTagIndex::default();
        index.add(4, "VIP");
        index.add(4, "Priority");
        assert_eq!(index.tags_for(4), ["VIP".to_string(), "Priority".to_string()]);
        assert!(index.tags_for(5).is_empty());
    }

    #[test]
    fn test_count() {
        let mut index = UserTagIndex::default();
        index.add(1, "VIP");
        index.add(1, "VIP");
        index.add(2, "VIP");
        assert_eq!(index.count(1, "VIP"), 2);
        assert_eq!(index.count(2, "VIP"), 1);
        assert_eq!(index.tagged_users().collect::<Vec<_>>(), vec![1, 2]);
    }
}
