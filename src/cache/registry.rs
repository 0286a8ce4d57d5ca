//! Bidirectional tag index.
//!
//! Tracks which cache entries carry which tags so an invalidation can find the
//! affected entries without scanning the whole store.

use std::collections::{HashMap, HashSet};

use super::keys::QueryKey;
use super::tags::{Tag, TagType};

/// Tag → keys, type → keys and key → tags mappings.
///
/// Owned by the store and only touched under the store lock.
#[derive(Debug, Default)]
pub struct TagRegistry {
    /// Keys carrying each exact tag.
    tag_to_keys: HashMap<Tag, HashSet<QueryKey>>,
    /// Keys carrying any tag of each type, with or without an id.
    type_to_keys: HashMap<TagType, HashSet<QueryKey>>,
    /// Tags currently recorded for each key.
    key_to_tags: HashMap<QueryKey, HashSet<Tag>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the tags of a cache entry, replacing any earlier set.
    pub fn register(&mut self, key: &QueryKey, tags: HashSet<Tag>) {
        self.unregister(key);
        if tags.is_empty() {
            return;
        }
        for tag in &tags {
            self.tag_to_keys
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
            self.type_to_keys
                .entry(tag.tag_type())
                .or_default()
                .insert(key.clone());
        }
        self.key_to_tags.insert(key.clone(), tags);
    }

    /// Forget a key, e.g. when its entry is evicted.
    pub fn unregister(&mut self, key: &QueryKey) {
        let Some(tags) = self.key_to_tags.remove(key) else {
            return;
        };
        for tag in tags {
            let tag_type = tag.tag_type();
            remove_from(&mut self.tag_to_keys, &tag, key);
            remove_from(&mut self.type_to_keys, &tag_type, key);
        }
    }

    /// Keys reached by invalidating any of `tags`.
    pub fn keys_matching<'a, I>(&self, tags: I) -> HashSet<QueryKey>
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        let mut keys = HashSet::new();
        for tag in tags {
            let matched = match tag {
                Tag::ByType(tag_type) => self.type_to_keys.get(tag_type),
                Tag::ByTypeAndId(..) => self.tag_to_keys.get(tag),
            };
            if let Some(matched) = matched {
                keys.extend(matched.iter().cloned());
            }
        }
        keys
    }

    pub fn tags_for_key(&self, key: &QueryKey) -> HashSet<Tag> {
        self.key_to_tags.get(key).cloned().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.tag_to_keys.clear();
        self.type_to_keys.clear();
        self.key_to_tags.clear();
    }

    pub fn tag_count(&self) -> usize {
        self.tag_to_keys.len()
    }

    pub fn key_count(&self) -> usize {
        self.key_to_tags.len()
    }
}

fn remove_from<K>(map: &mut HashMap<K, HashSet<QueryKey>>, bucket: &K, key: &QueryKey)
where
    K: std::hash::Hash + Eq,
{
    if let Some(keys) = map.get_mut(bucket) {
        keys.remove(key);
        if keys.is_empty() {
            map.remove(bucket);
        }
    }
}
