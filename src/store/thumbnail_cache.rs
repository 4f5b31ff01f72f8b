use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;

/// the thumbnails of a single folder, keyed by asset id
pub type FolderThumbnails = HashMap<u32, Vec<u8>>;

/// keeps the thumbnails of the most recently viewed folders in memory.
/// Once more folders than the capacity are loaded, the least recently viewed folder is dropped
pub struct ThumbnailCache {
    folders: LruCache<u32, FolderThumbnails>,
}

impl ThumbnailCache {
    /// a capacity of 0 is treated as 1, the folder being viewed always stays cached
    pub fn new(folders_to_keep: usize) -> Self {
        let capacity = NonZeroUsize::new(folders_to_keep).unwrap_or(NonZeroUsize::MIN);
        Self {
            folders: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, folder_id: u32) -> Option<&FolderThumbnails> {
        self.folders.get(&folder_id)
    }

    pub fn put(&mut self, folder_id: u32, thumbnails: FolderThumbnails) {
        if let Some((evicted, _)) = self.folders.push(folder_id, thumbnails) {
            if evicted != folder_id {
                log::debug!("Dropped cached thumbnails for folder {evicted}");
            }
        }
    }

    /// forgets the thumbnails of the folder, so they're read from the catalog next time
    pub fn invalidate(&mut self, folder_id: u32) {
        self.folders.pop(&folder_id);
    }

    pub fn clear(&mut self) {
        self.folders.clear();
    }

    pub fn contains(&self, folder_id: u32) -> bool {
        self.folders.contains(&folder_id)
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }
}

#[cfg(test)]
mod thumbnail_cache_tests {
    use std::collections::HashMap;

    use super::ThumbnailCache;

    #[test]
    fn evicts_least_recently_viewed_folder() {
        let mut cache = ThumbnailCache::new(2);
        cache.put(1, HashMap::from([(10, vec![1])]));
        cache.put(2, HashMap::from([(20, vec![2])]));
        // viewing folder 1 makes folder 2 the oldest
        assert!(cache.get(1).is_some());
        cache.put(3, HashMap::from([(30, vec![3])]));
        assert!(cache.contains(1));
        assert!(!cache.contains(2));
        assert!(cache.contains(3));
        assert_eq!(2, cache.len());
    }

    #[test]
    fn zero_capacity_still_keeps_one_folder() {
        let mut cache = ThumbnailCache::new(0);
        cache.put(1, HashMap::new());
        assert!(cache.contains(1));
        cache.put(2, HashMap::new());
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
    }

    #[test]
    fn invalidate_removes_folder() {
        let mut cache = ThumbnailCache::new(3);
        cache.put(1, HashMap::new());
        cache.invalidate(1);
        assert!(!cache.contains(1));
    }
}
