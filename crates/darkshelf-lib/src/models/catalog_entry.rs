use serde::{Deserialize, Serialize};

/// One comic of the mirrored catalog, as written into the snapshot file.
///
/// Field names on the wire follow the upstream detail document so the static
/// front end can read the snapshot without a mapping layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub title: String,
    #[serde(rename = "islong")]
    pub is_long: i64,
    pub authors: Vec<String>,
    #[serde(rename = "types")]
    pub categories: Vec<String>,
    pub status: Vec<String>,
    pub cover: String,
    pub last_update_chapter_name: String,
    pub last_update_chapter_id: u64,
    #[serde(rename = "last_updatetime")]
    pub last_update_time: i64,
}

/// Orders entries by `last_update_time`, newest first.
///
/// The sort is stable, entries sharing a timestamp keep their relative order.
pub fn sort_by_recency(entries: &mut [CatalogEntry]) {
    entries.sort_by_key(|entry| std::cmp::Reverse(entry.last_update_time));
}
