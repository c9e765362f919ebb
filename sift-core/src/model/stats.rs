use serde::{Deserialize, Serialize};

use super::entry::{Category, Entry};

/// Running totals for a scan.
///
/// Every update is a plain counter increment, so the final value depends only
/// on the set of entries seen and never on the order they arrived in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub total_files: u64,
    pub total_folders: u64,
    /// Sum of file sizes in bytes; directories contribute nothing
    pub total_size: u64,
    pub document_count: u64,
    pub image_count: u64,
    pub video_count: u64,
    pub audio_count: u64,
    pub other_count: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one entry into the totals
    pub fn record(&mut self, entry: &Entry) {
        if entry.is_directory {
            self.total_folders += 1;
            return;
        }

        self.total_files += 1;
        self.total_size += entry.size;
        match entry.category {
            Category::Document => self.document_count += 1,
            Category::Image => self.image_count += 1,
            Category::Video => self.video_count += 1,
            Category::Audio => self.audio_count += 1,
            // A non-directory never classifies as Folder; count it as Other
            // rather than lose it from the file total.
            Category::Other | Category::Folder => self.other_count += 1,
        }
    }

    /// Value-style form of [`ScanStats::record`]
    pub fn accumulate(mut self, entry: &Entry) -> Self {
        self.record(entry);
        self
    }

    /// Combine totals gathered independently, e.g. from two subtrees
    pub fn merge(&mut self, other: &ScanStats) {
        self.total_files += other.total_files;
        self.total_folders += other.total_folders;
        self.total_size += other.total_size;
        self.document_count += other.document_count;
        self.image_count += other.image_count;
        self.video_count += other.video_count;
        self.audio_count += other.audio_count;
        self.other_count += other.other_count;
    }

    /// Count for a single category; `Folder` reports the folder total
    pub fn count_for(&self, category: Category) -> u64 {
        match category {
            Category::Document => self.document_count,
            Category::Image => self.image_count,
            Category::Video => self.video_count,
            Category::Audio => self.audio_count,
            Category::Folder => self.total_folders,
            Category::Other => self.other_count,
        }
    }

    pub fn total_entries(&self) -> u64 {
        self.total_files + self.total_folders
    }

    /// `total_files` equals the sum of the per-category file counts
    pub fn is_consistent(&self) -> bool {
        self.total_files
            == self.document_count
                + self.image_count
                + self.video_count
                + self.audio_count
                + self.other_count
    }
}

impl<'a> Extend<&'a Entry> for ScanStats {
    fn extend<I: IntoIterator<Item = &'a Entry>>(&mut self, iter: I) {
        for entry in iter {
            self.record(entry);
        }
    }
}

impl<'a> FromIterator<&'a Entry> for ScanStats {
    fn from_iter<I: IntoIterator<Item = &'a Entry>>(iter: I) -> Self {
        let mut stats = ScanStats::new();
        stats.extend(iter);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn file(name: &str, size: u64) -> Entry {
        Entry::new(
            PathBuf::from("/test").join(name),
            false,
            size,
            DateTime::<Utc>::UNIX_EPOCH,
            1,
        )
    }

    fn folder(name: &str) -> Entry {
        Entry::new(
            PathBuf::from("/test").join(name),
            true,
            0,
            DateTime::<Utc>::UNIX_EPOCH,
            1,
        )
    }

    #[test]
    fn test_record_file() {
        let mut stats = ScanStats::new();
        stats.record(&file("file.pdf", 1024));

        assert_eq!(stats.total_files, 1);
        assert_eq!(stats.total_folders, 0);
        assert_eq!(stats.total_size, 1024);
        assert_eq!(stats.document_count, 1);
    }

    #[test]
    fn test_record_folder() {
        let stats = ScanStats::new().accumulate(&folder("folder"));

        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_folders, 1);
        assert_eq!(stats.total_size, 0);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_collect_from_entries() {
        let entries = vec![
            file("a.mp3", 10),
            file("b.mp4", 20),
            file("c.png", 30),
            file("d.bin", 40),
            folder("e"),
        ];
        let stats: ScanStats = entries.iter().collect();

        assert_eq!(stats.total_files, 4);
        assert_eq!(stats.total_folders, 1);
        assert_eq!(stats.total_size, 100);
        assert_eq!(stats.count_for(Category::Audio), 1);
        assert_eq!(stats.count_for(Category::Other), 1);
        assert_eq!(stats.count_for(Category::Folder), 1);
        assert!(stats.is_consistent());
    }

    fn arb_entry() -> impl Strategy<Value = Entry> {
        let names = prop::sample::select(vec![
            "a.txt", "b.JPG", "c.mov", "d.wav", "e.xyz", "f", "g.md",
        ]);
        (names, any::<bool>(), 0u64..1_000_000).prop_map(|(name, is_dir, size)| {
            if is_dir {
                folder(name)
            } else {
                file(name, size)
            }
        })
    }

    proptest! {
        #[test]
        fn order_does_not_change_totals(
            entries in prop::collection::vec(arb_entry(), 0..64),
            seed in any::<u64>(),
        ) {
            let forward: ScanStats = entries.iter().collect();

            let mut shuffled = entries.clone();
            // Deterministic rotation + reversal stands in for an arbitrary traversal order
            if !shuffled.is_empty() {
                let k = (seed as usize) % shuffled.len();
                shuffled.rotate_left(k);
            }
            shuffled.reverse();
            let reordered: ScanStats = shuffled.iter().collect();

            prop_assert_eq!(forward, reordered);
            prop_assert!(forward.is_consistent());
            prop_assert_eq!(
                forward.total_size,
                entries.iter().filter(|e| !e.is_directory).map(|e| e.size).sum::<u64>()
            );
        }

        #[test]
        fn merging_split_halves_matches_single_pass(
            entries in prop::collection::vec(arb_entry(), 0..64),
            split in any::<prop::sample::Index>(),
        ) {
            let at = if entries.is_empty() { 0 } else { split.index(entries.len() + 1) };
            let (left, right) = entries.split_at(at);

            let mut merged: ScanStats = right.iter().collect();
            merged.merge(&left.iter().collect());

            prop_assert_eq!(merged, entries.iter().collect::<ScanStats>());
        }
    }
}
