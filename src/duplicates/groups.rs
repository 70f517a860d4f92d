//! Size-based grouping of one directory's files.
//!
//! # Overview
//!
//! Size grouping is the cheap first stage of duplicate detection: files with
//! different sizes cannot have identical content, so only files that share a
//! size with at least one sibling need to be read and digested.
//!
//! Within a group, names are ordered by ascending length. Ties keep the
//! lexicographic order of the input map, so the same listing always yields
//! the same ordering. The digest stage walks groups in this order, which is
//! what makes shorter names the usual canonical pick.
//!
//! # Example
//!
//! ```
//! use dupemark::duplicates::group_by_size;
//! use std::collections::BTreeMap;
//!
//! let mut files = BTreeMap::new();
//! files.insert("track01.mp3".to_string(), 1024);
//! files.insert("t1.mp3".to_string(), 1024);
//! files.insert("cover.jpg".to_string(), 2048);
//!
//! let (groups, stats) = group_by_size(&files);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].names, vec!["t1.mp3", "track01.mp3"]);
//! assert_eq!(stats.eliminated_unique, 1);
//! ```

use std::collections::BTreeMap;

/// Files of one directory sharing an exact size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// File names, shortest first
    pub names: Vec<String>,
}

impl SizeGroup {
    /// Create a size group with initial names, applying the length ordering.
    #[must_use]
    pub fn with_names(size: u64, mut names: Vec<String>) -> Self {
        // Stable: equal lengths keep their incoming order.
        names.sort_by_key(String::len);
        Self { size, names }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.names.len() > 1
    }
}

/// Statistics from the size grouping stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of zero-length files seen
    pub empty_files: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }

    /// Add another directory's statistics to this one.
    pub fn merge(&mut self, other: &GroupingStats) {
        self.total_files += other.total_files;
        self.total_size += other.total_size;
        self.unique_sizes += other.unique_sizes;
        self.potential_duplicates += other.potential_duplicates;
        self.eliminated_unique += other.eliminated_unique;
        self.empty_files += other.empty_files;
        self.duplicate_groups += other.duplicate_groups;
    }
}

/// Group one directory's files by size.
///
/// Takes the directory's name-to-size map and returns the size groups that
/// have at least two members, ordered by ascending size, with names ordered
/// by ascending length inside each group. Singleton sizes are dropped.
/// No I/O is performed.
#[must_use]
pub fn group_by_size(files: &BTreeMap<String, u64>) -> (Vec<SizeGroup>, GroupingStats) {
    let mut by_size: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    let mut stats = GroupingStats::default();

    for (name, &size) in files {
        stats.total_files += 1;
        stats.total_size += size;
        if size == 0 {
            stats.empty_files += 1;
        }
        by_size.entry(size).or_default().push(name.clone());
    }

    stats.unique_sizes = by_size.len();

    let mut groups = Vec::new();
    for (size, names) in by_size {
        if names.len() == 1 {
            stats.eliminated_unique += 1;
            log::trace!("Eliminated unique size {}: {}", size, names[0]);
            continue;
        }
        stats.potential_duplicates += names.len();
        stats.duplicate_groups += 1;
        log::trace!("Size group {} bytes: {} candidates", size, names.len());
        groups.push(SizeGroup::with_names(size, names));
    }

    (groups, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries
            .iter()
            .map(|(name, size)| ((*name).to_string(), *size))
            .collect()
    }

    #[test]
    fn test_size_group_with_names_sorts_by_length() {
        let group = SizeGroup::with_names(
            10,
            vec!["ccc".to_string(), "a".to_string(), "bb".to_string()],
        );
        assert_eq!(group.names, vec!["a", "bb", "ccc"]);
        assert!(group.has_duplicates());
    }

    #[test]
    fn test_size_group_single_file_is_not_a_candidate() {
        let group = SizeGroup::with_names(1024, vec!["a".to_string()]);
        assert!(!group.has_duplicates());
    }

    #[test]
    fn test_group_by_size_empty_input() {
        let (groups, stats) = group_by_size(&BTreeMap::new());

        assert!(groups.is_empty());
        assert_eq!(stats, GroupingStats::default());
    }

    #[test]
    fn test_group_by_size_all_unique() {
        let files = listing(&[("a.txt", 100), ("b.txt", 200), ("c.txt", 300)]);
        let (groups, stats) = group_by_size(&files);

        assert!(groups.is_empty());
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.unique_sizes, 3);
        assert_eq!(stats.eliminated_unique, 3);
        assert_eq!(stats.potential_duplicates, 0);
    }

    #[test]
    fn test_group_by_size_with_duplicates() {
        let files = listing(&[("a.mp3", 100), ("bb.mp3", 100), ("c.mp3", 50)]);
        let (groups, stats) = group_by_size(&files);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size, 100);
        assert_eq!(groups[0].names, vec!["a.mp3", "bb.mp3"]);

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.unique_sizes, 2);
        assert_eq!(stats.eliminated_unique, 1);
        assert_eq!(stats.potential_duplicates, 2);
        assert_eq!(stats.duplicate_groups, 1);
        assert_eq!(stats.total_size, 250);
    }

    #[test]
    fn test_group_by_size_orders_groups_by_size() {
        let files = listing(&[
            ("big1", 10_000),
            ("big2", 10_000),
            ("small1", 100),
            ("small2", 100),
        ]);
        let (groups, _) = group_by_size(&files);

        let sizes: Vec<u64> = groups.iter().map(|g| g.size).collect();
        assert_eq!(sizes, vec![100, 10_000]);
    }

    #[test]
    fn test_group_by_size_length_ties_are_lexicographic() {
        let files = listing(&[("zz.mp3", 5), ("aa.mp3", 5), ("mm.mp3", 5), ("b.mp3", 5)]);
        let (groups, _) = group_by_size(&files);

        assert_eq!(groups[0].names, vec!["b.mp3", "aa.mp3", "mm.mp3", "zz.mp3"]);
    }

    #[test]
    fn test_group_by_size_is_deterministic() {
        let files = listing(&[
            ("one.flac", 7),
            ("two.flac", 7),
            ("six.flac", 7),
            ("seven.flac", 7),
            ("x", 7),
        ]);
        let (first, _) = group_by_size(&files);
        for _ in 0..10 {
            let (again, _) = group_by_size(&files.clone());
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_group_by_size_keeps_empty_files() {
        let files = listing(&[("empty1", 0), ("empty2", 0), ("normal", 100)]);
        let (groups, stats) = group_by_size(&files);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size, 0);
        assert_eq!(stats.empty_files, 2);
    }

    #[test]
    fn test_every_name_in_at_most_one_group() {
        let files = listing(&[("a", 1), ("b", 1), ("c", 2), ("d", 2), ("e", 2), ("f", 3)]);
        let (groups, stats) = group_by_size(&files);

        let mut seen: Vec<&String> = groups.iter().flat_map(|g| g.names.iter()).collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
        assert_eq!(total, stats.potential_duplicates);
    }

    #[test]
    fn test_grouping_stats_merge_and_rate() {
        let mut a = GroupingStats {
            total_files: 4,
            eliminated_unique: 2,
            ..Default::default()
        };
        let b = GroupingStats {
            total_files: 6,
            eliminated_unique: 3,
            ..Default::default()
        };
        a.merge(&b);

        assert_eq!(a.total_files, 10);
        assert!((a.elimination_rate() - 50.0).abs() < 0.1);
        assert_eq!(GroupingStats::default().elimination_rate(), 0.0);
    }
}
