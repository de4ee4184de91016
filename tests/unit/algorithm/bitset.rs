//! Tests for `ModuleSet` membership, intersection and palette-order iteration

#[cfg(test)]
mod tests {
    use voxcollapse::ModuleId;
    use voxcollapse::algorithm::bitset::ModuleSet;

    fn id(index: usize) -> ModuleId {
        ModuleId::new(index)
    }

    // Verifies a new set is empty and a full set holds the whole palette
    // Verified by swapping the fill values of new and all
    #[test]
    fn test_new_and_all() {
        let empty = ModuleSet::new(6);
        assert!(empty.is_empty());
        assert_eq!(empty.count(), 0);

        let full = ModuleSet::all(6);
        assert_eq!(full.count(), 6);
        assert!((0..6).all(|index| full.contains(id(index))));
    }

    // Tests insertion ignores ids outside the palette
    // Verified by removing the length guard in insert
    #[test]
    fn test_insert_outside_palette_is_ignored() {
        let mut set = ModuleSet::new(3);
        set.insert(id(1));
        set.insert(id(7));
        assert_eq!(set.count(), 1);
        assert!(set.contains(id(1)));
        assert!(!set.contains(id(7)));
    }

    // Tests remove reports whether the module was present
    // Verified by returning true unconditionally from remove
    #[test]
    fn test_remove_reports_presence() {
        let mut set = ModuleSet::all(4);
        assert!(set.remove(id(2)));
        assert!(!set.remove(id(2)));
        assert_eq!(set.to_vec(), vec![id(0), id(1), id(3)]);
    }

    // Tests intersection keeps common members and counts the removed ones
    // Verified by changing intersection operation to union operation
    #[test]
    fn test_intersect_with_counts_removed() {
        let mut set = ModuleSet::all(5);
        let mut keep = ModuleSet::new(5);
        keep.insert(id(1));
        keep.insert(id(4));

        let removed = set.intersect_with(&keep);

        assert_eq!(removed, 3);
        assert_eq!(set, keep);
        assert!(set.is_subset(&ModuleSet::all(5)));
        assert!(!ModuleSet::all(5).is_subset(&set));
    }

    // Tests nth and iteration follow palette order regardless of insertion order
    // Verified by collecting members into a HashSet before iterating
    #[test]
    fn test_iteration_follows_palette_order() {
        let mut set = ModuleSet::new(8);
        for index in [6, 2, 5] {
            set.insert(id(index));
        }
        assert_eq!(set.to_vec(), vec![id(2), id(5), id(6)]);
        assert_eq!(set.nth(1), Some(id(5)));
        assert_eq!(set.nth(3), None);
    }

    // Tests clearing and display formatting
    // Verified by leaving the first bit set in clear
    #[test]
    fn test_clear_and_display() {
        let mut set = ModuleSet::new(4);
        set.insert(id(0));
        set.insert(id(3));
        assert_eq!(set.to_string(), "ModuleSet(2 modules: [0, 3])");

        set.clear();
        assert!(set.is_empty());
    }
}
