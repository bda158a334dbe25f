use bplustree_index::{BPlusTreeMap, NodeKind};

#[test]
fn test_mixed_sequence_search_and_delete() {
    let mut tree = BPlusTreeMap::new();
    for key in [10, 20, 5, 6, 12, 30, 7, 17] {
        tree.insert(key, key.to_string());
    }

    assert_eq!(tree.search(&6), Some(&"6".to_string()));
    assert!(tree.delete(&20));
    assert_eq!(tree.search(&20), None);
    assert!(!tree.delete(&20));

    for key in [5, 6, 7, 10, 12, 17, 30] {
        assert_eq!(tree.search(&key), Some(&key.to_string()));
    }
    assert_eq!(tree.len(), 7);
    assert!(tree.check_invariants());
}

#[test]
fn test_first_split_creates_inner_root() {
    let mut tree = BPlusTreeMap::new();
    for key in 1..=5 {
        tree.insert(key, ());
    }

    assert_eq!(tree.root_kind(), NodeKind::Inner);
    assert_eq!(tree.root_keys(), vec![&3]);
    assert_eq!(tree.leaf_count(), 2);
    assert_eq!(tree.leaf_sizes(), vec![2, 3]);
    assert_eq!(tree.height(), 2);
    assert!(tree.check_invariants());
}

#[test]
fn test_fusion_collapses_root_back_to_leaf() {
    let mut tree = BPlusTreeMap::new();
    for key in 1..=5 {
        tree.insert(key, key);
    }
    // Bring both leaves to minimum fill: [1, 2] [3, 4]
    assert!(tree.delete(&5));
    assert_eq!(tree.leaf_sizes(), vec![2, 2]);

    // Neither neighbour can lend, so the leaves fuse and the root goes away
    assert!(tree.delete(&4));

    assert!(tree.is_leaf_root());
    assert_eq!(tree.root_keys(), vec![&1, &2, &3]);
    assert_eq!(tree.count_nodes_in_tree(), (1, 0));
    assert!(tree.check_invariants());
}

#[test]
fn test_round_trip_leaves_empty_leaf_root() {
    let keys: Vec<i32> = (0..200).map(|i| (i * 71) % 200).collect();

    let mut tree = BPlusTreeMap::new();
    for &key in &keys {
        tree.insert(key, key * 3);
    }
    assert_eq!(tree.len(), 200);

    for &key in keys.iter().rev() {
        assert!(tree.delete(&key));
    }
    assert!(tree.is_empty());
    assert!(tree.is_leaf_root());
    assert_eq!(tree.count_nodes_in_tree(), (1, 0));

    for &key in &keys {
        tree.insert(key, key * 3);
    }
    for &key in &keys {
        assert_eq!(tree.search(&key), Some(&(key * 3)));
    }
    assert!(tree.check_invariants());
}

#[test]
fn test_duplicate_insert_replaces_value() {
    let mut tree = BPlusTreeMap::new();
    for key in 0..20 {
        tree.insert(key, "first");
    }
    assert_eq!(tree.insert(11, "second"), Some("first"));
    assert_eq!(tree.len(), 20);
    assert_eq!(tree.search(&11), Some(&"second"));
    assert!(tree.delete(&11));
    assert_eq!(tree.search(&11), None);
}

#[test]
fn test_string_keys() {
    let mut tree = BPlusTreeMap::new();
    let words = ["pear", "apple", "fig", "kiwi", "lime", "date", "plum", "yuzu"];
    for (i, word) in words.iter().enumerate() {
        tree.insert(word.to_string(), i);
    }
    assert_eq!(tree.search(&"kiwi".to_string()), Some(&3));
    assert!(tree.delete(&"apple".to_string()));
    assert!(!tree.contains_key(&"apple".to_string()));
    assert_eq!(tree.len(), words.len() - 1);
    assert!(tree.check_invariants());
}
