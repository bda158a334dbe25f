use bplustree_index::BPlusTreeMap;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

const SEEDS: [u64; 4] = [1, 7, 42, 2024];

fn assert_same_contents(tree: &BPlusTreeMap<u32, u64>, model: &BTreeMap<u32, u64>, universe: u32) {
    assert_eq!(tree.len(), model.len());
    for key in 0..universe {
        assert_eq!(tree.search(&key), model.get(&key), "key {}", key);
    }
}

#[test]
fn test_shuffled_inserts_then_deletes_match_btreemap() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut keys: Vec<u32> = (0..1000).collect();
        keys.shuffle(&mut rng);

        let mut tree = BPlusTreeMap::new();
        let mut model = BTreeMap::new();
        for &key in &keys {
            assert_eq!(tree.insert(key, u64::from(key) * 2), model.insert(key, u64::from(key) * 2));
        }
        tree.validate().unwrap();
        assert_same_contents(&tree, &model, 1000);

        keys.shuffle(&mut rng);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(tree.remove(key), model.remove(key));
            if i % 50 == 0 {
                tree.validate().unwrap();
            }
        }
        assert!(tree.is_empty());
        assert!(tree.is_leaf_root());
    }
}

#[test]
fn test_random_operation_mix_matches_btreemap() {
    const UNIVERSE: u32 = 300;

    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tree = BPlusTreeMap::new();
        let mut model = BTreeMap::new();

        for step in 0..5000 {
            let key = rng.gen_range(0..UNIVERSE);
            match rng.gen_range(0..10) {
                0..=4 => {
                    let value = rng.gen::<u64>();
                    assert_eq!(tree.insert(key, value), model.insert(key, value));
                }
                5..=8 => {
                    assert_eq!(tree.delete(&key), model.remove(&key).is_some());
                }
                _ => {
                    assert_eq!(tree.search(&key), model.get(&key));
                }
            }
            if step % 250 == 0 {
                tree.check_invariants_detailed().unwrap();
            }
        }

        tree.check_invariants_detailed().unwrap();
        assert_same_contents(&tree, &model, UNIVERSE);
    }
}

#[test]
fn test_leaf_chain_matches_btreemap_order() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut tree = BPlusTreeMap::new();
    let mut model = BTreeMap::new();
    for _ in 0..800 {
        let key = rng.gen_range(0..10_000u32);
        tree.insert(key, u64::from(key));
        model.insert(key, u64::from(key));
    }

    let leaf_total: usize = tree.leaf_sizes().iter().sum();
    assert_eq!(leaf_total, model.len());
    for key in model.keys() {
        assert!(tree.contains_key(key));
    }
    assert!(tree.height() >= 4);
}
