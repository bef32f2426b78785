use crate::fbx::{MAP_MAX_SCAN, Map, hash_u64};

fn filled(n: u64, initial_slots: usize) -> Map<u64, u64> {
	let mut map = Map::with_capacity(initial_slots);
	for key in 0..n {
		*map.insert(hash_u64(key), key, key * 10) += 1;
	}
	map
}

#[test]
fn finds_every_key_across_growth_boundaries() {
	for n in [63_u64, 64, 65] {
		let map = filled(n, 64);
		assert_eq!(map.len(), n as usize);
		for key in 0..n {
			assert_eq!(map.find(hash_u64(key), &key), Some(&(key * 10 + 1)), "key {key} of {n}");
		}
		assert_eq!(map.find(hash_u64(n), &n), None);
		assert_eq!(map.find(hash_u64(1_000_000), &1_000_000), None);
		assert!(map.capacity() * 7 >= map.len() * 10);
	}
}

#[test]
fn colliding_hashes_spill_into_the_tree() {
	let mut map: Map<u32, u32> = Map::with_capacity(64);
	for key in 0..500 {
		map.insert(7, key, key + 1);
	}
	assert_eq!(map.num_overflow(), 500 - (MAP_MAX_SCAN as usize + 1));
	for key in 0..500 {
		assert_eq!(map.find(7, &key), Some(&(key + 1)));
	}
	assert_eq!(map.find(7, &500), None);
	assert_eq!(map.find(8, &3), None);
	// A balanced tree over ~470 keys stays shallow.
	assert!(map.overflow_depth() <= 20, "depth {}", map.overflow_depth());
}

#[test]
fn robin_hood_displacement_keeps_lookups_exact() {
	let mut map: Map<u32, u32> = Map::with_capacity(16);
	// Two clusters competing for neighboring home slots.
	for key in 0..40 {
		let hash = if key % 2 == 0 { 3 } else { 4 };
		map.insert(hash | (key << 8), key, key);
	}
	for key in 0..40 {
		let hash = if key % 2 == 0 { 3 } else { 4 };
		assert_eq!(map.find(hash | (key << 8), &key), Some(&key));
	}
}

#[test]
fn string_keys_look_up_by_str() {
	let mut map: Map<String, usize> = Map::new();
	map.insert(11, "Model".to_owned(), 1);
	map.insert(11, "Geometry".to_owned(), 2);
	assert_eq!(map.find(11, "Geometry"), Some(&2));
	assert_eq!(map.find(12, "Geometry"), None);
	*map.get_or_insert_with(11, "Model".to_owned(), || 9) += 5;
	assert_eq!(map.find(11, "Model"), Some(&6));
	assert_eq!(map.iter().count(), 2);
}
