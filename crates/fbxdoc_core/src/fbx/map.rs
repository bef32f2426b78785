//! Open-addressing hash map with Robin-Hood displacement.
//!
//! Each slot is one `u64`: the low half holds `entry index + 1`, the high half
//! holds the upper 24 hash bits and an 8-bit scan distance. Keys whose scan
//! would pass [`MAP_MAX_SCAN`] go to an AA tree ordered by `(hash, key)`, so
//! adversarial collisions degrade to `O(log n)` instead of `O(n)`.

use std::borrow::Borrow;
use std::cmp::Ordering;

/// Longest probe sequence kept in the open-addressed table.
pub const MAP_MAX_SCAN: u32 = 32;

const MIN_SLOTS: usize = 16;
const NIL: u32 = u32::MAX;

#[derive(Debug, Clone)]
struct Entry<K, V> {
	hash: u32,
	key: K,
	value: V,
}

#[derive(Debug, Clone, Copy)]
struct AaNode {
	entry: u32,
	level: u32,
	left: u32,
	right: u32,
}

/// AA tree over entry indices, ordered by a caller comparator.
#[derive(Debug, Clone, Default)]
struct AaTree {
	nodes: Vec<AaNode>,
	root: u32,
}

impl AaTree {
	fn new() -> Self {
		Self {
			nodes: Vec::new(),
			root: NIL,
		}
	}

	fn clear(&mut self) {
		self.nodes.clear();
		self.root = NIL;
	}

	fn len(&self) -> usize {
		self.nodes.len()
	}

	fn insert(&mut self, entry: u32, cmp: &impl Fn(u32, u32) -> Ordering) {
		let root = self.root;
		self.root = self.insert_at(root, entry, cmp);
	}

	fn insert_at(&mut self, node: u32, entry: u32, cmp: &impl Fn(u32, u32) -> Ordering) -> u32 {
		if node == NIL {
			self.nodes.push(AaNode {
				entry,
				level: 1,
				left: NIL,
				right: NIL,
			});
			return (self.nodes.len() - 1) as u32;
		}
		let at = node as usize;
		if cmp(entry, self.nodes[at].entry) == Ordering::Less {
			let left = self.nodes[at].left;
			self.nodes[at].left = self.insert_at(left, entry, cmp);
		} else {
			let right = self.nodes[at].right;
			self.nodes[at].right = self.insert_at(right, entry, cmp);
		}
		let node = self.skew(node);
		self.split(node)
	}

	fn skew(&mut self, node: u32) -> u32 {
		let left = self.nodes[node as usize].left;
		if left == NIL || self.nodes[left as usize].level != self.nodes[node as usize].level {
			return node;
		}
		self.nodes[node as usize].left = self.nodes[left as usize].right;
		self.nodes[left as usize].right = node;
		left
	}

	fn split(&mut self, node: u32) -> u32 {
		let right = self.nodes[node as usize].right;
		if right == NIL {
			return node;
		}
		let right_right = self.nodes[right as usize].right;
		if right_right == NIL || self.nodes[right_right as usize].level != self.nodes[node as usize].level {
			return node;
		}
		self.nodes[node as usize].right = self.nodes[right as usize].left;
		self.nodes[right as usize].left = node;
		self.nodes[right as usize].level += 1;
		right
	}

	fn find(&self, probe: impl Fn(u32) -> Ordering) -> Option<u32> {
		let mut node = self.root;
		while node != NIL {
			let item = self.nodes[node as usize];
			match probe(item.entry) {
				Ordering::Less => node = item.left,
				Ordering::Greater => node = item.right,
				Ordering::Equal => return Some(item.entry),
			}
		}
		None
	}

	fn depth(&self) -> u32 {
		fn walk(tree: &AaTree, node: u32) -> u32 {
			if node == NIL {
				return 0;
			}
			let item = tree.nodes[node as usize];
			1 + walk(tree, item.left).max(walk(tree, item.right))
		}
		walk(self, self.root)
	}
}

/// Hash map keyed by caller-computed 32-bit hashes.
#[derive(Debug, Clone)]
pub struct Map<K, V> {
	entries: Vec<Entry<K, V>>,
	slots: Vec<u64>,
	table_len: usize,
	tree: AaTree,
}

impl<K: Ord, V> Default for Map<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

fn pack(index: usize, hash: u32, dist: u32) -> u64 {
	let high = (hash & !0xff) | dist;
	(u64::from(high) << 32) | (index as u64 + 1)
}

fn slot_index(slot: u64) -> usize {
	((slot & 0xffff_ffff) - 1) as usize
}

fn slot_dist(slot: u64) -> u32 {
	((slot >> 32) & 0xff) as u32
}

fn slot_hash_matches(slot: u64, hash: u32) -> bool {
	((slot >> 32) as u32 & !0xff) == (hash & !0xff)
}

impl<K: Ord, V> Map<K, V> {
	/// Empty map without slots.
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
			slots: Vec::new(),
			table_len: 0,
			tree: AaTree::new(),
		}
	}

	/// Empty map with at least `slots` slots (rounded to a power of two).
	pub fn with_capacity(slots: usize) -> Self {
		let mut map = Self::new();
		if slots > 0 {
			map.slots = vec![0; slots.next_power_of_two().max(MIN_SLOTS)];
		}
		map
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Number of open-addressing slots.
	pub fn capacity(&self) -> usize {
		self.slots.len()
	}

	/// Entries living in the overflow tree.
	pub fn num_overflow(&self) -> usize {
		self.tree.len()
	}

	/// Height of the overflow tree.
	pub fn overflow_depth(&self) -> u32 {
		self.tree.depth()
	}

	/// Look up `key` with precomputed `hash`.
	pub fn find<Q>(&self, hash: u32, key: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: Ord + ?Sized,
	{
		self.find_index(hash, key).map(|index| &self.entries[index].value)
	}

	/// Mutable lookup.
	pub fn find_mut<Q>(&mut self, hash: u32, key: &Q) -> Option<&mut V>
	where
		K: Borrow<Q>,
		Q: Ord + ?Sized,
	{
		let index = self.find_index(hash, key)?;
		Some(&mut self.entries[index].value)
	}

	fn find_index<Q>(&self, hash: u32, key: &Q) -> Option<usize>
	where
		K: Borrow<Q>,
		Q: Ord + ?Sized,
	{
		if !self.slots.is_empty() {
			let mask = self.slots.len() - 1;
			let mut pos = hash as usize & mask;
			let mut dist = 0;
			while dist <= MAP_MAX_SCAN {
				let slot = self.slots[pos];
				if slot == 0 || slot_dist(slot) < dist {
					break;
				}
				if slot_hash_matches(slot, hash) {
					let index = slot_index(slot);
					let entry = &self.entries[index];
					if entry.hash == hash && key == entry.key.borrow() {
						return Some(index);
					}
				}
				pos = (pos + 1) & mask;
				dist += 1;
			}
		}
		if self.tree.len() == 0 {
			return None;
		}
		let entries = &self.entries;
		self.tree
			.find(|index| {
				let entry = &entries[index as usize];
				hash.cmp(&entry.hash).then_with(|| key.cmp(entry.key.borrow()))
			})
			.map(|index| index as usize)
	}

	/// Insert a key that is not yet present and return its value slot.
	pub fn insert(&mut self, hash: u32, key: K, value: V) -> &mut V {
		debug_assert!(self.find_index(hash, &key).is_none(), "duplicate map insert");
		let index = self.entries.len();
		self.entries.push(Entry { hash, key, value });
		if (self.table_len + 1) * 10 > self.slots.len() * 7 {
			self.grow();
		} else {
			self.place(index);
		}
		&mut self.entries[index].value
	}

	/// Return the existing value for `key` or insert one built by `make`.
	pub fn get_or_insert_with(&mut self, hash: u32, key: K, make: impl FnOnce() -> V) -> &mut V {
		match self.find_index(hash, &key) {
			Some(index) => &mut self.entries[index].value,
			None => self.insert(hash, key, make()),
		}
	}

	/// Iterate `(key, value)` in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
		self.entries.iter().map(|entry| (&entry.key, &entry.value))
	}

	fn grow(&mut self) {
		let mut size = self.slots.len().max(MIN_SLOTS);
		while (self.table_len + 1) * 10 > size * 7 {
			size *= 2;
		}
		self.slots.clear();
		self.slots.resize(size, 0);
		self.table_len = 0;
		self.tree.clear();
		for index in 0..self.entries.len() {
			self.place(index);
		}
	}

	fn place(&mut self, index: usize) {
		let mask = self.slots.len() - 1;
		let mut carry = index;
		let mut carry_hash = self.entries[index].hash;
		let mut pos = carry_hash as usize & mask;
		let mut dist = 0;
		loop {
			if dist > MAP_MAX_SCAN {
				let entries = &self.entries;
				self.tree.insert(carry as u32, &|a, b| {
					let (a, b) = (&entries[a as usize], &entries[b as usize]);
					a.hash.cmp(&b.hash).then_with(|| a.key.cmp(&b.key))
				});
				return;
			}
			let slot = self.slots[pos];
			if slot == 0 {
				self.slots[pos] = pack(carry, carry_hash, dist);
				self.table_len += 1;
				return;
			}
			let resident_dist = slot_dist(slot);
			if resident_dist < dist {
				self.slots[pos] = pack(carry, carry_hash, dist);
				carry = slot_index(slot);
				carry_hash = self.entries[carry].hash;
				dist = resident_dist;
			}
			pos = (pos + 1) & mask;
			dist += 1;
		}
	}
}

/// 32-bit mix of a 64-bit key.
pub fn hash_u64(value: u64) -> u32 {
	let mut x = value;
	x ^= x >> 33;
	x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
	x ^= x >> 33;
	x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
	x ^= x >> 33;
	x as u32
}

#[cfg(test)]
mod tests;
