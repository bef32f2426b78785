use glam::{DVec2, DVec3};

use crate::fbx::{Face, Mesh};

/// Heap-ordered levels of the reflex vertex tree.
const KD_FAST_DEPTH: u32 = 4;
const KD_FAST_NODES: usize = (1 << KD_FAST_DEPTH) - 1;
const NONE: u32 = u32::MAX;

/// Triangulate `face` into `indices` as mesh index triples.
///
/// Returns the number of triangles written, `0` when the face has fewer than
/// three corners or `indices` cannot hold `(n - 2) * 3` entries. Quads are
/// split along the diagonal that keeps both halves facing the same way;
/// larger polygons are ear clipped.
pub fn triangulate_face(indices: &mut [u32], mesh: &Mesh, face: Face) -> u32 {
	let count = face.num_indices as usize;
	if count < 3 || indices.len() < (count - 2) * 3 {
		return 0;
	}
	let begin = face.index_begin;
	match count {
		3 => {
			indices[..3].copy_from_slice(&[begin, begin + 1, begin + 2]);
			1
		}
		4 => {
			let p = |i: u32| mesh.position((begin + i) as usize);
			let (p0, p1, p2, p3) = (p(0), p(1), p(2), p(3));
			let split_02 = tri_normal(p0, p1, p2).dot(tri_normal(p2, p3, p0));
			let split_13 = tri_normal(p1, p2, p3).dot(tri_normal(p3, p0, p1));
			let use_13 = if (split_02 - split_13).abs() > 1e-6 {
				split_13 > split_02
			} else {
				p1.distance_squared(p3) < p0.distance_squared(p2)
			};
			let order: [u32; 6] = if use_13 { [1, 2, 3, 3, 0, 1] } else { [0, 1, 2, 2, 3, 0] };
			for (dst, local) in indices.iter_mut().zip(order) {
				*dst = begin + local;
			}
			2
		}
		_ if cfg!(feature = "triangulation") => clip_ears(indices, mesh, face),
		_ => {
			log::warn!("triangulation feature disabled, skipping {count}-gon");
			0
		}
	}
}

fn tri_normal(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
	(b - a).cross(c - a).normalize_or_zero()
}

/// Project the polygon onto the plane of its Newell normal.
fn project(mesh: &Mesh, face: Face) -> Vec<DVec2> {
	let begin = face.index_begin as usize;
	let count = face.num_indices as usize;
	let points: Vec<DVec3> = (0..count).map(|i| mesh.position(begin + i)).collect();
	let mut normal = DVec3::ZERO;
	for (i, a) in points.iter().enumerate() {
		let b = points[(i + 1) % count];
		normal += a.cross(b);
	}
	let normal = normal.try_normalize().unwrap_or(DVec3::Z);
	let axis_u = normal.any_orthonormal_vector();
	let axis_v = normal.cross(axis_u);
	points
		.iter()
		.map(|point| DVec2::new(point.dot(axis_u), point.dot(axis_v)))
		.collect()
}

fn cross2(o: DVec2, a: DVec2, b: DVec2) -> f64 {
	(a - o).perp_dot(b - o)
}

/// Kd-tree over reflex vertices.
///
/// The top levels live in heap order so the common shallow queries never
/// follow links; deeper levels are linked nodes below each fast leaf.
struct ReflexTree<'a> {
	points: &'a [DVec2],
	fast: [u32; KD_FAST_NODES],
	/// Slow subtree root below each bottom fast slot, two per slot.
	fast_tails: Vec<u32>,
	slow: Vec<SlowNode>,
}

struct SlowNode {
	vertex: u32,
	left: u32,
	right: u32,
}

impl<'a> ReflexTree<'a> {
	fn build(points: &'a [DVec2], reflex: &mut [u32]) -> Self {
		let mut tree = Self {
			points,
			fast: [NONE; KD_FAST_NODES],
			fast_tails: vec![NONE; 1 << KD_FAST_DEPTH],
			slow: Vec::new(),
		};
		tree.build_fast(reflex, 0, 0);
		tree
	}

	fn split<'v>(&self, vertices: &'v mut [u32], depth: u32) -> (&'v mut [u32], u32, &'v mut [u32]) {
		let axis = (depth % 2) as usize;
		let points = self.points;
		vertices.sort_unstable_by(|&a, &b| points[a as usize][axis].total_cmp(&points[b as usize][axis]));
		let mid = vertices.len() / 2;
		let (left, rest) = vertices.split_at_mut(mid);
		let (pivot, right) = rest.split_at_mut(1);
		(left, pivot[0], right)
	}

	fn build_fast(&mut self, vertices: &mut [u32], slot: usize, depth: u32) {
		if vertices.is_empty() {
			return;
		}
		if depth >= KD_FAST_DEPTH {
			let tail = slot - KD_FAST_NODES;
			self.fast_tails[tail] = self.build_slow(vertices, depth);
			return;
		}
		let (left, pivot, right) = self.split(vertices, depth);
		self.fast[slot] = pivot;
		self.build_fast(left, slot * 2 + 1, depth + 1);
		self.build_fast(right, slot * 2 + 2, depth + 1);
	}

	fn build_slow(&mut self, vertices: &mut [u32], depth: u32) -> u32 {
		if vertices.is_empty() {
			return NONE;
		}
		let (left, pivot, right) = self.split(vertices, depth);
		let node = self.slow.len() as u32;
		self.slow.push(SlowNode {
			vertex: pivot,
			left: NONE,
			right: NONE,
		});
		let left = self.build_slow(left, depth + 1);
		let right = self.build_slow(right, depth + 1);
		self.slow[node as usize].left = left;
		self.slow[node as usize].right = right;
		node
	}

	/// True when any live reflex vertex other than the corners lies inside `tri`.
	fn blocks(&self, tri: [u32; 3], removed: &[bool]) -> bool {
		let [a, b, c] = tri.map(|vertex| self.points[vertex as usize]);
		let min = a.min(b).min(c);
		let max = a.max(b).max(c);
		let query = Query {
			tri,
			corners: [a, b, c],
			min,
			max,
			removed,
		};
		self.visit_fast(&query, 0, 0)
	}

	fn visit_fast(&self, query: &Query<'_>, slot: usize, depth: u32) -> bool {
		if depth >= KD_FAST_DEPTH {
			let tail = self.fast_tails.get(slot - KD_FAST_NODES).copied().unwrap_or(NONE);
			return self.visit_slow(query, tail, depth);
		}
		let vertex = self.fast[slot];
		if vertex == NONE {
			return false;
		}
		let (go_left, go_right) = self.check(query, vertex, depth);
		if query.hit(vertex, self.points) {
			return true;
		}
		(go_left && self.visit_fast(query, slot * 2 + 1, depth + 1))
			|| (go_right && self.visit_fast(query, slot * 2 + 2, depth + 1))
	}

	fn visit_slow(&self, query: &Query<'_>, node: u32, depth: u32) -> bool {
		let Some(node) = self.slow.get(node as usize) else {
			return false;
		};
		if query.hit(node.vertex, self.points) {
			return true;
		}
		let (go_left, go_right) = self.check(query, node.vertex, depth);
		(go_left && self.visit_slow(query, node.left, depth + 1))
			|| (go_right && self.visit_slow(query, node.right, depth + 1))
	}

	fn check(&self, query: &Query<'_>, vertex: u32, depth: u32) -> (bool, bool) {
		let axis = (depth % 2) as usize;
		let split = self.points[vertex as usize][axis];
		(query.min[axis] <= split, query.max[axis] >= split)
	}
}

struct Query<'a> {
	tri: [u32; 3],
	corners: [DVec2; 3],
	min: DVec2,
	max: DVec2,
	removed: &'a [bool],
}

impl Query<'_> {
	fn hit(&self, vertex: u32, points: &[DVec2]) -> bool {
		if self.tri.contains(&vertex) || self.removed[vertex as usize] {
			return false;
		}
		let point = points[vertex as usize];
		let [a, b, c] = self.corners;
		if point == a || point == b || point == c {
			return false;
		}
		cross2(a, b, point) > 0.0 && cross2(b, c, point) > 0.0 && cross2(c, a, point) > 0.0
	}
}

fn clip_ears(indices: &mut [u32], mesh: &Mesh, face: Face) -> u32 {
	let points = project(mesh, face);
	let count = points.len();
	let mut next: Vec<u32> = (0..count as u32).map(|i| (i + 1) % count as u32).collect();
	let mut prev: Vec<u32> = (0..count as u32).map(|i| (i + count as u32 - 1) % count as u32).collect();
	let mut removed = vec![false; count];

	let is_convex = |p: u32, c: u32, n: u32| cross2(points[p as usize], points[c as usize], points[n as usize]) > 0.0;
	let mut reflex: Vec<u32> = (0..count as u32)
		.filter(|&i| !is_convex(prev[i as usize], i, next[i as usize]))
		.collect();
	let tree = ReflexTree::build(&points, &mut reflex);

	let begin = face.index_begin;
	let mut written = 0_usize;
	let mut emit = |tri: [u32; 3], written: &mut usize| {
		for local in tri {
			indices[*written] = begin + local;
			*written += 1;
		}
	};

	let mut remaining = count;
	let mut current = 0_u32;
	let mut misses = 0_usize;
	while remaining > 3 {
		let (p, n) = (prev[current as usize], next[current as usize]);
		let tri = [p, current, n];
		if is_convex(p, current, n) && !tree.blocks(tri, &removed) {
			emit(tri, &mut written);
			removed[current as usize] = true;
			next[p as usize] = n;
			prev[n as usize] = p;
			remaining -= 1;
			misses = 0;
			current = p;
			continue;
		}
		misses += 1;
		current = n;
		if misses > remaining {
			// No ear found: clip what is left in reading order.
			log::trace!("ear clipping stalled with {remaining} vertices, falling back");
			let first = (0..count as u32).find(|&i| !removed[i as usize]).unwrap_or(0);
			let mut a = next[first as usize];
			while remaining > 3 {
				let b = next[a as usize];
				emit([first, a, b], &mut written);
				removed[a as usize] = true;
				next[first as usize] = b;
				prev[b as usize] = first;
				a = b;
				remaining -= 1;
			}
			current = first;
			break;
		}
	}
	let (p, n) = (prev[current as usize], next[current as usize]);
	emit([p, current, n], &mut written);
	(written / 3) as u32
}
