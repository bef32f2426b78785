use glam::{DAffine3, DQuat, DVec3};

use crate::fbx::{
	CacheChannel, Element, GeometryCacheDataOpts, Mesh, Scene, SkinDeformer, SkinningMethod, sample_geometry_cache_vec3,
};

/// Rigid transform as a unit dual quaternion.
#[derive(Debug, Clone, Copy)]
struct DualQuat {
	real: DQuat,
	dual: DQuat,
}

impl DualQuat {
	const ZERO: Self = Self {
		real: DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0),
		dual: DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0),
	};

	fn from_affine(affine: &DAffine3) -> Self {
		let (_, rotation, translation) = affine.to_scale_rotation_translation();
		let t = DQuat::from_xyzw(translation.x, translation.y, translation.z, 0.0);
		Self {
			real: rotation,
			dual: t * rotation * 0.5,
		}
	}

	/// Accumulate `other * weight`, flipping it into the hemisphere of `pivot`.
	fn add_weighted(self, other: Self, weight: f64, pivot: DQuat) -> Self {
		let weight = if pivot.dot(other.real) < 0.0 { -weight } else { weight };
		Self {
			real: self.real + other.real * weight,
			dual: self.dual + other.dual * weight,
		}
	}

	fn normalized(self) -> Self {
		let len = self.real.length();
		if len <= f64::EPSILON {
			return Self {
				real: DQuat::IDENTITY,
				dual: DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0),
			};
		}
		Self {
			real: self.real / len,
			dual: self.dual / len,
		}
	}

	fn transform_point(self, point: DVec3) -> DVec3 {
		let rotated = self.real * point;
		let t = self.dual * self.real.conjugate() * 2.0;
		rotated + DVec3::new(t.x, t.y, t.z)
	}
}

/// Cache channel driving `deformer`: the one named after it, else the only one.
fn cache_channel<'a>(scene: &'a Scene, deformer: usize) -> Option<&'a CacheChannel> {
	let element = scene.element(deformer)?;
	let data = element.as_cache_deformer()?;
	let file = scene.element(data.file?)?.as_cache_file()?;
	let cache = file.external_cache.as_deref()?;
	cache
		.channels
		.iter()
		.find(|channel| channel.name == data.channel)
		.or_else(|| (cache.channels.len() == 1).then(|| &cache.channels[0]))
}

/// Geometry-space positions after caches and blend shapes.
fn morphed_positions(scene: &Scene, mesh: &Mesh, cache_time: Option<f64>) -> Vec<DVec3> {
	let mut positions = mesh.vertices.clone();

	if let Some(time) = cache_time {
		for &deformer in &mesh.cache_deformers {
			let Some(channel) = cache_channel(scene, deformer) else {
				continue;
			};
			if let Err(err) = sample_geometry_cache_vec3(channel, time, &mut positions, &GeometryCacheDataOpts::default())
			{
				log::warn!("cache channel {} failed to sample: {err}", channel.name);
			}
		}
	}

	for &deformer in &mesh.blend_deformers {
		let Some(blend) = scene.element(deformer).and_then(Element::as_blend_deformer) else {
			continue;
		};
		for &channel in &blend.channels {
			let Some(channel) = scene.element(channel).and_then(Element::as_blend_channel) else {
				continue;
			};
			for key in &channel.keyframes {
				if key.effective_weight == 0.0 {
					continue;
				}
				let Some(shape) = scene.element(key.shape).and_then(Element::as_blend_shape) else {
					continue;
				};
				for (&vertex, offset) in shape.offset_vertices.iter().zip(&shape.position_offsets) {
					if let Some(position) = positions.get_mut(vertex as usize) {
						*position += *offset * key.effective_weight;
					}
				}
			}
		}
	}
	positions
}

fn skin_positions(scene: &Scene, skin: &SkinDeformer, positions: &mut [DVec3]) {
	let matrices: Vec<DAffine3> = skin
		.clusters
		.iter()
		.map(|&cluster| {
			scene
				.element(cluster)
				.and_then(Element::as_skin_cluster)
				.map_or(DAffine3::IDENTITY, |cluster| cluster.geometry_to_world)
		})
		.collect();
	let use_dq = matches!(
		skin.skinning_method,
		SkinningMethod::DualQuaternion | SkinningMethod::BlendedDqLinear
	);
	let dual_quats: Vec<DualQuat> = if use_dq {
		matrices.iter().map(DualQuat::from_affine).collect()
	} else {
		Vec::new()
	};

	for (index, vertex) in skin.vertices.iter().enumerate() {
		let Some(position) = positions.get_mut(index) else {
			break;
		};
		let begin = vertex.weight_begin as usize;
		let end = begin + vertex.num_weights as usize;
		let Some(weights) = skin.weights.get(begin..end) else {
			continue;
		};
		if weights.is_empty() {
			continue;
		}
		let point = *position;

		if skin.skinning_method == SkinningMethod::Rigid {
			if let Some(matrix) = matrices.get(weights[0].cluster_index as usize) {
				*position = matrix.transform_point3(point);
			}
			continue;
		}

		let mut total = 0.0;
		let mut linear = DVec3::ZERO;
		let mut dq = DualQuat::ZERO;
		let pivot = dual_quats
			.get(weights[0].cluster_index as usize)
			.map_or(DQuat::IDENTITY, |dq| dq.real);
		for weight in weights {
			let cluster = weight.cluster_index as usize;
			let Some(matrix) = matrices.get(cluster) else {
				continue;
			};
			total += weight.weight;
			linear += matrix.transform_point3(point) * weight.weight;
			if let Some(&cluster_dq) = dual_quats.get(cluster) {
				dq = dq.add_weighted(cluster_dq, weight.weight, pivot);
			}
		}
		if total <= f64::EPSILON {
			continue;
		}
		let linear = linear / total;
		*position = if use_dq {
			let blended = dq.normalized().transform_point(point);
			linear.lerp(blended, vertex.dq_weight)
		} else {
			linear
		};
	}
}

/// World-space positions of `mesh` after caches, blend shapes and skinning.
///
/// Vertices without skin weights follow the mesh node's geometry transform.
pub(crate) fn deformed_positions(scene: &Scene, mesh: usize, cache_time: Option<f64>) -> Vec<DVec3> {
	let Some(element) = scene.element(mesh) else {
		return Vec::new();
	};
	let Some(data) = element.as_mesh() else {
		return Vec::new();
	};
	let mut positions = morphed_positions(scene, data, cache_time);

	let geometry_to_world = element
		.instances
		.first()
		.and_then(|&node| scene.node(node))
		.map_or(DAffine3::IDENTITY, |node| node.geometry_to_world);
	let skin = data
		.skin_deformers
		.first()
		.and_then(|&id| scene.element(id))
		.and_then(Element::as_skin_deformer);
	match skin {
		Some(skin) => {
			let num_skinned = skin.vertices.len().min(positions.len());
			for position in &mut positions[num_skinned..] {
				*position = geometry_to_world.transform_point3(*position);
			}
			skin_positions(scene, skin, &mut positions[..num_skinned]);
			for (index, vertex) in skin.vertices.iter().enumerate().take(num_skinned) {
				if vertex.num_weights == 0 {
					positions[index] = geometry_to_world.transform_point3(positions[index]);
				}
			}
		}
		None => {
			for position in &mut positions {
				*position = geometry_to_world.transform_point3(*position);
			}
		}
	}
	positions
}
