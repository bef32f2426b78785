use std::sync::Arc;

use crate::fbx::evaluate::{deformed_positions, update_blend_keyframes};
use crate::fbx::finalize::materials::resolve_path;
use crate::fbx::{
	BlendKeyframe, Element, ElementType, FbxError, GeometryCacheOpts, LoadOpts, Result, ResultExt, Scene, SkinVertex,
	SkinWeight, SkinningMethod, WarningKind, load_geometry_cache,
};

/// Deformer lists of meshes, skin weights, blend keyframes and cache files.
pub(super) fn link_deformers(scene: &mut Scene, opts: &LoadOpts) {
	link_mesh_deformers(scene);
	link_skins(scene, opts);
	link_blends(scene);

	let caches: Vec<(usize, Option<usize>)> = scene
		.ids_of(ElementType::CacheDeformer)
		.iter()
		.map(|&id| (id, scene.sources_of(id, ElementType::CacheFile).next()))
		.collect();
	for (id, file) in caches {
		if let Some(deformer) = scene.elements[id].as_cache_deformer_mut() {
			deformer.file = file;
		}
	}
	let relative_root = Arc::clone(&scene.metadata.relative_root);
	let files = scene.ids_of(ElementType::CacheFile).to_vec();
	for id in files {
		if let Some(file) = scene.elements[id].as_cache_file_mut()
			&& file.absolute_filename.is_empty()
		{
			file.absolute_filename = resolve_path(&relative_root, &file.filename, &file.relative_filename);
		}
	}
}

fn link_mesh_deformers(scene: &mut Scene) {
	let mut links = Vec::new();
	for &mesh in scene.ids_of(ElementType::Mesh) {
		let mut all = Vec::new();
		for conn in scene.connections_dst_of(mesh, Some("")) {
			if !conn.src_prop.is_empty() || all.contains(&conn.src) {
				continue;
			}
			let is_deformer = scene.element(conn.src).is_some_and(|element| {
				matches!(
					element.element_type,
					ElementType::SkinDeformer | ElementType::BlendDeformer | ElementType::CacheDeformer
				)
			});
			if is_deformer {
				all.push(conn.src);
			}
		}
		links.push((mesh, all));
	}
	for (mesh, all) in links {
		let types: Vec<ElementType> = all.iter().map(|&id| scene.elements[id].element_type).collect();
		let Some(data) = scene.elements[mesh].as_mesh_mut() else {
			continue;
		};
		let of_type = |wanted: ElementType| {
			all.iter()
				.zip(&types)
				.filter(|(_, element_type)| **element_type == wanted)
				.map(|(&id, _)| id)
				.collect::<Vec<_>>()
		};
		data.skin_deformers = of_type(ElementType::SkinDeformer);
		data.blend_deformers = of_type(ElementType::BlendDeformer);
		data.cache_deformers = of_type(ElementType::CacheDeformer);
		data.all_deformers = all;
	}
}

/// Per-vertex weight lists by counting sort over every cluster.
fn link_skins(scene: &mut Scene, opts: &LoadOpts) {
	let cluster_ids = scene.ids_of(ElementType::SkinCluster).to_vec();
	for cluster in cluster_ids {
		let bone = scene.sources_of(cluster, ElementType::Node).next();
		if let Some(data) = scene.elements[cluster].as_skin_cluster_mut() {
			data.bone_node = bone;
		}
	}

	let skin_ids = scene.ids_of(ElementType::SkinDeformer).to_vec();
	for skin in skin_ids {
		let clusters: Vec<usize> = scene
			.sources_of(skin, ElementType::SkinCluster)
			.filter(|&cluster| {
				let has_bone = scene
					.element(cluster)
					.and_then(Element::as_skin_cluster)
					.is_some_and(|cluster| cluster.bone_node.is_some());
				if !has_bone && !opts.connect_broken_elements {
					log::trace!("skipping skin cluster {cluster} without a bone");
				}
				has_bone || opts.connect_broken_elements
			})
			.collect();
		let num_vertices = scene
			.destinations_of(skin, ElementType::Mesh)
			.next()
			.and_then(|mesh| scene.mesh(mesh))
			.map(|mesh| mesh.num_vertices);

		let (vertices, weights) = if opts.skip_skin_vertices {
			(Vec::new(), Vec::new())
		} else {
			bucket_weights(scene, &clusters, num_vertices)
		};
		let Some(data) = scene.elements[skin].as_skin_deformer_mut() else {
			continue;
		};
		data.clusters = clusters;
		data.vertices = vertices;
		data.weights = weights;
		data.max_weights_per_vertex = data
			.vertices
			.iter()
			.map(|vertex| vertex.num_weights as usize)
			.max()
			.unwrap_or(0);

		let method = data.skinning_method;
		match method {
			SkinningMethod::DualQuaternion => {
				for vertex in &mut data.vertices {
					vertex.dq_weight = 1.0;
				}
			}
			SkinningMethod::BlendedDqLinear => {
				for (&vertex, &weight) in data.dq_vertices.iter().zip(&data.dq_weights) {
					if let Some(vertex) = data.vertices.get_mut(vertex as usize) {
						vertex.dq_weight = weight;
					}
				}
			}
			SkinningMethod::Linear | SkinningMethod::Rigid => {}
		}
	}
}

fn bucket_weights(scene: &Scene, clusters: &[usize], num_vertices: Option<usize>) -> (Vec<SkinVertex>, Vec<SkinWeight>) {
	let clusters: Vec<_> = clusters
		.iter()
		.filter_map(|&cluster| scene.element(cluster)?.as_skin_cluster())
		.collect();
	let num_vertices = num_vertices.unwrap_or_else(|| {
		clusters
			.iter()
			.flat_map(|cluster| cluster.vertices.iter())
			.map(|&vertex| vertex as usize + 1)
			.max()
			.unwrap_or(0)
	});

	let mut vertices = vec![SkinVertex::default(); num_vertices];
	for cluster in &clusters {
		for &vertex in &cluster.vertices {
			if let Some(entry) = vertices.get_mut(vertex as usize) {
				entry.num_weights += 1;
			}
		}
	}
	let mut total = 0_u32;
	for vertex in &mut vertices {
		vertex.weight_begin = total;
		total += vertex.num_weights;
		vertex.num_weights = 0;
	}

	let mut weights = vec![SkinWeight::default(); total as usize];
	for (cluster_index, cluster) in clusters.iter().enumerate() {
		for (&vertex, &weight) in cluster.vertices.iter().zip(&cluster.weights) {
			let Some(entry) = vertices.get_mut(vertex as usize) else {
				continue;
			};
			weights[(entry.weight_begin + entry.num_weights) as usize] = SkinWeight {
				cluster_index: cluster_index as u32,
				weight,
			};
			entry.num_weights += 1;
		}
	}
	for vertex in &vertices {
		let begin = vertex.weight_begin as usize;
		weights[begin..begin + vertex.num_weights as usize].sort_by(|a, b| b.weight.total_cmp(&a.weight));
	}
	(vertices, weights)
}

/// Channels of blend deformers and in-between keyframes of channels.
fn link_blends(scene: &mut Scene) {
	let blend_ids = scene.ids_of(ElementType::BlendDeformer).to_vec();
	for blend in blend_ids {
		let channels: Vec<usize> = scene.sources_of(blend, ElementType::BlendChannel).collect();
		if let Some(data) = scene.elements[blend].as_blend_deformer_mut() {
			data.channels = channels;
		}
	}

	let channel_ids = scene.ids_of(ElementType::BlendChannel).to_vec();
	for channel in channel_ids {
		let shapes: Vec<usize> = scene.sources_of(channel, ElementType::BlendShape).collect();
		let Some(data) = scene.elements[channel].as_blend_channel_mut() else {
			continue;
		};
		let count = shapes.len();
		let mut keyframes: Vec<BlendKeyframe> = shapes
			.into_iter()
			.enumerate()
			.map(|(index, shape)| BlendKeyframe {
				shape,
				target_weight: data
					.full_weights
					.get(index)
					.map_or((index + 1) as f64 / count as f64, |weight| weight / 100.0),
				effective_weight: 0.0,
			})
			.collect();
		keyframes.sort_by(|a, b| a.target_weight.total_cmp(&b.target_weight));
		data.target_shape = keyframes.last().map(|keyframe| keyframe.shape);
		data.keyframes = keyframes;
		update_blend_keyframes(data);
	}
}

/// Bind-relative and current matrices of every skin cluster.
pub(crate) fn update_cluster_matrices(scene: &mut Scene) {
	let mut updates = Vec::new();
	for &skin in scene.ids_of(ElementType::SkinDeformer) {
		let mesh_node = scene
			.destinations_of(skin, ElementType::Mesh)
			.next()
			.and_then(|mesh| scene.element(mesh)?.instances.first().copied())
			.and_then(|node| scene.node(node));
		let node_to_geometry = mesh_node.map_or(glam::DAffine3::IDENTITY, |node| node.geometry_to_node.inverse());
		let Some(data) = scene.element(skin).and_then(Element::as_skin_deformer) else {
			continue;
		};
		for &cluster in &data.clusters {
			let Some(cluster_data) = scene.element(cluster).and_then(Element::as_skin_cluster) else {
				continue;
			};
			let bone_world = cluster_data
				.bone_node
				.and_then(|bone| scene.node(bone))
				.map_or(cluster_data.bind_to_world, |bone| bone.node_to_world);
			updates.push((
				cluster,
				cluster_data.geometry_to_bone * node_to_geometry,
				bone_world * cluster_data.geometry_to_bone,
			));
		}
	}
	for (cluster, mesh_node_to_bone, geometry_to_world) in updates {
		if let Some(data) = scene.elements[cluster].as_skin_cluster_mut() {
			data.mesh_node_to_bone = mesh_node_to_bone;
			data.geometry_to_world = geometry_to_world;
		}
	}
}

/// Read geometry cache files when external files are enabled.
pub(super) fn load_cache_files(scene: &mut Scene, opts: &LoadOpts) -> Result<()> {
	if !opts.load_external_files {
		return Ok(());
	}
	let cache_opts = GeometryCacheOpts {
		frames_per_second: scene.settings.frames_per_second,
		..GeometryCacheOpts::default()
	};
	let files = scene.ids_of(ElementType::CacheFile).to_vec();
	for id in files {
		let Some(file) = scene.elements[id].as_cache_file() else {
			continue;
		};
		let path = if file.absolute_filename.is_empty() {
			Arc::clone(&file.filename)
		} else {
			Arc::clone(&file.absolute_filename)
		};
		match load_geometry_cache(&*path, &cache_opts) {
			Ok(cache) => {
				log::debug!("loaded geometry cache {path} with {} channels", cache.channels.len());
				if let Some(file) = scene.elements[id].as_cache_file_mut() {
					file.external_cache = Some(Arc::new(cache));
				}
			}
			Err(err) if opts.strict => {
				return Err(err).with_context(|| format!("geometry cache {path}"));
			}
			Err(err @ FbxError::FeatureDisabled { .. }) => return Err(err),
			Err(err) => {
				scene
					.metadata
					.warn(WarningKind::MissingExternalFile, || format!("geometry cache {path}: {err}"));
			}
		}
	}
	Ok(())
}

/// Store deformed world-space positions on every deformed mesh.
pub(super) fn evaluate_skinning(scene: &mut Scene, opts: &LoadOpts) {
	let cache_time = opts.evaluate_caches.then_some(scene.anim.time_begin);
	let mut results = Vec::new();
	for (element, mesh) in scene.meshes() {
		let deformed = !mesh.skin_deformers.is_empty()
			|| !mesh.blend_deformers.is_empty()
			|| (cache_time.is_some() && !mesh.cache_deformers.is_empty());
		if deformed {
			results.push((element.element_id, deformed_positions(scene, element.element_id, cache_time)));
		}
	}
	log::debug!("evaluated skinning of {} meshes", results.len());
	for (mesh, positions) in results {
		if let Some(mesh) = scene.elements[mesh].as_mesh_mut() {
			mesh.skinned_positions = positions;
		}
	}
}
