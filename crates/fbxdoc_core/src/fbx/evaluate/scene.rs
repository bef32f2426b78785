use std::ops::Deref;
use std::sync::Arc;

use crate::fbx::finalize::{
	read_node_transform, update_camera, update_cluster_matrices, update_light, update_world_transforms,
};
use crate::fbx::{Anim, Element, ElementData, ElementType, FbxError, Result, Scene};

use super::{deformed_positions, evaluate_blend_weight, evaluate_props, update_blend_keyframes};

/// Work done by [`evaluate_scene`] beyond transforms and blend weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluateOpts {
	/// Store deformed positions in `Mesh::skinned_positions`.
	pub evaluate_skinning: bool,
	/// Sample geometry caches while deforming.
	pub evaluate_caches: bool,
}

/// Copy of a scene posed at one point in time.
#[derive(Debug, Clone)]
pub struct EvaluatedScene {
	/// Scene the snapshot was taken from.
	pub parent: Arc<Scene>,
	/// Posed scene.
	pub scene: Scene,
	/// Evaluation time in seconds.
	pub time: f64,
}

impl Deref for EvaluatedScene {
	type Target = Scene;

	fn deref(&self) -> &Scene {
		&self.scene
	}
}

fn check_anim(scene: &Scene, anim: &Anim) -> Result<()> {
	if !anim.layer_weights.is_empty() && anim.layer_weights.len() != anim.layers.len() {
		return Err(FbxError::BadElement {
			name: format!("{} layer weights for {} layers", anim.layer_weights.len(), anim.layers.len()),
			reason: "layer weight count does not match layers",
		});
	}
	for &layer in &anim.layers {
		let is_layer = scene
			.element(layer)
			.is_some_and(|element| element.element_type == ElementType::AnimLayer);
		if !is_layer {
			return Err(FbxError::BadElement {
				name: format!("element {layer}"),
				reason: "not an animation layer",
			});
		}
	}
	Ok(())
}

/// Elements whose properties `anim` can change.
fn touched_elements(scene: &Scene, anim: &Anim) -> Vec<usize> {
	let mut touched: Vec<usize> = anim.prop_overrides.iter().map(|entry| entry.element).collect();
	for &layer in &anim.layers {
		if let Some(layer) = scene.element(layer).and_then(Element::as_anim_layer) {
			touched.extend(layer.anim_props.iter().map(|prop| prop.element));
		}
	}
	touched.sort_unstable();
	touched.dedup();
	touched
}

/// Pose `scene` with `anim` at `time`.
///
/// Animated properties of every touched element are replaced by their
/// evaluated values, then node transforms, light and camera fields, blend
/// channel weights and skin cluster matrices are derived again.
pub fn evaluate_scene(scene: &Arc<Scene>, anim: &Anim, time: f64, opts: &EvaluateOpts) -> Result<EvaluatedScene> {
	check_anim(scene, anim)?;
	let mut posed = Scene::clone(scene);
	posed.anim = anim.clone();

	let touched = touched_elements(scene, anim);
	for &id in &touched {
		if id >= posed.elements.len() {
			continue;
		}
		let props = evaluate_props(scene, anim, id, time);
		let element = &mut posed.elements[id];
		element.props = props;
		let Element { props, data, .. } = element;
		match data {
			ElementData::Node(node) if !node.is_root => read_node_transform(props, node),
			ElementData::Light(light) => update_light(props, light),
			ElementData::Camera(camera) => update_camera(props, camera),
			_ => {}
		}
	}
	if touched.iter().any(|&id| scene.element(id).is_some_and(|el| el.element_type == ElementType::Node)) {
		update_world_transforms(&mut posed);
	}

	let channels = posed.ids_of(ElementType::BlendChannel).to_vec();
	for id in channels {
		let weight = evaluate_blend_weight(scene, anim, id, time);
		if let Some(channel) = posed.elements[id].as_blend_channel_mut() {
			channel.weight = weight;
			update_blend_keyframes(channel);
		}
	}
	update_cluster_matrices(&mut posed);

	if opts.evaluate_skinning {
		let cache_time = opts.evaluate_caches.then_some(time);
		let mut results = Vec::new();
		for (element, mesh) in posed.meshes() {
			let deformed = !mesh.skin_deformers.is_empty()
				|| !mesh.blend_deformers.is_empty()
				|| (cache_time.is_some() && !mesh.cache_deformers.is_empty());
			if deformed {
				results.push((element.element_id, deformed_positions(&posed, element.element_id, cache_time)));
			}
		}
		for (mesh, positions) in results {
			if let Some(mesh) = posed.elements[mesh].as_mesh_mut() {
				mesh.skinned_positions = positions;
			}
		}
	}

	log::debug!("evaluated {} animated elements at {time}s", touched.len());
	Ok(EvaluatedScene {
		parent: Arc::clone(scene),
		scene: posed,
		time,
	})
}
