//! Second loading pass: graph-wide resolution of the built elements.
//!
//! The builder leaves elements with their own data only. Everything that
//! needs connections (hierarchy, attachments, deformers, animation) and the
//! derived transforms are resolved here in dependency order.

mod anim;
mod connections;
mod deformers;
mod hierarchy;
mod materials;
mod meshes;
mod names;
mod objects;
mod transforms;
mod units;

use crate::fbx::{ElementType, LoadOpts, Result, Scene};

pub(crate) use deformers::update_cluster_matrices;
pub(crate) use objects::{update_camera, update_light};
pub(crate) use transforms::{read_node_transform, update_world_transforms};

/// Resolve `scene` in place.
pub(crate) fn finalize(scene: &mut Scene, opts: &LoadOpts) -> Result<()> {
	connections::index_types(scene);
	connections::sort_connections(scene);
	connections::flag_connected_props(scene);
	hierarchy::link_parents(scene, opts)?;
	hierarchy::attach_attributes(scene);
	anim::link_anim(scene);
	materials::link_materials(scene);
	materials::link_textures(scene);
	deformers::link_deformers(scene, opts);
	objects::link_objects(scene);
	units::convert_units(scene, opts);
	transforms::update_transforms(scene);
	deformers::update_cluster_matrices(scene);
	meshes::finalize_meshes(scene, opts);
	deformers::load_cache_files(scene, opts)?;
	if opts.evaluate_skinning {
		deformers::evaluate_skinning(scene, opts);
	}
	names::index_names(scene);
	log::debug!(
		"finalized {} nodes, {} meshes, {} anim stacks",
		scene.count(ElementType::Node),
		scene.count(ElementType::Mesh),
		scene.count(ElementType::AnimStack)
	);
	Ok(())
}

#[cfg(test)]
mod tests;
