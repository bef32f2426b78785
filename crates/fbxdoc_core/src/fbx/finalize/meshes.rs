use crate::fbx::geometry::generate_mesh_normals;
use crate::fbx::{ElementType, IndexSource, LoadOpts, Mesh, MeshPart, Scene};

/// Material parts, generated normals and face statistics of every mesh.
pub(super) fn finalize_meshes(scene: &mut Scene, opts: &LoadOpts) {
	let mut max_face_triangles = 0;
	let mut num_bad_faces = 0;
	let ids = scene.ids_of(ElementType::Mesh).to_vec();
	for id in ids {
		let materials = instance_materials(scene, id);
		let Some(mesh) = scene.elements[id].as_mesh_mut() else {
			continue;
		};
		mesh.update_face_stats();
		mesh.material_parts = material_parts(mesh, &materials, opts.allow_null_material);
		if opts.generate_missing_normals && !mesh.vertex_normal.exists && !mesh.faces.is_empty() {
			generate_mesh_normals(mesh);
		}
		max_face_triangles = max_face_triangles.max(mesh.max_face_triangles);
		num_bad_faces += mesh.num_empty_faces + mesh.num_point_faces + mesh.num_line_faces;
	}
	scene.metadata.max_face_triangles = max_face_triangles;
	scene.metadata.num_bad_faces = num_bad_faces;

	let surfaces = scene.ids_of(ElementType::NurbsSurface).to_vec();
	for id in surfaces {
		let material = instance_materials(scene, id).first().copied();
		if let Some(surface) = scene.elements[id].as_nurbs_surface_mut() {
			surface.material = material;
		}
	}
}

/// Materials of the first node instancing `element`.
fn instance_materials(scene: &Scene, element: usize) -> Vec<usize> {
	scene
		.element(element)
		.and_then(|element| element.instances.first())
		.and_then(|&node| scene.node(node))
		.map(|node| node.materials.clone())
		.unwrap_or_default()
}

/// Partition faces by material slot.
///
/// Without `allow_null_material`, slots past the connected materials fold
/// into the last material so every part has one.
fn material_parts(mesh: &mut Mesh, materials: &[usize], allow_null_material: bool) -> Vec<MeshPart> {
	let max_slot = mesh.face_material.iter().copied().max().map_or(0, |slot| slot as usize + 1);
	let num_parts = if allow_null_material || materials.is_empty() {
		max_slot.max(materials.len()).max(1)
	} else {
		materials.len()
	};
	if !allow_null_material && !materials.is_empty() {
		let last = (materials.len() - 1) as u32;
		for slot in &mut mesh.face_material {
			*slot = (*slot).min(last);
		}
	}

	let mut parts: Vec<MeshPart> = (0..num_parts)
		.map(|index| MeshPart {
			index,
			material: materials.get(index).copied(),
			..MeshPart::default()
		})
		.collect();
	let mut faces_per_part: Vec<Vec<u32>> = vec![Vec::new(); num_parts];
	for (face_index, face) in mesh.faces.iter().enumerate() {
		let slot = mesh.face_material.get(face_index).map_or(0, |&slot| slot as usize);
		let Some(part) = parts.get_mut(slot) else {
			continue;
		};
		part.num_faces += 1;
		match face.num_indices {
			0 => part.num_empty_faces += 1,
			1 => part.num_point_faces += 1,
			2 => part.num_line_faces += 1,
			n => part.num_triangles += n as usize - 2,
		}
		faces_per_part[slot].push(face_index as u32);
	}
	for (part, faces) in parts.iter_mut().zip(faces_per_part) {
		part.face_indices = IndexSource::Explicit(faces).canonicalize();
	}
	parts
}
