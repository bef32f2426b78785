use glam::{DVec2, DVec3};

use crate::fbx::{
	ApertureMode, Camera, ConstraintTarget, Element, ElementData, ElementType, GateFit, Light, LightDecay, LightType,
	LodLevel, ProjectionMode, Props, Scene,
};

/// Light fields from its properties.
pub(crate) fn update_light(props: &Props, light: &mut Light) {
	light.color = props.vec3("Color", DVec3::ONE);
	light.intensity = props.real("Intensity", 100.0) * 0.01;
	light.light_type = LightType::from_i64(props.int("LightType", 0));
	light.decay = LightDecay::from_i64(props.int("DecayType", 0));
	light.inner_angle = props.real("InnerAngle", 0.0);
	light.outer_angle = props.real("OuterAngle", 45.0);
	light.cast_light = props.bool("CastLight", true);
	light.cast_shadows = props.bool("CastShadows", false);
	light.area_sphere = props.int("AreaLightShape", 0) == 1;
}

fn half_angle_tan(degrees: f64) -> f64 {
	(degrees.to_radians() * 0.5).tan()
}

fn full_angle(tan: f64) -> f64 {
	(tan.atan() * 2.0).to_degrees()
}

/// Camera projection fields from its properties.
///
/// Field of view resolves through the aperture mode; the axis that is not
/// given directly follows from the aspect ratio.
pub(crate) fn update_camera(props: &Props, camera: &mut Camera) {
	camera.projection_mode = if props.int("CameraProjectionType", 0) == 1 {
		ProjectionMode::Orthographic
	} else {
		ProjectionMode::Perspective
	};
	camera.resolution = DVec2::new(props.real("AspectWidth", 640.0), props.real("AspectHeight", 480.0));
	camera.resolution_is_pixels = props.int("AspectRatioMode", 0) != 1;
	camera.aspect_ratio = if camera.resolution.y > 0.0 {
		camera.resolution.x / camera.resolution.y
	} else {
		1.0
	};
	camera.squeeze_ratio = props.real("FilmSqueezeRatio", 1.0);
	camera.film_size_inch = DVec2::new(
		props.real("FilmWidth", 0.816) * camera.squeeze_ratio,
		props.real("FilmHeight", 0.612),
	);
	camera.focal_length_mm = props.real("FocalLength", 35.0);
	camera.aperture_mode = ApertureMode::from_i64(props.int("ApertureMode", 2));
	camera.gate_fit = GateFit::from_i64(props.int("GateFit", 0));
	camera.near_plane = props.real("NearPlane", 0.1);
	camera.far_plane = props.real("FarPlane", 1000.0);

	let aspect = camera.aspect_ratio;
	let fov_tan = match camera.aperture_mode {
		ApertureMode::HorizontalAndVertical => DVec2::new(
			half_angle_tan(props.real("FieldOfViewX", 40.0)),
			half_angle_tan(props.real("FieldOfViewY", 40.0)),
		),
		ApertureMode::Horizontal => {
			let x = half_angle_tan(props.real("FieldOfView", 40.0));
			DVec2::new(x, x / aspect)
		}
		ApertureMode::Vertical => {
			let y = half_angle_tan(props.real("FieldOfView", 40.0));
			DVec2::new(y * aspect, y)
		}
		ApertureMode::FocalLength => {
			let focal = camera.focal_length_mm.max(f64::MIN_POSITIVE);
			camera.film_size_inch * 25.4 / (2.0 * focal)
		}
	};
	camera.field_of_view_tan = fov_tan;
	camera.field_of_view_deg = DVec2::new(full_angle(fov_tan.x), full_angle(fov_tan.y));

	camera.orthographic_extent = props.real("OrthoZoom", 1.0);
	camera.orthographic_size = DVec2::new(camera.orthographic_extent * aspect, camera.orthographic_extent) * 2.0;
	camera.projection_plane = match camera.projection_mode {
		ProjectionMode::Perspective => fov_tan,
		ProjectionMode::Orthographic => camera.orthographic_size,
	};
}

/// Derived attribute fields and links between leaf objects.
pub(super) fn link_objects(scene: &mut Scene) {
	for element in &mut scene.elements {
		let Element { props, data, .. } = element;
		match data {
			ElementData::Light(light) => update_light(props, light),
			ElementData::Camera(camera) => update_camera(props, camera),
			ElementData::Bone(bone) => {
				bone.radius = props.real("Size", 1.0);
				bone.relative_length = props.real("LimbLength", 1.0);
			}
			_ => {}
		}
	}
	link_stereo_cameras(scene);
	link_lod_groups(scene);
	link_collections(scene);
	link_constraints(scene);
}

/// Camera attribute reached through a property connection, directly or via its node.
fn connected_camera(scene: &Scene, element: usize, prop: &str) -> Option<usize> {
	scene.connections_dst_of(element, Some(prop)).iter().find_map(|conn| {
		let source = scene.element(conn.src)?;
		match source.element_type {
			ElementType::Camera => Some(conn.src),
			ElementType::Node => source.as_node()?.camera,
			_ => None,
		}
	})
}

fn link_stereo_cameras(scene: &mut Scene) {
	let ids = scene.ids_of(ElementType::StereoCamera).to_vec();
	for id in ids {
		let left = connected_camera(scene, id, "LeftCamera");
		let right = connected_camera(scene, id, "RightCamera");
		if let Some(stereo) = scene.elements[id].as_stereo_camera_mut() {
			stereo.left = left;
			stereo.right = right;
		}
	}
}

/// One level per child of the instancing node; level `i` switches at threshold `i - 1`.
fn link_lod_groups(scene: &mut Scene) {
	let ids = scene.ids_of(ElementType::LodGroup).to_vec();
	for id in ids {
		let num_levels = scene
			.element(id)
			.and_then(|element| element.instances.first())
			.and_then(|&node| scene.node(node))
			.map_or(0, |node| node.children.len());
		let element = &mut scene.elements[id];
		let relative = element.props.bool("ThresholdsUsedAsPercentage", false);
		let levels: Vec<LodLevel> = (0..num_levels)
			.map(|level| LodLevel {
				distance: if level == 0 {
					0.0
				} else {
					element.props.real(&format!("Thresholds|Level{}", level - 1), 0.0)
				},
				display: element.props.int(&format!("DisplayLevels|Level{level}"), 0),
			})
			.collect();
		if let Some(group) = element.as_lod_group_mut() {
			group.relative_distances = relative;
			group.lod_levels = levels;
		}
	}
}

/// Display layer members, selection set entries and selection targets.
fn link_collections(scene: &mut Scene) {
	let layers = scene.ids_of(ElementType::DisplayLayer).to_vec();
	for id in layers {
		let nodes: Vec<usize> = scene.sources_of(id, ElementType::Node).collect();
		if let Some(layer) = scene.elements[id].as_display_layer_mut() {
			layer.nodes = nodes;
		}
	}

	let sets = scene.ids_of(ElementType::SelectionSet).to_vec();
	for id in sets {
		let nodes: Vec<usize> = scene.sources_of(id, ElementType::SelectionNode).collect();
		if let Some(set) = scene.elements[id].as_selection_set_mut() {
			set.nodes = nodes;
		}
	}

	let selection_nodes = scene.ids_of(ElementType::SelectionNode).to_vec();
	for id in selection_nodes {
		let target_node = scene.sources_of(id, ElementType::Node).next();
		let target_mesh = scene
			.sources_of(id, ElementType::Mesh)
			.next()
			.or_else(|| target_node.and_then(|node| scene.node(node)?.mesh));
		if let Some(selection) = scene.elements[id].as_selection_node_mut() {
			selection.target_node = target_node;
			selection.target_mesh = target_mesh;
		}
	}
}

const CONSTRAINED_PROPS: &[&str] = &["Constrained object (Child)", "Constrained Object"];
const SOURCE_PROPS: &[&str] = &["Source (Parent)", "Constraint Source", "Aim At Object", "Source"];

fn connected_nodes<'a>(scene: &'a Scene, id: usize, props: &'a [&'a str]) -> impl Iterator<Item = usize> + 'a {
	props.iter().flat_map(move |prop| {
		scene
			.connections_dst_of(id, Some(*prop))
			.iter()
			.map(|conn| conn.src)
			.filter(move |&src| scene.element(src).is_some_and(|el| el.element_type == ElementType::Node))
	})
}

/// Constrained node and weighted sources; a source weight lives in `<name>.Weight`.
fn link_constraints(scene: &mut Scene) {
	let ids = scene.ids_of(ElementType::Constraint).to_vec();
	for id in ids {
		let node = connected_nodes(scene, id, CONSTRAINED_PROPS).next();
		let mut targets: Vec<ConstraintTarget> = Vec::new();
		for source in connected_nodes(scene, id, SOURCE_PROPS) {
			if targets.iter().any(|target| target.node == source) {
				continue;
			}
			let name = &scene.elements[source].name;
			let weight = scene.elements[id].props.real(&format!("{name}.Weight"), 100.0) / 100.0;
			targets.push(ConstraintTarget { node: source, weight });
		}
		if let Some(constraint) = scene.elements[id].as_constraint_mut() {
			constraint.node = node;
			constraint.targets = targets;
		}
	}
}
