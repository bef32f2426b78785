use std::sync::Arc;

use fbxdoc_testkit::{Array, BinaryWriter, Node, binary_object_name};
use glam::DVec3;

use crate::fbx::math::CoordinateAxes;
use crate::fbx::{ElementType, FbxError, LoadOpts, Scene, load_memory};

fn object(class: &str, id: i64, name: &str, sub_type: &str) -> Node {
	Node::new(class)
		.value(id)
		.value(binary_object_name(&format!("{class}::{name}")).as_str())
		.value(sub_type)
}

fn oo(src: i64, dst: i64) -> Node {
	Node::new("C").value("OO").value(src).value(dst)
}

fn model(id: i64, name: &str, translation: [f64; 3], extra: Vec<Node>) -> Node {
	let mut props = vec![Node::prop("Lcl Translation", "Lcl Translation", "", "A", translation)];
	props.extend(extra);
	object("Model", id, name, "Null").child(Node::properties70(props))
}

fn translated(id: i64, name: &str, translation: [f64; 3]) -> Node {
	model(id, name, translation, Vec::new())
}

fn quad_strip(id: i64) -> Node {
	object("Geometry", id, "Strip", "Mesh")
		.child(Node::new("Vertices").array(Array::F64(vec![
			0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 0.0,
		])))
		.child(Node::new("PolygonVertexIndex").array(Array::I32(vec![0, 1, 4, -4, 1, 2, 5, -5])))
}

fn load(
	objects: Vec<Node>,
	connections: Vec<Node>,
	settings: Option<Node>,
	opts: &LoadOpts,
) -> crate::fbx::Result<Arc<Scene>> {
	let mut sections = vec![Node::new("FBXHeaderExtension").child(Node::new("FBXVersion").value(7400_i32))];
	sections.extend(settings);
	sections.push(Node::new("Objects").children(objects));
	sections.push(Node::new("Connections").children(connections));
	load_memory(&BinaryWriter::new(7400).write(&sections), opts)
}

fn id_of(scene: &Scene, name: &str) -> usize {
	scene.find_node(name).unwrap_or_else(|| panic!("node {name}")).element_id
}

fn name_of(scene: &Scene, id: usize) -> &str {
	scene.element(id).map_or("", |element| &*element.name)
}

#[test]
fn parents_depths_and_children_follow_connections() {
	let scene = load(
		vec![
			translated(10, "Hips", [0.0, 1.0, 0.0]),
			translated(11, "Spine", [0.0, 2.0, 0.0]),
			translated(12, "Loose", [5.0, 0.0, 0.0]),
		],
		vec![oo(10, 0), oo(11, 10)],
		None,
		&LoadOpts::default(),
	)
	.expect("scene loads");

	let (hips, spine, loose) = (id_of(&scene, "Hips"), id_of(&scene, "Spine"), id_of(&scene, "Loose"));
	let root = scene.root_node;
	let node = |id| scene.node(id).expect("node");

	assert_eq!(node(hips).parent, Some(root));
	assert_eq!(node(spine).parent, Some(hips));
	assert_eq!(node(loose).parent, Some(root), "unconnected nodes hang off the root");
	assert_eq!(node(spine).node_depth, node(hips).node_depth + 1);
	assert_eq!(node(hips).children, vec![spine]);

	let order = &scene.nodes_by_depth;
	let position = |id| order.iter().position(|&other| other == id).expect("ordered");
	assert_eq!(order[0], root);
	assert!(position(hips) < position(spine));

	let world = node(spine).node_to_world.translation;
	assert!(world.abs_diff_eq(DVec3::new(0.0, 3.0, 0.0), 1e-12), "world = {world}");
}

#[test]
fn nodes_out_of_root_stay_detached_when_allowed() {
	let opts = LoadOpts {
		allow_nodes_out_of_root: true,
		..LoadOpts::default()
	};
	let scene = load(vec![translated(12, "Loose", [5.0, 0.0, 0.0])], vec![], None, &opts).expect("scene loads");
	assert_eq!(scene.node(id_of(&scene, "Loose")).expect("node").parent, None);
}

#[test]
fn parent_cycles_are_rejected() {
	let err = load(
		vec![translated(10, "A", [0.0; 3]), translated(11, "B", [0.0; 3])],
		vec![oo(10, 11), oo(11, 10)],
		None,
		&LoadOpts::default(),
	)
	.expect_err("cycle must fail");
	assert!(matches!(err.root(), FbxError::NodeCycle { .. }), "{err}");
}

#[test]
fn axis_conversion_folds_into_the_root() {
	let settings = Node::new("GlobalSettings").child(Node::properties70([
		Node::prop("UpAxis", "int", "Integer", "", [1_i32]),
		Node::prop("UpAxisSign", "int", "Integer", "", [1_i32]),
		Node::prop("FrontAxis", "int", "Integer", "", [2_i32]),
		Node::prop("FrontAxisSign", "int", "Integer", "", [1_i32]),
		Node::prop("CoordAxis", "int", "Integer", "", [0_i32]),
		Node::prop("CoordAxisSign", "int", "Integer", "", [1_i32]),
	]));
	let opts = LoadOpts {
		target_axes: Some(CoordinateAxes::RIGHT_HANDED_Z_UP),
		..LoadOpts::default()
	};
	let scene = load(vec![translated(10, "Up", [0.0, 1.0, 0.0])], vec![oo(10, 0)], Some(settings), &opts)
		.expect("scene loads");

	assert_eq!(scene.settings.axes, CoordinateAxes::RIGHT_HANDED_Z_UP);
	let root = scene.root().expect("root node");
	let mapped = root.node_to_parent.transform_point3(DVec3::new(1.0, 2.0, 3.0));
	assert!(mapped.abs_diff_eq(DVec3::new(1.0, -3.0, 2.0), 1e-12), "mapped = {mapped}");

	let up = scene.node(id_of(&scene, "Up")).expect("node");
	assert!(up.node_to_world.translation.abs_diff_eq(DVec3::Z, 1e-12));
	assert!(up.local_transform.translation.abs_diff_eq(DVec3::Y, 1e-12), "local data stays in file axes");
}

#[test]
fn unit_conversion_scales_the_root_and_compensates_ignored_scale() {
	let settings = Node::new("GlobalSettings").child(Node::properties70([Node::prop(
		"UnitScaleFactor",
		"double",
		"Number",
		"",
		[1.0],
	)]));
	let rigid = model(11, "Rigid", [0.0, 100.0, 0.0], vec![Node::prop("InheritType", "enum", "", "", [2_i32])]);
	let opts = LoadOpts {
		target_unit_meters: Some(1.0),
		..LoadOpts::default()
	};
	let scene = load(
		vec![translated(10, "Plain", [100.0, 0.0, 0.0]), rigid],
		vec![oo(10, 0), oo(11, 0)],
		Some(settings),
		&opts,
	)
	.expect("scene loads");

	assert_eq!(scene.settings.unit_meters, 1.0);
	let plain = scene.node(id_of(&scene, "Plain")).expect("node");
	assert!(plain.node_to_world.translation.abs_diff_eq(DVec3::X, 1e-9));
	assert_eq!(plain.adjust_scale, 1.0);

	let rigid_id = id_of(&scene, "Rigid");
	let rigid = scene.node(rigid_id).expect("node");
	assert_eq!(rigid.adjust_scale, 0.01);
	let scaling = scene.find_prop(rigid_id, "Lcl Scaling").expect("scaling prop").vec3_value();
	assert!(scaling.abs_diff_eq(DVec3::splat(0.01), 1e-12));
	assert!((rigid.node_to_world.matrix3.x_axis.length() - 0.01).abs() < 1e-12);
	assert!(rigid.node_to_world.translation.abs_diff_eq(DVec3::Y, 1e-9));
}

#[test]
fn face_materials_partition_into_connected_slots() {
	let geometry = quad_strip(11).child(
		Node::new("LayerElementMaterial")
			.value(0_i32)
			.child(Node::new("MappingInformationType").value("ByPolygon"))
			.child(Node::new("ReferenceInformationType").value("IndexToDirect"))
			.child(Node::new("Materials").array(Array::I32(vec![0, 3]))),
	);
	let objects = vec![
		object("Model", 10, "Strip", "Mesh"),
		geometry,
		object("Material", 12, "Red", ""),
		object("Material", 13, "Blue", ""),
	];
	let connections = vec![oo(10, 0), oo(11, 10), oo(12, 10), oo(13, 10)];

	let scene = load(objects.clone(), connections.clone(), None, &LoadOpts::default()).expect("scene loads");
	let node = scene.node(id_of(&scene, "Strip")).expect("node");
	let names: Vec<&str> = node.materials.iter().map(|&id| name_of(&scene, id)).collect();
	assert_eq!(names, ["Red", "Blue"]);
	let mesh = scene.mesh(node.mesh.expect("mesh attached")).expect("mesh");
	assert_eq!(mesh.face_material, vec![0, 1], "out of range slots fold into the last material");
	assert_eq!(mesh.material_parts.len(), 2);
	for part in &mesh.material_parts {
		assert_eq!(part.num_faces, 1);
		assert_eq!(part.num_triangles, 2);
	}
	assert_eq!(mesh.material_parts[1].material, node.materials.get(1).copied());

	let opts = LoadOpts {
		allow_null_material: true,
		..LoadOpts::default()
	};
	let scene = load(objects, connections, None, &opts).expect("scene loads");
	let mesh = scene.meshes().next().expect("mesh").1;
	assert_eq!(mesh.material_parts.len(), 4);
	assert_eq!(mesh.material_parts[3].num_faces, 1);
	assert_eq!(mesh.material_parts[3].material, None);
	assert_eq!(mesh.material_parts[2].num_faces, 0);
}

fn cluster(id: i64, name: &str, indexes: Vec<i32>, weights: Vec<f64>) -> Node {
	object("Deformer", id, name, "Cluster")
		.child(Node::new("Indexes").array(Array::I32(indexes)))
		.child(Node::new("Weights").array(Array::F64(weights)))
}

#[test]
fn skin_weights_are_bucketed_per_vertex() {
	let objects = vec![
		object("Model", 10, "Body", "Mesh"),
		quad_strip(11),
		object("Deformer", 30, "Skin", "Skin"),
		cluster(31, "Upper", vec![0, 1], vec![1.0, 0.25]),
		cluster(32, "Lower", vec![1, 2], vec![0.75, 1.0]),
		cluster(33, "Orphan", vec![3], vec![1.0]),
		object("Model", 40, "UpperBone", "LimbNode"),
		object("Model", 41, "LowerBone", "LimbNode"),
	];
	let connections = vec![
		oo(10, 0),
		oo(11, 10),
		oo(30, 11),
		oo(31, 30),
		oo(32, 30),
		oo(33, 30),
		oo(40, 0),
		oo(41, 40),
		oo(40, 31),
		oo(41, 32),
	];
	let scene = load(objects, connections, None, &LoadOpts::default()).expect("scene loads");

	let (skin_element, mesh_element) = (
		scene.elements_of(ElementType::SkinDeformer).next().expect("skin"),
		scene.elements_of(ElementType::Mesh).next().expect("mesh"),
	);
	let skin = skin_element.as_skin_deformer().expect("skin data");
	let mesh = mesh_element.as_mesh().expect("mesh data");
	assert_eq!(mesh.skin_deformers, vec![skin_element.element_id]);
	assert_eq!(skin.clusters.len(), 2, "clusters without a bone are skipped");
	assert_eq!(skin.vertices.len(), mesh.num_vertices);
	assert_eq!(skin.max_weights_per_vertex, 2);

	let bone_of = |cluster_index: u32| {
		let cluster = scene
			.element(skin.clusters[cluster_index as usize])
			.and_then(|element| element.as_skin_cluster())
			.expect("cluster");
		name_of(&scene, cluster.bone_node.expect("bone"))
	};
	let weights_of = |vertex: usize| {
		let entry = skin.vertices[vertex];
		let begin = entry.weight_begin as usize;
		skin.weights[begin..begin + entry.num_weights as usize]
			.iter()
			.map(|weight| (bone_of(weight.cluster_index), weight.weight))
			.collect::<Vec<_>>()
	};
	assert_eq!(weights_of(0), vec![("UpperBone", 1.0)]);
	assert_eq!(weights_of(1), vec![("LowerBone", 0.75), ("UpperBone", 0.25)]);
	assert_eq!(weights_of(2), vec![("LowerBone", 1.0)]);
	assert!(weights_of(3).is_empty());
}

fn shape(id: i64, name: &str, offset: f64) -> Node {
	object("Geometry", id, name, "Shape")
		.child(Node::new("Indexes").array(Array::I32(vec![4])))
		.child(Node::new("Vertices").array(Array::F64(vec![0.0, 0.0, offset])))
}

#[test]
fn blend_channels_split_weight_between_in_betweens() {
	let channel = object("Deformer", 51, "Smile", "BlendShapeChannel")
		.child(Node::new("DeformPercent").value(75.0))
		.child(Node::new("FullWeights").array(Array::F64(vec![50.0, 100.0])));
	let objects = vec![
		object("Model", 10, "Face", "Mesh"),
		quad_strip(11),
		object("Deformer", 50, "Morph", "BlendShape"),
		channel,
		shape(52, "Half", 0.5),
		shape(53, "Full", 1.0),
	];
	let connections = vec![oo(10, 0), oo(11, 10), oo(50, 11), oo(51, 50), oo(52, 51), oo(53, 51)];
	let scene = load(objects, connections, None, &LoadOpts::default()).expect("scene loads");

	let blend = scene
		.elements_of(ElementType::BlendDeformer)
		.next()
		.and_then(|element| element.as_blend_deformer())
		.expect("blend deformer");
	assert_eq!(blend.channels.len(), 1);
	let channel = scene
		.element(blend.channels[0])
		.and_then(|element| element.as_blend_channel())
		.expect("channel");
	assert_eq!(channel.weight, 0.75);

	let keys: Vec<(&str, f64, f64)> = channel
		.keyframes
		.iter()
		.map(|key| (name_of(&scene, key.shape), key.target_weight, key.effective_weight))
		.collect();
	assert_eq!(keys, vec![("Half", 0.5, 0.5), ("Full", 1.0, 0.5)]);
	assert_eq!(channel.target_shape.map(|shape| name_of(&scene, shape)), Some("Full"));

	let full = scene
		.element(channel.keyframes[1].shape)
		.and_then(|element| element.as_blend_shape())
		.expect("shape data");
	assert_eq!(full.offset_vertices, vec![4]);
	assert!(full.vertex_offset(4).abs_diff_eq(DVec3::Z, 1e-12));
	assert_eq!(full.vertex_offset(0), DVec3::ZERO);
}
