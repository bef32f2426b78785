use std::sync::Arc;

use fbxdoc_testkit::{Array, BinaryWriter, Node, binary_object_name};
use glam::DVec3;

use super::{
	EvaluateOpts, evaluate_curve, evaluate_prop, evaluate_scene, evaluate_transform, prepare_prop_overrides,
	update_blend_keyframes,
};
use crate::fbx::{
	Anim, AnimCurve, BlendChannel, BlendKeyframe, ElementType, FbxError, Interpolation, KTIME_SECOND, Keyframe,
	LoadOpts, PropFlags, PropOverride, Scene, Tangent, load_memory,
};

fn key(time: f64, value: f64, interpolation: Interpolation) -> Keyframe {
	Keyframe {
		time,
		value,
		interpolation,
		left: Tangent::default(),
		right: Tangent::default(),
	}
}

fn object(class: &str, id: i64, name: &str, sub_type: &str) -> Node {
	Node::new(class)
		.value(id)
		.value(binary_object_name(&format!("{class}::{name}")).as_str())
		.value(sub_type)
}

fn oo(src: i64, dst: i64) -> Node {
	Node::new("C").value("OO").value(src).value(dst)
}

fn op(src: i64, dst: i64, prop: &str) -> Node {
	Node::new("C").value("OP").value(src).value(dst).value(prop)
}

/// Linear curve through `(seconds, value)` keys.
fn linear_curve(id: i64, keys: &[(f64, f32)]) -> Node {
	let times = keys.iter().map(|&(time, _)| (time * KTIME_SECOND as f64) as i64).collect();
	let values = keys.iter().map(|&(_, value)| value).collect();
	object("AnimationCurve", id, "", "")
		.child(Node::new("KeyTime").array(Array::I64(times)))
		.child(Node::new("KeyValueFloat").array(Array::F32(values)))
		.child(Node::new("KeyAttrFlags").array(Array::I32(vec![0x4])))
		.child(Node::new("KeyAttrRefCount").array(Array::I32(vec![keys.len() as i32])))
}

fn layer(id: i64, name: &str, weight: f64) -> Node {
	object("AnimationLayer", id, name, "").child(Node::properties70([Node::prop(
		"Weight", "Number", "", "A", [weight],
	)]))
}

fn curve_node(id: i64) -> Node {
	object("AnimationCurveNode", id, "T", "").child(Node::properties70([
		Node::prop("d|X", "Number", "", "A", [0.0]),
		Node::prop("d|Y", "Number", "", "A", [0.0]),
		Node::prop("d|Z", "Number", "", "A", [0.0]),
	]))
}

/// Node `Mover` whose X translation goes 0 to 10 over one second, with an
/// optional additive layer adding 4 at half weight.
fn animated_scene(second_layer: bool) -> Arc<Scene> {
	let mut objects = vec![
		object("Model", 10, "Mover", "Null").child(Node::properties70([Node::prop(
			"Lcl Translation",
			"Lcl Translation",
			"",
			"A",
			[0.0, 2.0, 0.0],
		)])),
		object("AnimationStack", 20, "Take", ""),
		layer(21, "Base", 100.0),
		curve_node(22),
		linear_curve(23, &[(0.0, 0.0), (1.0, 10.0)]),
	];
	let mut connections = vec![
		oo(10, 0),
		oo(21, 20),
		oo(22, 21),
		op(22, 10, "Lcl Translation"),
		op(23, 22, "d|X"),
	];
	if second_layer {
		objects.extend([layer(31, "Offset", 50.0), curve_node(32), linear_curve(33, &[(0.0, 4.0), (1.0, 4.0)])]);
		connections.extend([oo(31, 20), oo(32, 31), op(32, 10, "Lcl Translation"), op(33, 32, "d|X")]);
	}
	let bytes = BinaryWriter::new(7400).write(&[
		Node::new("FBXHeaderExtension").child(Node::new("FBXVersion").value(7400_i32)),
		Node::new("Objects").children(objects),
		Node::new("Connections").children(connections),
	]);
	load_memory(&bytes, &LoadOpts::default()).expect("animated scene loads")
}

fn mover(scene: &Scene) -> usize {
	scene.find_node("Mover").expect("Mover node").element_id
}

#[test]
fn cubic_segment_stays_between_its_keys() {
	let mut a = key(0.0, 0.0, Interpolation::Cubic);
	a.right = Tangent { dx: 1.0, dy: 1.0 };
	let mut b = key(1.0, 10.0, Interpolation::Cubic);
	b.left = Tangent { dx: 1.0, dy: 0.0 };
	let curve = AnimCurve {
		keyframes: vec![a, b],
		..AnimCurve::default()
	};

	assert_eq!(evaluate_curve(&curve, 0.0, -1.0), 0.0);
	assert_eq!(evaluate_curve(&curve, 1.0, -1.0), 10.0);
	let mid = evaluate_curve(&curve, 0.5, -1.0);
	assert!((mid - 5.375).abs() < 1e-9, "mid = {mid}");

	let mut prev = 0.0;
	for step in 1..=20 {
		let value = evaluate_curve(&curve, f64::from(step) / 20.0, -1.0);
		assert!(value >= prev && value <= 10.0, "step {step}: {value}");
		prev = value;
	}
}

#[test]
fn step_and_linear_segments() {
	let curve = AnimCurve {
		keyframes: vec![
			key(0.0, 1.0, Interpolation::ConstantPrev),
			key(1.0, 3.0, Interpolation::ConstantNext),
			key(2.0, 5.0, Interpolation::Linear),
			key(4.0, 9.0, Interpolation::Linear),
		],
		..AnimCurve::default()
	};
	assert_eq!(evaluate_curve(&curve, 0.5, 0.0), 1.0);
	assert_eq!(evaluate_curve(&curve, 1.5, 0.0), 5.0);
	assert_eq!(evaluate_curve(&curve, 3.0, 0.0), 7.0);
	assert_eq!(evaluate_curve(&curve, -3.0, 0.0), 1.0);
	assert_eq!(evaluate_curve(&curve, 10.0, 0.0), 9.0);
	assert_eq!(evaluate_curve(&AnimCurve::default(), 1.0, 42.0), 42.0);
}

#[test]
fn single_layer_drives_translation() {
	let scene = loaded_single();
	let node = mover(&scene);

	let prop = evaluate_prop(&scene, &scene.anim, node, "Lcl Translation", 0.5);
	assert!(prop.flags.contains(PropFlags::ANIMATED));
	assert!((prop.value_real.x - 5.0).abs() < 1e-6);
	assert!((prop.value_real.y - 0.0).abs() < 1e-9, "curve node default replaces the static value");

	let transform = evaluate_transform(&scene, &scene.anim, node, 0.25);
	assert!((transform.translation.x - 2.5).abs() < 1e-6);
	assert_eq!(scene.anim.time_end, 1.0);
}

fn loaded_single() -> Arc<Scene> {
	animated_scene(false)
}

#[test]
fn additive_layer_adds_weighted_value() {
	let scene = animated_scene(true);
	let node = mover(&scene);
	assert_eq!(scene.anim.layers.len(), 2);

	let prop = evaluate_prop(&scene, &scene.anim, node, "Lcl Translation", 1.0);
	assert!((prop.value_real.x - 12.0).abs() < 1e-6, "x = {}", prop.value_real.x);

	let muted = Anim {
		layer_weights: vec![1.0, 0.0],
		..scene.anim.clone()
	};
	let prop = evaluate_prop(&scene, &muted, node, "Lcl Translation", 1.0);
	assert!((prop.value_real.x - 10.0).abs() < 1e-6);
}

#[test]
fn overrides_win_and_report_missing_props() {
	let scene = loaded_single();
	let node = mover(&scene);
	let entry = |x: f64| PropOverride {
		element: node,
		prop_name: Arc::from("Lcl Translation"),
		value: glam::DVec4::new(x, 0.0, 0.0, 0.0),
		value_str: Arc::from(""),
		value_int: x as i64,
	};
	let anim = Anim {
		prop_overrides: prepare_prop_overrides(vec![entry(1.0), entry(7.0)]),
		..scene.anim.clone()
	};
	assert_eq!(anim.prop_overrides.len(), 1);

	let prop = evaluate_prop(&scene, &anim, node, "Lcl Translation", 0.5);
	assert!(prop.flags.contains(PropFlags::OVERRIDDEN));
	assert_eq!(prop.value_real.x, 7.0);

	let missing = evaluate_prop(&scene, &anim, node, "NoSuchProp", 0.5);
	assert!(missing.flags.contains(PropFlags::NOT_FOUND));
	assert_eq!(missing.value_real.x, 0.0);
}

#[test]
fn evaluated_scene_poses_world_transforms() {
	let scene = loaded_single();
	let node = mover(&scene);
	let posed = evaluate_scene(&scene, &scene.anim, 0.5, &EvaluateOpts::default()).expect("scene evaluates");

	let world = posed.node(node).expect("posed node").node_to_world;
	assert!((world.translation - DVec3::new(5.0, 0.0, 0.0)).length() < 1e-6);
	let original = scene.node(node).expect("original node").node_to_world;
	assert!((original.translation - DVec3::new(0.0, 2.0, 0.0)).length() < 1e-9);
	assert!(Arc::ptr_eq(&posed.parent, &scene));
	assert_eq!(posed.time, 0.5);
}

#[test]
fn evaluate_scene_rejects_bad_layers() {
	let scene = loaded_single();
	let bad_weights = Anim {
		layer_weights: vec![1.0, 1.0],
		..scene.anim.clone()
	};
	let err = evaluate_scene(&scene, &bad_weights, 0.0, &EvaluateOpts::default()).expect_err("weights mismatch");
	assert!(matches!(err, FbxError::BadElement { .. }));

	let node = mover(&scene);
	let not_a_layer = Anim {
		layers: vec![node],
		..Anim::default()
	};
	let err = evaluate_scene(&scene, &not_a_layer, 0.0, &EvaluateOpts::default()).expect_err("node is not a layer");
	assert!(matches!(err, FbxError::BadElement { .. }));
	assert_eq!(scene.count(ElementType::AnimLayer), 1);
}

#[test]
fn blend_weight_splits_between_in_betweens() {
	let mut channel = BlendChannel {
		keyframes: vec![
			BlendKeyframe {
				shape: 1,
				target_weight: 0.5,
				effective_weight: 0.0,
			},
			BlendKeyframe {
				shape: 2,
				target_weight: 1.0,
				effective_weight: 0.0,
			},
		],
		..BlendChannel::default()
	};

	channel.weight = 0.25;
	update_blend_keyframes(&mut channel);
	assert_eq!(channel.keyframes[0].effective_weight, 0.5);
	assert_eq!(channel.keyframes[1].effective_weight, 0.0);

	channel.weight = 0.75;
	update_blend_keyframes(&mut channel);
	assert_eq!(channel.keyframes[0].effective_weight, 0.5);
	assert_eq!(channel.keyframes[1].effective_weight, 0.5);

	channel.weight = 1.0;
	update_blend_keyframes(&mut channel);
	assert_eq!(channel.keyframes[0].effective_weight, 0.0);
	assert_eq!(channel.keyframes[1].effective_weight, 1.0);
}
