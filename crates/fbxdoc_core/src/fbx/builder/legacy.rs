//! Pre-7000 documents: models embedding their attribute, and `Takes` animation.

use std::sync::Arc;

use crate::fbx::builder::anim::{DEFAULT_WEIGHT, RawKey, build_keyframes};
use crate::fbx::builder::objects::attribute_type;
use crate::fbx::builder::{ObjectHead, PendingConnection, SceneBuilder};
use crate::fbx::names as n;
use crate::fbx::{
	AnimCurve, AnimLayer, AnimStack, AnimValue, BlendChannel, BlendDeformer, Bone, Camera, ElementData, ElementType,
	FbxId, FbxNode, FbxValue, Interpolation, KTIME_SECOND, Light, Node, Prop, Props, Result, WarningKind, hash_u64,
};

/// Properties that stay on a legacy model; everything else belongs to its attribute.
///
/// Sorted by bytes for binary search.
pub(super) const NODE_PROPS: &[&str] = &[
	"AxisLen",
	"DefaultAttributeIndex",
	"Freeze",
	"GeometricRotation",
	"GeometricScaling",
	"GeometricTranslation",
	"InheritType",
	"LODBox",
	"Lcl Rotation",
	"Lcl Scaling",
	"Lcl Translation",
	"LookAtProperty",
	"MaxDampRangeX",
	"MaxDampRangeY",
	"MaxDampRangeZ",
	"MaxDampStrengthX",
	"MaxDampStrengthY",
	"MaxDampStrengthZ",
	"MinDampRangeX",
	"MinDampRangeY",
	"MinDampRangeZ",
	"MinDampStrengthX",
	"MinDampStrengthY",
	"MinDampStrengthZ",
	"NegativePercentShapeSupport",
	"PostRotation",
	"PreRotation",
	"PreferedAngleX",
	"PreferedAngleY",
	"PreferedAngleZ",
	"QuaternionInterpolate",
	"RotationActive",
	"RotationMax",
	"RotationMaxX",
	"RotationMaxY",
	"RotationMaxZ",
	"RotationMin",
	"RotationMinX",
	"RotationMinY",
	"RotationMinZ",
	"RotationOffset",
	"RotationOrder",
	"RotationPivot",
	"RotationSpaceForLimitOnly",
	"RotationStiffnessX",
	"RotationStiffnessY",
	"RotationStiffnessZ",
	"ScalingActive",
	"ScalingMax",
	"ScalingMaxX",
	"ScalingMaxY",
	"ScalingMaxZ",
	"ScalingMin",
	"ScalingMinX",
	"ScalingMinY",
	"ScalingMinZ",
	"ScalingOffset",
	"ScalingPivot",
	"Show",
	"TranslationActive",
	"TranslationMax",
	"TranslationMaxX",
	"TranslationMaxY",
	"TranslationMaxZ",
	"TranslationMin",
	"TranslationMinX",
	"TranslationMinY",
	"TranslationMinZ",
	"UpVectorProperty",
	"Visibility",
	"Visibility Inheritance",
	"notes",
];

pub(super) fn is_node_prop(name: &str) -> bool {
	NODE_PROPS.binary_search_by(|prop| prop.as_bytes().cmp(name.as_bytes())).is_ok()
}

/// Node-side and attribute-side halves of a legacy model's properties.
pub(super) fn split_legacy_props(props: &Props) -> (Props, Props) {
	let (node, attrib): (Vec<Prop>, Vec<Prop>) = props.iter().cloned().partition(|prop| is_node_prop(&prop.name));
	(Props::from_unsorted(node), Props::from_unsorted(attrib))
}

impl SceneBuilder<'_, '_> {
	/// Split a legacy `Model` into a node element and an attribute element.
	pub(super) fn read_legacy_model(&mut self, node: &FbxNode, head: ObjectHead, dom_node: Option<usize>) -> Result<()> {
		let props = self.read_props(node);
		let attrib_type = attribute_type(&head.sub_type);
		let name = Arc::clone(&head.name);
		let sub_type = Arc::clone(&head.sub_type);
		let model_id = head.id;

		let attrib_data = match attrib_type {
			ElementType::Mesh => Some(ElementData::Mesh(Box::new(self.read_mesh(node, &name)?))),
			ElementType::Light => Some(ElementData::Light(Light::default())),
			ElementType::Camera => Some(ElementData::Camera(Camera::default())),
			ElementType::Bone => Some(ElementData::Bone(Bone {
				is_root: sub_type.as_ref() == "Root",
				..Bone::default()
			})),
			ElementType::NurbsSurface => Some(ElementData::NurbsSurface(self.read_nurbs_surface(node))),
			ElementType::NurbsCurve => Some(ElementData::NurbsCurve(self.read_nurbs_curve(node))),
			_ => None,
		};
		let Some(attrib_data) = attrib_data else {
			self.push_element(head, ElementType::Node, props, ElementData::Node(Node::default()), dom_node)?;
			return Ok(());
		};
		let (node_props, attrib_props) = split_legacy_props(&props);
		let node_data = ElementData::Node(Node::default());
		let node_element = self.push_element(head, ElementType::Node, node_props, node_data, dom_node)?;

		let attrib_id = self.generated_id();
		let type_name = if matches!(attrib_type, ElementType::Mesh | ElementType::NurbsSurface | ElementType::NurbsCurve) {
			"Geometry"
		} else {
			"NodeAttribute"
		};
		let attrib_head = ObjectHead {
			id: attrib_id,
			name: Arc::clone(&name),
			type_name: Arc::from(type_name),
			sub_type,
		};
		let attrib = self.push_element(attrib_head, attrib_type, attrib_props, attrib_data, None)?;
		self.connect(attrib_id, model_id, "");
		self.legacy_attribs.insert(hash_u64(node_element as u64), node_element, attrib);

		if attrib_type == ElementType::Mesh {
			self.read_legacy_shapes(node, attrib_id, &name)?;
		}
		Ok(())
	}

	/// Embedded `Shape` children become a blend deformer with one channel per shape.
	fn read_legacy_shapes(&mut self, node: &FbxNode, mesh_id: FbxId, mesh_name: &str) -> Result<()> {
		let shapes: Vec<&FbxNode> = node.children_named(n::SHAPE).collect();
		if shapes.is_empty() {
			return Ok(());
		}
		let deformer_id = self.generated_id();
		self.push_generated(deformer_id, mesh_name, "Deformer", "BlendShape", ElementType::BlendDeformer, ElementData::BlendDeformer(BlendDeformer::default()))?;
		self.connect(deformer_id, mesh_id, "");

		for shape in shapes {
			let shape_name = shape.value_str(0).map_or_else(String::new, |symbol| self.parser.pool().get(symbol).to_owned());
			let data = self.read_shape(shape);
			let channel_id = self.generated_id();
			self.push_generated(channel_id, &shape_name, "Deformer", "BlendShapeChannel", ElementType::BlendChannel, ElementData::BlendChannel(BlendChannel::default()))?;
			let shape_id = self.generated_id();
			self.push_generated(shape_id, &shape_name, "Geometry", "Shape", ElementType::BlendShape, ElementData::BlendShape(data))?;
			self.connect(channel_id, deformer_id, "");
			self.connect(shape_id, channel_id, "");
		}
		Ok(())
	}

	fn push_generated(
		&mut self,
		id: FbxId,
		name: &str,
		type_name: &str,
		sub_type: &str,
		element_type: ElementType,
		data: ElementData,
	) -> Result<usize> {
		let head = ObjectHead {
			id,
			name: Arc::from(name),
			type_name: Arc::from(type_name),
			sub_type: Arc::from(sub_type),
		};
		self.push_element(head, element_type, Props::default(), data, None)
	}

	fn connect(&mut self, src: FbxId, dst: FbxId, dst_prop: &str) {
		self.pending.push(PendingConnection {
			src,
			dst,
			src_prop: Arc::from(""),
			dst_prop: Arc::from(dst_prop),
		});
	}

	/// One `Take` of a legacy `Takes` section: a stack with a single layer.
	pub(super) fn read_take(&mut self, node: &FbxNode, _dom_node: Option<usize>) -> Result<()> {
		if self.version >= 7000 || node.name != n::TAKE || self.opts.ignore_animation {
			return Ok(());
		}
		let take_name = node.value_str(0).map_or_else(String::new, |symbol| self.parser.pool().get(symbol).to_owned());
		let local_time = node.child(n::LOCAL_TIME);
		let seconds = |index: usize| {
			local_time
				.and_then(|time| time.value_i64(index))
				.map_or(0.0, |ticks| ticks as f64 / KTIME_SECOND as f64)
		};
		let stack = AnimStack {
			time_begin: seconds(0),
			time_end: seconds(1),
			..AnimStack::default()
		};

		let stack_id = self.generated_id();
		self.push_generated(stack_id, &take_name, "AnimationStack", "", ElementType::AnimStack, ElementData::AnimStack(stack))?;
		let layer_id = self.generated_id();
		self.push_generated(layer_id, &take_name, "AnimationLayer", "", ElementType::AnimLayer, ElementData::AnimLayer(AnimLayer::default()))?;
		self.connect(layer_id, stack_id, "");

		for object in &node.children {
			if matches!(object.name, n::FILE_NAME | n::LOCAL_TIME | n::REFERENCE_TIME) {
				continue;
			}
			let Some(FbxValue::Str(target)) = object.values.first() else {
				continue;
			};
			let target = FbxId::Synthetic(*target);
			for channel in object.children_named(n::CHANNEL) {
				self.read_take_channel(channel, target, layer_id)?;
			}
		}
		log::debug!("legacy take {take_name} converted to one stack");
		Ok(())
	}

	fn read_take_channel(&mut self, channel: &FbxNode, target: FbxId, layer_id: FbxId) -> Result<()> {
		let name = self.channel_name(channel);
		if name == "Transform" {
			for sub in channel.children_named(n::CHANNEL) {
				let prop = match self.channel_name(sub).as_str() {
					"T" => "Lcl Translation",
					"R" => "Lcl Rotation",
					"S" => "Lcl Scaling",
					other => {
						log::trace!("skipping transform channel {other}");
						continue;
					}
				};
				self.read_take_prop(sub, prop, target, layer_id)?;
			}
			return Ok(());
		}
		self.read_take_prop(channel, &name, target, layer_id)
	}

	/// One animated property: its components are the nested channels, or the channel itself for scalars.
	fn read_take_prop(&mut self, channel: &FbxNode, prop: &str, target: FbxId, layer_id: FbxId) -> Result<()> {
		let components: Vec<&FbxNode> = channel.children_named(n::CHANNEL).collect();
		let components = if components.is_empty() { vec![channel] } else { components };

		let mut value = AnimValue::default();
		let mut curves = Vec::new();
		for (index, component) in components.iter().take(3).enumerate() {
			let default = component.child_f64(n::DEFAULT).unwrap_or(0.0);
			match index {
				0 => value.default_value.x = default,
				1 => value.default_value.y = default,
				_ => value.default_value.z = default,
			}
			let Some(keys) = component.child_array(n::KEY) else {
				continue;
			};
			let keys = self.decode_legacy_keys(&keys.as_f64())?;
			if keys.is_empty() {
				continue;
			}
			let mut curve = AnimCurve {
				keyframes: build_keyframes(&keys),
				..AnimCurve::default()
			};
			curve.update_bounds();
			curves.push((index, curve));
		}
		if curves.is_empty() {
			return Ok(());
		}

		let value_id = self.generated_id();
		self.push_generated(value_id, prop, "AnimationCurveNode", "", ElementType::AnimValue, ElementData::AnimValue(value))?;
		self.connect(value_id, layer_id, "");
		self.connect(value_id, target, prop);
		for (index, curve) in curves {
			let curve_id = self.generated_id();
			self.push_generated(curve_id, "", "AnimationCurve", "", ElementType::AnimCurve, ElementData::AnimCurve(curve))?;
			self.connect(curve_id, value_id, ["d|X", "d|Y", "d|Z"][index]);
		}
		Ok(())
	}

	fn channel_name(&self, channel: &FbxNode) -> String {
		channel
			.value_str(0)
			.map_or_else(String::new, |symbol| self.parser.pool().get(symbol).to_owned())
	}

	/// `Key` runs: `time, value, mode, [mode arguments]` repeated.
	///
	/// Mode letters arrive as their character codes.
	fn decode_legacy_keys(&mut self, data: &[f64]) -> Result<Vec<RawKey>> {
		let mut keys = Vec::new();
		let mut pos = 0;
		let code = |value: f64| -> u8 { if (0.0..128.0).contains(&value) { value as u8 } else { 0 } };
		while pos + 2 < data.len() {
			let time = data[pos] / KTIME_SECOND as f64;
			let value = data[pos + 1];
			let mode = code(data[pos + 2]);
			pos += 3;
			let key = match mode {
				b'C' => {
					let next = data.get(pos).map_or(0, |&value| code(value));
					pos += 1;
					let interpolation = if next == b'n' { Interpolation::ConstantNext } else { Interpolation::ConstantPrev };
					RawKey::new(time, value, interpolation)
				}
				b'L' => RawKey::new(time, value, Interpolation::Linear),
				b'T' => {
					pos += 5;
					RawKey::new(time, value, Interpolation::Linear)
				}
				b'U' => {
					let tangent_mode = data.get(pos).map_or(0, |&value| code(value));
					let slopes = (data.get(pos + 1).copied().unwrap_or(0.0), data.get(pos + 2).copied().unwrap_or(0.0));
					pos += 3;
					let mut key = RawKey::new(time, value, Interpolation::Cubic);
					if matches!(tangent_mode, b's' | b'b') {
						key.slopes = Some(slopes);
					}
					let weight_mode = data.get(pos).map_or(0, |&value| code(value));
					pos += 1;
					let num_weights = match weight_mode {
						b'n' => 0,
						b'a' => 2,
						_ => 1,
					};
					if num_weights == 2 {
						key.weights = (
							data.get(pos).copied().unwrap_or(DEFAULT_WEIGHT),
							data.get(pos + 1).copied().unwrap_or(DEFAULT_WEIGHT),
						);
					}
					pos += num_weights;
					key
				}
				other => {
					self.tolerate(WarningKind::TruncatedArray, || {
						format!("unknown legacy key mode {:?}", char::from(other))
					})?;
					break;
				}
			};
			keys.push(key);
		}
		Ok(keys)
	}
}

#[cfg(test)]
mod tests {
	use super::{NODE_PROPS, is_node_prop};

	#[test]
	fn node_props_are_byte_sorted() {
		assert!(NODE_PROPS.windows(2).all(|pair| pair[0].as_bytes() < pair[1].as_bytes()));
	}

	#[test]
	fn attribute_props_are_not_node_props() {
		assert!(is_node_prop("Lcl Translation"));
		assert!(is_node_prop("Visibility Inheritance"));
		assert!(!is_node_prop("Intensity"));
		assert!(!is_node_prop("FieldOfView"));
	}
}
