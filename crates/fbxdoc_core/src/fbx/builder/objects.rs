use std::sync::Arc;

use glam::{DAffine3, DMat4, DVec3, DVec4};

use crate::fbx::builder::{ObjectHead, PendingBonePose, SceneBuilder};
use crate::fbx::names as n;
use crate::fbx::{
	AnimLayer, AnimStack, AnimValue, BlendChannel, CacheDeformer, CacheFile, CacheFileFormat, Constraint,
	ConstraintType, DisplayLayer, ElementData, ElementType, FbxId, FbxNode, FbxValue, KTIME_SECOND, LineCurve,
	LineSegment, Material, Node, NurbsBasis, NurbsCurve, NurbsSurface, NurbsTopology, Pose, Props, Result,
	ResultExt, SelectionNode, SelectionSet, Shader, ShaderBinding, ShaderPropBinding, ShaderType, SkinCluster,
	SkinDeformer, SkinningMethod, Symbol, Texture, TextureLayer, TextureType, Video, WarningKind,
};

impl SceneBuilder<'_, '_> {
	/// One child of `Objects`.
	pub(super) fn read_object(&mut self, node: &FbxNode, dom_node: Option<usize>) -> Result<()> {
		if node.name == n::GLOBAL_SETTINGS {
			self.read_global_settings(node);
			return Ok(());
		}
		let Some(head) = self.object_head(node) else {
			log::trace!("object {} without a name", self.parser.pool().get(node.name));
			return Ok(());
		};
		if self.version < 7000 && node.name == n::MODEL {
			let name = Arc::clone(&head.name);
			return self
				.read_legacy_model(node, head, dom_node)
				.with_context(|| format!("legacy model {name}"));
		}

		let element_type = classify(node.name, &head.sub_type);
		let props = self.read_props(node);
		let name = Arc::clone(&head.name);
		let data = self
			.read_object_data(node, element_type, &head, &props)
			.with_context(|| format!("{} {name}", element_type.as_str()))?;
		let element = self.push_element(head, element_type, props, data, dom_node)?;
		if element_type == ElementType::Pose {
			self.read_pose_nodes(node, element);
		}
		Ok(())
	}

	/// Id, name and sub-type of an object node.
	///
	/// 7.x objects are `id, "Class::Name", "SubType"`; older files drop the id
	/// and are identified by the full `Class::Name` string.
	pub(super) fn object_head(&mut self, node: &FbxNode) -> Option<ObjectHead> {
		let pool = self.parser.pool();
		let type_name = pool.arc(node.name);
		let (id, full_name, sub_type) = match node.values.first()? {
			FbxValue::Number { i, .. } => (
				FbxId::Explicit(*i as u64),
				node.value_str(1),
				node.value_str(2),
			),
			FbxValue::Str(symbol) => (FbxId::Synthetic(*symbol), Some(*symbol), node.value_str(1)),
			FbxValue::Blob(_) => return None,
		};
		let full_name = full_name.map_or("", |symbol| pool.get(symbol));
		let name = full_name.split_once("::").map_or(full_name, |(_, name)| name);
		Some(ObjectHead {
			id,
			name: Arc::from(name),
			type_name,
			sub_type: sub_type.map_or_else(|| Arc::from(""), |symbol| pool.arc(symbol)),
		})
	}

	fn read_object_data(
		&mut self,
		node: &FbxNode,
		element_type: ElementType,
		head: &ObjectHead,
		props: &Props,
	) -> Result<ElementData> {
		Ok(match element_type {
			ElementType::Node => ElementData::Node(Node::default()),
			ElementType::Mesh => ElementData::Mesh(Box::new(self.read_mesh(node, &head.name)?)),
			ElementType::BlendShape => ElementData::BlendShape(self.read_shape(node)),
			ElementType::NurbsCurve => ElementData::NurbsCurve(self.read_nurbs_curve(node)),
			ElementType::NurbsSurface => ElementData::NurbsSurface(self.read_nurbs_surface(node)),
			ElementType::LineCurve => ElementData::LineCurve(read_line(node)),
			ElementType::Light => ElementData::Light(Default::default()),
			ElementType::Camera => ElementData::Camera(Default::default()),
			ElementType::Bone => ElementData::Bone(crate::fbx::Bone {
				is_root: head.sub_type.as_ref() == "Root",
				..Default::default()
			}),
			ElementType::StereoCamera => ElementData::StereoCamera(Default::default()),
			ElementType::LodGroup => ElementData::LodGroup(Default::default()),
			ElementType::SkinDeformer => {
				let method = node
					.child_str(n::SKINNING_TYPE)
					.map_or(SkinningMethod::Linear, |symbol| SkinningMethod::from_name(self.parser.pool().get(symbol)));
				ElementData::SkinDeformer(read_skin(node, method))
			}
			ElementType::SkinCluster => ElementData::SkinCluster(read_cluster(node)),
			ElementType::BlendDeformer => ElementData::BlendDeformer(Default::default()),
			ElementType::BlendChannel => ElementData::BlendChannel(read_blend_channel(node, props)),
			ElementType::CacheDeformer => ElementData::CacheDeformer(CacheDeformer {
				channel: props.str("ChannelName"),
				file: None,
			}),
			ElementType::CacheFile => ElementData::CacheFile(read_cache_file(props)),
			ElementType::Material => ElementData::Material(Material {
				shading_model_name: node
					.child_str(n::SHADING_MODEL)
					.map_or_else(|| props.str("ShadingModel"), |symbol| self.parser.pool().arc(symbol)),
				..Material::default()
			}),
			ElementType::Texture => ElementData::Texture(self.read_texture(node, head)),
			ElementType::Video => ElementData::Video(self.read_video(node, props)),
			ElementType::Shader => ElementData::Shader(Shader {
				shader_type: shader_type_of(&props.str("RenderAPI")),
				bindings: Vec::new(),
			}),
			ElementType::ShaderBinding => ElementData::ShaderBinding(self.read_binding_table(node)),
			ElementType::AnimStack => ElementData::AnimStack(read_anim_stack(props)),
			ElementType::AnimLayer => ElementData::AnimLayer(read_anim_layer(props)),
			ElementType::AnimValue => ElementData::AnimValue(read_anim_value(props)),
			ElementType::AnimCurve => ElementData::AnimCurve(self.read_anim_curve(node)?),
			ElementType::DisplayLayer => ElementData::DisplayLayer(DisplayLayer {
				nodes: Vec::new(),
				visible: props.bool("Show", true),
				frozen: props.bool("Freeze", false),
				ui_color: props.vec3("Color", DVec3::splat(0.8)),
			}),
			ElementType::SelectionSet => ElementData::SelectionSet(SelectionSet::default()),
			ElementType::SelectionNode => ElementData::SelectionNode(read_selection_node(node)),
			ElementType::Constraint => ElementData::Constraint(Constraint {
				constraint_type: ConstraintType::from_name(&head.sub_type),
				weight: props.real("Weight", 100.0) / 100.0,
				active: props.bool("Active", true),
				..Constraint::default()
			}),
			ElementType::Pose => ElementData::Pose(Pose {
				is_bind_pose: node
					.child_str(n::TYPE)
					.is_some_and(|symbol| symbol == n::BIND_POSE),
				bone_poses: Vec::new(),
			}),
			_ => ElementData::Plain,
		})
	}

	fn read_pose_nodes(&mut self, node: &FbxNode, pose: usize) {
		for entry in node.children_named(n::POSE_NODE) {
			let id = match entry.child(n::NODE).and_then(|node| node.values.first()) {
				Some(FbxValue::Number { i, .. }) => FbxId::Explicit(*i as u64),
				Some(FbxValue::Str(symbol)) => FbxId::Synthetic(*symbol),
				_ => continue,
			};
			let Some(matrix) = read_matrix(entry, n::MATRIX) else {
				continue;
			};
			self.bone_poses.push(PendingBonePose {
				pose,
				node: id,
				matrix,
			});
		}
	}

	pub(super) fn read_nurbs_curve(&mut self, node: &FbxNode) -> NurbsCurve {
		let control_points = read_points4(node);
		let mut basis = NurbsBasis {
			order: node.child_i64(n::ORDER).unwrap_or(4).max(1) as u32,
			topology: self.topology(node.child_str(n::FORM)),
			knot_vector: node
				.child_array(n::KNOT_VECTOR)
				.map(|array| array.as_f64().into_owned())
				.unwrap_or_default(),
			is_2d: node.child_i64(n::DIMENSION) == Some(2),
			..NurbsBasis::default()
		};
		crate::fbx::geometry::setup_nurbs_basis(&mut basis, control_points.len());
		NurbsCurve {
			basis,
			control_points,
		}
	}

	pub(super) fn read_nurbs_surface(&mut self, node: &FbxNode) -> NurbsSurface {
		let pair = |name: Symbol, default: i64| {
			let child = node.child(name);
			let first = child.and_then(|child| child.value_i64(0)).unwrap_or(default);
			let second = child.and_then(|child| child.value_i64(1)).unwrap_or(first);
			(first.max(0) as u32, second.max(0) as u32)
		};
		let (order_u, order_v) = match node.child(n::NURBS_SURFACE_ORDER) {
			Some(_) => pair(n::NURBS_SURFACE_ORDER, 4),
			None => pair(n::ORDER, 4),
		};
		let (num_u, num_v) = pair(n::DIMENSIONS, 0);
		let (step_u, step_v) = pair(n::STEP, 4);
		let form = node.child(n::FORM);
		let form_u = node.child_str(n::FORM_U).or_else(|| form.and_then(|form| form.value_str(0)));
		let form_v = node
			.child_str(n::FORM_V)
			.or_else(|| form.and_then(|form| form.value_str(1)))
			.or(form_u);

		let knots = |name: Symbol| {
			node.child_array(name)
				.map(|array| array.as_f64().into_owned())
				.unwrap_or_default()
		};
		let mut basis_u = NurbsBasis {
			order: order_u.max(1),
			topology: self.topology(form_u),
			knot_vector: knots(n::KNOT_VECTOR_U),
			..NurbsBasis::default()
		};
		let mut basis_v = NurbsBasis {
			order: order_v.max(1),
			topology: self.topology(form_v),
			knot_vector: knots(n::KNOT_VECTOR_V),
			..NurbsBasis::default()
		};
		crate::fbx::geometry::setup_nurbs_basis(&mut basis_u, num_u as usize);
		crate::fbx::geometry::setup_nurbs_basis(&mut basis_v, num_v as usize);

		NurbsSurface {
			basis_u,
			basis_v,
			num_control_points_u: num_u as usize,
			num_control_points_v: num_v as usize,
			span_subdivision_u: step_u.max(1),
			span_subdivision_v: step_v.max(1),
			flip_normals: node.child_i64(n::FLIP_NORMALS).is_some_and(|flip| flip != 0),
			control_points: read_points4(node),
			material: None,
		}
	}

	fn topology(&self, form: Option<Symbol>) -> NurbsTopology {
		form.map_or(NurbsTopology::Open, |symbol| {
			NurbsTopology::from_form(self.parser.pool().get(symbol))
		})
	}

	fn read_texture(&mut self, node: &FbxNode, head: &ObjectHead) -> Texture {
		let pool = self.parser.pool();
		let text = |name: Symbol| node.child_str(name).map(|symbol| pool.arc(symbol));
		let mut texture = Texture {
			filename: text(n::FILE_NAME)
				.or_else(|| text(n::FILENAME))
				.unwrap_or_else(|| Arc::from("")),
			relative_filename: text(n::RELATIVE_FILENAME).unwrap_or_else(|| Arc::from("")),
			..Texture::default()
		};
		if head.type_name.as_ref() == "LayeredTexture" {
			texture.texture_type = TextureType::Layered;
			let modes = node.child(n::BLEND_MODES);
			let alphas = node.child(n::ALPHAS);
			let count = modes.map_or(0, |modes| modes.values.len());
			texture.layers = (0..count)
				.map(|index| TextureLayer {
					texture: usize::MAX,
					blend_mode: modes.and_then(|modes| modes.value_i64(index)).unwrap_or(0),
					alpha: alphas.and_then(|alphas| alphas.value_f64(index)).unwrap_or(1.0),
				})
				.collect();
		} else if head.sub_type.as_ref() == "Procedural" {
			texture.texture_type = TextureType::Procedural;
		}
		texture
	}

	fn read_video(&mut self, node: &FbxNode, props: &Props) -> Video {
		let pool = self.parser.pool();
		let text = |name: Symbol| node.child_str(name).map(|symbol| pool.arc(symbol));
		let filename = text(n::FILE_NAME)
			.or_else(|| text(n::FILENAME))
			.unwrap_or_else(|| props.str("Path"));
		let content = node
			.child(n::CONTENT)
			.and_then(|content| content.value_blob(0))
			.filter(|bytes| !bytes.is_empty())
			.cloned();
		Video {
			filename,
			relative_filename: text(n::RELATIVE_FILENAME).unwrap_or_else(|| props.str("RelPath")),
			absolute_filename: Arc::from(""),
			content,
		}
	}

	fn read_binding_table(&mut self, node: &FbxNode) -> ShaderBinding {
		let pool = self.parser.pool();
		let mut prop_bindings: Vec<ShaderPropBinding> = node
			.children_named(n::ENTRY)
			.filter_map(|entry| {
				Some(ShaderPropBinding {
					shader_prop: pool.arc(entry.value_str(0)?),
					material_prop: pool.arc(entry.value_str(2)?),
				})
			})
			.collect();
		prop_bindings.sort_by(|a, b| a.shader_prop.cmp(&b.shader_prop));
		ShaderBinding { prop_bindings }
	}

	pub(super) fn read_shape(&mut self, node: &FbxNode) -> crate::fbx::BlendShape {
		let indices = node.child_array(n::INDEXES).map(|array| array.as_i32().into_owned());
		let positions = read_points3(node, n::VERTICES);
		let normals = read_points3(node, n::NORMALS);
		let indices = indices.unwrap_or_default();

		let mut entries: Vec<(u32, DVec3, Option<DVec3>)> = Vec::with_capacity(indices.len());
		for (slot, &index) in indices.iter().enumerate() {
			let Ok(index) = u32::try_from(index) else {
				self.warn(WarningKind::IndexClamped, || format!("negative shape index {index}"));
				continue;
			};
			let Some(&position) = positions.get(slot) else {
				self.warn(WarningKind::TruncatedArray, || "shape has fewer offsets than indices".to_owned());
				break;
			};
			entries.push((index, position, normals.get(slot).copied()));
		}
		entries.sort_by_key(|(index, _, _)| *index);
		entries.dedup_by_key(|(index, _, _)| *index);

		let has_normals = !normals.is_empty();
		crate::fbx::BlendShape {
			offset_vertices: entries.iter().map(|(index, _, _)| *index).collect(),
			position_offsets: entries.iter().map(|(_, position, _)| *position).collect(),
			normal_offsets: if has_normals {
				entries.iter().map(|(_, _, normal)| normal.unwrap_or(DVec3::ZERO)).collect()
			} else {
				Vec::new()
			},
		}
	}
}

/// Element type of an `Objects` child.
pub(super) fn classify(name: Symbol, sub_type: &str) -> ElementType {
	match name {
		n::MODEL => ElementType::Node,
		n::GEOMETRY => match sub_type {
			"Mesh" => ElementType::Mesh,
			"Shape" => ElementType::BlendShape,
			"NurbsCurve" => ElementType::NurbsCurve,
			"NurbsSurface" | "Nurb" => ElementType::NurbsSurface,
			"Line" => ElementType::LineCurve,
			"TrimNurbsSurface" => ElementType::NurbsTrimSurface,
			"Boundary" => ElementType::NurbsTrimBoundary,
			_ => ElementType::Unknown,
		},
		n::NODE_ATTRIBUTE => attribute_type(sub_type),
		n::DEFORMER | n::SUB_DEFORMER => match sub_type {
			"Skin" => ElementType::SkinDeformer,
			"Cluster" => ElementType::SkinCluster,
			"BlendShape" => ElementType::BlendDeformer,
			"BlendShapeChannel" => ElementType::BlendChannel,
			"VertexCacheDeformer" => ElementType::CacheDeformer,
			_ => ElementType::Unknown,
		},
		n::CACHE => ElementType::CacheFile,
		n::MATERIAL => ElementType::Material,
		n::TEXTURE | n::LAYERED_TEXTURE => ElementType::Texture,
		n::VIDEO => ElementType::Video,
		n::IMPLEMENTATION => ElementType::Shader,
		n::BINDING_TABLE => ElementType::ShaderBinding,
		n::ANIMATION_STACK => ElementType::AnimStack,
		n::ANIMATION_LAYER => ElementType::AnimLayer,
		n::ANIMATION_CURVE_NODE => ElementType::AnimValue,
		n::ANIMATION_CURVE => ElementType::AnimCurve,
		n::COLLECTION_EXCLUSIVE => ElementType::DisplayLayer,
		n::COLLECTION => ElementType::SelectionSet,
		n::SELECTION_NODE => ElementType::SelectionNode,
		n::CHARACTER => ElementType::Character,
		n::CONSTRAINT => ElementType::Constraint,
		n::POSE => ElementType::Pose,
		n::OBJECT_META_DATA | n::META_DATA => ElementType::MetadataObject,
		_ => ElementType::Unknown,
	}
}

/// Attribute type named by a `NodeAttribute` or legacy `Model` sub-type.
pub(super) fn attribute_type(sub_type: &str) -> ElementType {
	match sub_type {
		"Mesh" => ElementType::Mesh,
		"Light" => ElementType::Light,
		"Camera" => ElementType::Camera,
		"LimbNode" | "Limb" | "Root" => ElementType::Bone,
		"Null" => ElementType::Empty,
		"CameraStereo" => ElementType::StereoCamera,
		"CameraSwitcher" => ElementType::CameraSwitcher,
		"Marker" => ElementType::Marker,
		"LodGroup" => ElementType::LodGroup,
		"Nurb" | "NurbsSurface" => ElementType::NurbsSurface,
		"NurbsCurve" => ElementType::NurbsCurve,
		"Line" => ElementType::LineCurve,
		_ => ElementType::Unknown,
	}
}

/// Column-major 4x4 matrix array.
pub(super) fn read_matrix(node: &FbxNode, name: Symbol) -> Option<DAffine3> {
	let values = node.child_array(name)?.as_f64();
	let cols = values.get(..16)?;
	Some(DAffine3::from_mat4(DMat4::from_cols_slice(cols)))
}

fn read_points3(node: &FbxNode, name: Symbol) -> Vec<DVec3> {
	node.child_array(name).map_or_else(Vec::new, |array| {
		array
			.as_f64()
			.chunks_exact(3)
			.map(DVec3::from_slice)
			.collect()
	})
}

fn read_points4(node: &FbxNode) -> Vec<DVec4> {
	node.child_array(n::POINTS).map_or_else(Vec::new, |array| {
		array
			.as_f64()
			.chunks_exact(4)
			.map(DVec4::from_slice)
			.collect()
	})
}

fn read_line(node: &FbxNode) -> LineCurve {
	let control_points = node.child_array(n::POINTS).map_or_else(Vec::new, |array| {
		array
			.as_f64()
			.chunks_exact(3)
			.map(DVec3::from_slice)
			.collect()
	});
	let raw = node
		.child_array(n::POINTS_INDEX)
		.map(|array| array.as_i32().into_owned())
		.unwrap_or_else(|| (0..control_points.len() as i32).collect());

	let mut point_indices = Vec::with_capacity(raw.len());
	let mut segments = Vec::new();
	let mut begin = 0_u32;
	for &index in &raw {
		// A negative index ends the current segment.
		let (index, end) = if index < 0 { (!index, true) } else { (index, false) };
		point_indices.push(index as u32);
		if end {
			let len = point_indices.len() as u32;
			segments.push(LineSegment {
				index_begin: begin,
				num_indices: len - begin,
			});
			begin = len;
		}
	}
	if (begin as usize) < point_indices.len() {
		segments.push(LineSegment {
			index_begin: begin,
			num_indices: point_indices.len() as u32 - begin,
		});
	}

	let color = node.child(n::COLOR).map_or(DVec3::ONE, |color| {
		DVec3::new(
			color.value_f64(0).unwrap_or(1.0),
			color.value_f64(1).unwrap_or(1.0),
			color.value_f64(2).unwrap_or(1.0),
		)
	});
	LineCurve {
		color,
		control_points,
		point_indices,
		segments,
		from_tessellated_nurbs: false,
	}
}

fn read_skin(node: &FbxNode, skinning_method: SkinningMethod) -> SkinDeformer {
	let dq_vertices: Vec<u32> = node
		.child_array(n::INDEXES)
		.map(|array| array.as_i32().iter().filter_map(|&index| u32::try_from(index).ok()).collect())
		.unwrap_or_default();
	let mut dq_weights: Vec<f64> = node
		.child_array(n::BLEND_WEIGHTS)
		.map(|array| array.as_f64().into_owned())
		.unwrap_or_default();
	dq_weights.resize(dq_vertices.len(), 0.0);
	SkinDeformer {
		skinning_method,
		dq_vertices,
		dq_weights,
		..SkinDeformer::default()
	}
}

fn read_cluster(node: &FbxNode) -> SkinCluster {
	let indices = node.child_array(n::INDEXES).map(|array| array.as_i32().into_owned()).unwrap_or_default();
	let weights = node.child_array(n::WEIGHTS).map(|array| array.as_f64().into_owned()).unwrap_or_default();
	let mut cluster = SkinCluster::default();
	for (&index, &weight) in indices.iter().zip(&weights) {
		if let Ok(index) = u32::try_from(index) {
			cluster.vertices.push(index);
			cluster.weights.push(weight);
		}
	}
	if let Some(transform) = read_matrix(node, n::TRANSFORM) {
		cluster.transform = transform;
	}
	if let Some(link) = read_matrix(node, n::TRANSFORM_LINK) {
		cluster.transform_link = link;
	}
	// `Transform` maps mesh space to bone space at bind time.
	cluster.geometry_to_bone = cluster.transform;
	cluster.bind_to_world = cluster.transform_link;
	cluster
}

fn read_blend_channel(node: &FbxNode, props: &Props) -> BlendChannel {
	let full_weights = node
		.child_array(n::FULL_WEIGHTS)
		.map(|array| array.as_f64().into_owned())
		.unwrap_or_default();
	BlendChannel {
		weight: props.real("DeformPercent", node.child_f64(n::DEFORM_PERCENT).unwrap_or(0.0)) / 100.0,
		full_weights,
		..BlendChannel::default()
	}
}

fn read_cache_file(props: &Props) -> CacheFile {
	let filename = props.str("CacheFileName");
	let absolute = props.str("CacheAbsoluteFileName");
	let extension = std::path::Path::new(if filename.is_empty() { absolute.as_ref() } else { filename.as_ref() })
		.extension()
		.and_then(|extension| extension.to_str())
		.map(str::to_ascii_lowercase);
	let format = match extension.as_deref() {
		Some("pc2") => CacheFileFormat::Pc2,
		Some("mc" | "mcx" | "xml") => CacheFileFormat::Mc,
		_ => match props.int("CacheFileType", -1) {
			0 => CacheFileFormat::Mc,
			1 => CacheFileFormat::Pc2,
			_ => CacheFileFormat::Unknown,
		},
	};
	CacheFile {
		relative_filename: Arc::clone(&filename),
		filename,
		absolute_filename: absolute,
		format,
		external_cache: None,
	}
}

fn shader_type_of(render_api: &str) -> ShaderType {
	match render_api {
		"ARNOLD_SHADER_ID" => ShaderType::ArnoldStandardSurface,
		"SFX_PBS_SHADER" => ShaderType::ShaderfxGraph,
		_ => ShaderType::Unknown,
	}
}

fn ktime_prop(props: &Props, name: &str) -> Option<f64> {
	props.find(name).map(|prop| prop.value_int as f64 / KTIME_SECOND as f64)
}

fn read_anim_stack(props: &Props) -> AnimStack {
	let time_begin = ktime_prop(props, "LocalStart").or_else(|| ktime_prop(props, "ReferenceStart"));
	let time_end = ktime_prop(props, "LocalStop").or_else(|| ktime_prop(props, "ReferenceStop"));
	AnimStack {
		time_begin: time_begin.unwrap_or(0.0),
		time_end: time_end.unwrap_or(0.0),
		..AnimStack::default()
	}
}

fn read_anim_layer(props: &Props) -> AnimLayer {
	let blend_mode = props.int("BlendMode", 0);
	AnimLayer {
		weight: props.real("Weight", 100.0) / 100.0,
		additive: blend_mode == 0,
		blended: blend_mode == 2,
		compose_rotation: props.int("RotationAccumulationMode", 0) == 0,
		compose_scale: props.int("ScaleAccumulationMode", 0) == 0,
		..AnimLayer::default()
	}
}

/// Defaults come from `d|X`, `d|Y`, `d|Z`; any other `d|` property is a scalar.
fn read_anim_value(props: &Props) -> AnimValue {
	let mut value = AnimValue::default();
	for prop in props.iter() {
		let Some(component) = prop.name.strip_prefix("d|") else {
			continue;
		};
		match component {
			"X" => value.default_value.x = prop.real_value(),
			"Y" => value.default_value.y = prop.real_value(),
			"Z" => value.default_value.z = prop.real_value(),
			_ => value.default_value.x = prop.real_value(),
		}
	}
	value
}

fn read_selection_node(node: &FbxNode) -> SelectionNode {
	let indices = |name: Symbol| -> Vec<u32> {
		node.child_array(name)
			.map(|array| array.as_i32().iter().filter_map(|&index| u32::try_from(index).ok()).collect())
			.unwrap_or_default()
	};
	SelectionNode {
		include_node: node.child_i64(n::IS_THE_NODE_IN_SET).is_some_and(|flag| flag != 0),
		vertices: indices(n::VERTEX_INDEX_ARRAY),
		edges: indices(n::EDGE_INDEX_ARRAY),
		faces: indices(n::POLYGON_INDEX_ARRAY),
		..SelectionNode::default()
	}
}
