use std::sync::Arc;

use crate::fbx::builder::{SceneBuilder, Template};
use crate::fbx::math::{Axis, CoordinateAxes, round_to_nice};
use crate::fbx::names as n;
use crate::fbx::{Application, Exporter, FbxId, FbxNode, Props, Result, SceneSettings, Symbol, frames_per_second};

impl SceneBuilder<'_, '_> {
	/// Top-level sections other than `Objects`, `Connections` and `Takes`.
	pub(super) fn read_section(&mut self, node: &FbxNode) -> Result<()> {
		match node.name {
			n::FBX_HEADER_EXTENSION => self.read_header_extension(node),
			n::CREATOR => {
				self.set_creator(node.value_str(0));
				Ok(())
			}
			n::GLOBAL_SETTINGS => {
				self.read_global_settings(node);
				Ok(())
			}
			n::DOCUMENTS => self.read_documents(node),
			n::DEFINITIONS => {
				self.read_definitions(node);
				Ok(())
			}
			n::VERSION5 => {
				log::trace!("skipping Version5 section");
				Ok(())
			}
			_ => {
				log::trace!("skipping top-level node {}", self.parser.pool().get(node.name));
				Ok(())
			}
		}
	}

	fn read_header_extension(&mut self, node: &FbxNode) -> Result<()> {
		if let Some(version) = node.child_i64(n::FBX_VERSION)
			&& self.version == 0
		{
			self.version = u32::try_from(version).unwrap_or(0);
		}
		if let Some(creator) = node.child(n::CREATOR) {
			self.set_creator(creator.value_str(0));
		}
		if let Some(scene_info) = node.child(n::SCENE_INFO) {
			let props = self.read_props(scene_info);
			self.metadata.original_application = application(&props, "Original");
			self.metadata.latest_application = application(&props, "LastSaved");
			self.metadata.scene_props = props;
		}
		Ok(())
	}

	fn set_creator(&mut self, creator: Option<Symbol>) {
		let Some(creator) = creator else {
			return;
		};
		let creator = self.parser.pool().arc(creator);
		let (exporter, version) = Exporter::detect(&creator);
		self.metadata.exporter = exporter;
		self.metadata.exporter_version = version;
		self.metadata.creator = creator;
	}

	/// `GlobalSettings`, top-level in 7.x and inside `Objects` before.
	pub(super) fn read_global_settings(&mut self, node: &FbxNode) {
		let props = self.read_props(node);
		self.settings = settings_from_props(props);
	}

	fn read_documents(&mut self, node: &FbxNode) -> Result<()> {
		for document in node.children_named(n::DOCUMENT) {
			let props = self.read_props(document);
			let active = props.str("ActiveAnimStackName");
			if !active.is_empty() {
				self.metadata.active_anim_stack = active;
			}
			let Some(root) = document.child_i64(n::ROOT_NODE) else {
				continue;
			};
			if root != 0 {
				self.register_id(FbxId::Explicit(root as u64), 0)?;
			}
		}
		Ok(())
	}

	fn read_definitions(&mut self, node: &FbxNode) {
		for object_type in node.children_named(n::OBJECT_TYPE) {
			let Some(type_symbol) = object_type.value_str(0) else {
				continue;
			};
			let type_name = self.parser.pool().arc(type_symbol);
			for template in object_type.children_named(n::PROPERTY_TEMPLATE) {
				let class = template.value_str(0).map_or("", |symbol| self.parser.pool().get(symbol));
				let class = Arc::from(class.strip_prefix("Fbx").unwrap_or(class));
				let props = self.read_props(template);
				log::trace!("template {type_name}/{class} with {} props", props.len());
				self.templates.push(Template {
					object_type: Arc::clone(&type_name),
					class,
					props: Arc::new(props),
				});
			}
		}
	}
}

fn application(props: &Props, prefix: &str) -> Application {
	Application {
		vendor: props.str(&format!("{prefix}|ApplicationVendor")),
		name: props.str(&format!("{prefix}|ApplicationName")),
		version: props.str(&format!("{prefix}|ApplicationVersion")),
	}
}

/// Decode axes, units and frame rate from `GlobalSettings` properties.
pub(crate) fn settings_from_props(props: Props) -> SceneSettings {
	let axis = |index: &str, sign: &str, default: i64| {
		Axis::from_index_sign(props.int(index, default), props.int(sign, 1))
	};
	let defaults = CoordinateAxes::default();
	let axes = CoordinateAxes {
		right: axis("CoordAxis", "CoordAxisSign", 0).unwrap_or(defaults.right),
		up: axis("UpAxis", "UpAxisSign", 1).unwrap_or(defaults.up),
		front: axis("FrontAxis", "FrontAxisSign", 2).unwrap_or(defaults.front),
	};
	let axes = if axes.is_valid() {
		axes
	} else {
		log::debug!("ignoring degenerate scene axes");
		defaults
	};

	let unit_meters = round_to_nice(props.real("UnitScaleFactor", 1.0) * 0.01);
	let original_unit_meters = round_to_nice(props.real("OriginalUnitScaleFactor", unit_meters * 100.0) * 0.01);
	let time_mode = props.int("TimeMode", 0);
	SceneSettings {
		axes,
		unit_meters,
		frames_per_second: frames_per_second(time_mode, props.real("CustomFrameRate", -1.0)),
		ambient_color: props.vec3("AmbientColor", glam::DVec3::ZERO),
		default_camera: props.str("DefaultCamera"),
		time_mode,
		original_axis_up: axes.up,
		original_unit_meters,
		props,
	}
}
