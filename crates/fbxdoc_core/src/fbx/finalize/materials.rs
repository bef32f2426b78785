use std::path::Path;
use std::sync::Arc;

use glam::DVec3;

use crate::fbx::{
	ElementType, Exporter, MaterialMap, MaterialMapKind, MaterialTexture, Props, Scene, ShaderPropBinding,
	ShaderType, TextureLayer, WrapMode,
};

/// Property prefixes of exporter-specific material models.
const PREFIXED_MODELS: &[(&str, ShaderType)] = &[
	("3dsMax|Parameters|", ShaderType::ThreeDsMaxPhysicalMaterial),
	("3dsMax|gltf|", ShaderType::GltfMaterial),
	("3dsMax|main|", ShaderType::ThreeDsMaxPbrMetalRough),
];

/// Join `relative` onto the scene directory unless `filename` is already absolute.
pub(super) fn resolve_path(relative_root: &str, filename: &str, relative: &str) -> Arc<str> {
	if is_absolute(filename) {
		return Arc::from(filename);
	}
	let relative = if relative.is_empty() { filename } else { relative };
	if relative.is_empty() || relative_root.is_empty() {
		return Arc::from(relative);
	}
	let normalized = relative.replace('\\', "/");
	Arc::from(Path::new(relative_root).join(normalized).display().to_string())
}

fn is_absolute(path: &str) -> bool {
	let bytes = path.as_bytes();
	// Windows drive letters are absolute regardless of the host.
	let drive = bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && matches!(bytes[2], b'/' | b'\\');
	drive || path.starts_with('/') || path.starts_with('\\')
}

/// Shader bindings, material textures, shading model detection and channels.
pub(super) fn link_materials(scene: &mut Scene) {
	let mut shader_links = Vec::new();
	for &shader in scene.ids_of(ElementType::Shader) {
		shader_links.push((shader, scene.sources_of(shader, ElementType::ShaderBinding).collect::<Vec<_>>()));
	}
	for (shader, bindings) in shader_links {
		if let Some(data) = scene.elements[shader].as_shader_mut() {
			data.bindings = bindings;
		}
	}

	let exporter = scene.metadata.exporter;
	let mut links = Vec::new();
	for &id in scene.ids_of(ElementType::Material) {
		let Some(element) = scene.element(id) else {
			continue;
		};
		let shader = scene.sources_of(id, ElementType::Shader).next();
		let bindings: Vec<&ShaderPropBinding> = shader
			.and_then(|shader| scene.element(shader)?.as_shader())
			.into_iter()
			.flat_map(|shader| shader.bindings.iter())
			.filter_map(|&binding| scene.element(binding)?.as_shader_binding())
			.flat_map(|binding| binding.prop_bindings.iter())
			.collect();

		let textures: Vec<MaterialTexture> = scene
			.connections_dst_of(id, None)
			.iter()
			.filter(|conn| !conn.dst_prop.is_empty())
			.filter(|conn| {
				scene
					.element(conn.src)
					.is_some_and(|element| element.element_type == ElementType::Texture)
			})
			.map(|conn| MaterialTexture {
				material_prop: Arc::clone(&conn.dst_prop),
				shader_prop: bindings
					.iter()
					.find(|binding| binding.material_prop == conn.dst_prop)
					.map_or_else(|| Arc::clone(&conn.dst_prop), |binding| Arc::clone(&binding.shader_prop)),
				texture: conn.src,
			})
			.collect();

		let shading_model = element.as_material().map_or("", |material| material.shading_model_name.as_ref());
		let shader_type_of_shader = shader
			.and_then(|shader| scene.element(shader)?.as_shader())
			.map_or(ShaderType::Unknown, |shader| shader.shader_type);
		let (shader_type, prefix) = detect_shader(&element.props, shading_model, shader_type_of_shader, exporter);
		let maps = MaterialMapKind::ALL
			.iter()
			.map(|kind| {
				let prop = element.props.find(kind.prop_name());
				MaterialMap {
					value: prop.map_or(glam::DVec4::ZERO, |prop| prop.value_real),
					texture: textures
						.iter()
						.find(|texture| texture.material_prop.as_ref() == kind.prop_name())
						.map(|texture| texture.texture),
					has_value: prop.is_some(),
				}
			})
			.collect();
		links.push((id, shader, shader_type, prefix, maps, textures));
	}

	for (id, shader, shader_type, prefix, maps, textures) in links {
		if let Some(material) = scene.elements[id].as_material_mut() {
			material.shader = shader;
			material.shader_type = shader_type;
			material.shader_prop_prefix = Arc::from(prefix);
			material.maps = maps;
			material.textures = textures;
		}
	}
}

fn detect_shader(
	props: &Props,
	shading_model: &str,
	from_shader: ShaderType,
	exporter: Exporter,
) -> (ShaderType, &'static str) {
	if from_shader != ShaderType::Unknown {
		return (from_shader, "");
	}
	for &(prefix, shader_type) in PREFIXED_MODELS {
		if props.iter().any(|prop| prop.name.starts_with(prefix)) {
			let shader_type = if shader_type == ShaderType::ThreeDsMaxPbrMetalRough
				&& props.find_own("3dsMax|main|glossiness").is_some()
			{
				ShaderType::ThreeDsMaxPbrSpecGloss
			} else {
				shader_type
			};
			return (shader_type, prefix);
		}
	}
	let shader_type = match shading_model.to_ascii_lowercase().as_str() {
		"lambert" => ShaderType::FbxLambert,
		"phong" if matches!(exporter, Exporter::BlenderBinary | Exporter::BlenderAscii) => ShaderType::BlenderPhong,
		"phong" => ShaderType::FbxPhong,
		_ => ShaderType::Unknown,
	};
	(shader_type, "")
}

/// Videos, layers, resolved paths and UV parameters of textures.
pub(super) fn link_textures(scene: &mut Scene) {
	let relative_root = Arc::clone(&scene.metadata.relative_root);
	let videos = scene.ids_of(ElementType::Video).to_vec();
	for id in videos {
		if let Some(video) = scene.elements[id].as_video_mut() {
			video.absolute_filename = resolve_path(&relative_root, &video.filename, &video.relative_filename);
		}
	}

	let mut links = Vec::new();
	for &id in scene.ids_of(ElementType::Texture) {
		let video = scene.sources_of(id, ElementType::Video).next();
		let video_data = video
			.and_then(|video| scene.element(video)?.as_video())
			.map(|video| (Arc::clone(&video.filename), Arc::clone(&video.relative_filename), video.content.clone()));
		let layers: Vec<usize> = scene.sources_of(id, ElementType::Texture).collect();
		links.push((id, video, video_data, layers));
	}

	for (id, video, video_data, layer_textures) in links {
		let element = &mut scene.elements[id];
		let uv_set = element.props.str("UVSet");
		let wrap_u = WrapMode::from_i64(element.props.int("WrapModeU", 0));
		let wrap_v = WrapMode::from_i64(element.props.int("WrapModeV", 0));
		let uv_translation = element.props.vec3("Translation", DVec3::ZERO);
		let uv_rotation = element.props.vec3("Rotation", DVec3::ZERO);
		let uv_scale = element.props.vec3("Scaling", DVec3::ONE);
		let Some(texture) = element.as_texture_mut() else {
			continue;
		};
		texture.video = video;
		if let Some((filename, relative, content)) = video_data {
			if texture.filename.is_empty() {
				texture.filename = filename;
			}
			if texture.relative_filename.is_empty() {
				texture.relative_filename = relative;
			}
			if texture.content.is_none() {
				texture.content = content;
			}
		}
		texture.absolute_filename = resolve_path(&relative_root, &texture.filename, &texture.relative_filename);
		texture.uv_set = uv_set;
		texture.wrap_u = wrap_u;
		texture.wrap_v = wrap_v;
		texture.uv_translation = uv_translation;
		texture.uv_rotation = uv_rotation;
		texture.uv_scale = uv_scale;

		if !layer_textures.is_empty() {
			texture.layers.resize(
				layer_textures.len(),
				TextureLayer {
					texture: usize::MAX,
					blend_mode: 0,
					alpha: 1.0,
				},
			);
			for (layer, source) in texture.layers.iter_mut().zip(layer_textures) {
				layer.texture = source;
			}
		}
		texture.layers.retain(|layer| layer.texture != usize::MAX);
	}
}
