use std::path::PathBuf;

use fbxdoc::fbx::{Prop, PropFlags, Props, Result, evaluate_props};

use crate::cmd::util::{emit_json, load_scene, resolve_element};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Element name, or `#<id>` for an element index.
	pub element: String,
	/// Evaluate animated properties of the default animation at this time in seconds.
	#[arg(long)]
	pub time: Option<f64>,
	/// Include template defaults the element does not override.
	#[arg(long)]
	pub defaults: bool,
	#[arg(long)]
	pub json: bool,
}

/// Print the properties of one element.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		element,
		time,
		defaults,
		json,
	} = args;

	let scene = load_scene(&path, false)?;
	let element = resolve_element(&scene, &element)?;
	let props = match time {
		Some(time) => evaluate_props(&scene, &scene.anim, element.element_id, time),
		None => element.props.clone(),
	};

	let mut rows: Vec<PropJson> = props.iter().map(|prop| prop_json(prop, false)).collect();
	if defaults && let Some(template) = props.defaults.as_deref() {
		rows.extend(template_only(template, &props).map(|prop| prop_json(prop, true)));
	}

	if json {
		emit_json(&PropsJson {
			element: element.name.to_string(),
			element_type: element.element_type.as_str(),
			time,
			props: rows,
		});
		return Ok(());
	}

	println!("{} [{}]", element.name, element.element_type.as_str());
	for row in rows {
		let marker = if row.from_template { " (default)" } else { "" };
		println!("  {} <{}> [{}] = {}{marker}", row.name, row.prop_type, row.flags.join("|"), row.value);
	}
	Ok(())
}

fn template_only<'a>(template: &'a Props, own: &'a Props) -> impl Iterator<Item = &'a Prop> {
	template.iter().filter(move |prop| own.find_own(&prop.name).is_none())
}

fn prop_json(prop: &Prop, from_template: bool) -> PropJson {
	PropJson {
		name: prop.name.to_string(),
		prop_type: prop.prop_type.as_str(),
		flags: prop
			.flags
			.iter_names()
			.filter(|(name, _)| !name.starts_with("VALUE_"))
			.map(|(name, _)| name.to_ascii_lowercase())
			.collect(),
		value: value_json(prop),
		from_template,
	}
}

fn value_json(prop: &Prop) -> serde_json::Value {
	let flags = prop.flags;
	let real = prop.value_real.to_array();
	if flags.contains(PropFlags::VALUE_STR) && !prop.value_str.is_empty() {
		serde_json::Value::from(prop.value_str.as_ref())
	} else if flags.contains(PropFlags::VALUE_VEC4) {
		serde_json::Value::from(real.to_vec())
	} else if flags.contains(PropFlags::VALUE_VEC3) {
		serde_json::Value::from(real[..3].to_vec())
	} else if flags.contains(PropFlags::VALUE_VEC2) {
		serde_json::Value::from(real[..2].to_vec())
	} else if flags.contains(PropFlags::VALUE_INT) {
		serde_json::Value::from(prop.value_int)
	} else if flags.contains(PropFlags::VALUE_REAL) {
		serde_json::Value::from(real[0])
	} else if let Some(blob) = &prop.value_blob {
		serde_json::json!({ "blob_len": blob.len() })
	} else {
		serde_json::Value::Null
	}
}

#[derive(serde::Serialize)]
struct PropsJson {
	element: String,
	element_type: &'static str,
	time: Option<f64>,
	props: Vec<PropJson>,
}

#[derive(serde::Serialize)]
struct PropJson {
	name: String,
	prop_type: &'static str,
	flags: Vec<String>,
	value: serde_json::Value,
	from_template: bool,
}

#[cfg(test)]
mod tests {
	use crate::cmd::test_support::{run_fbxdoc_json, scene_file};

	fn prop<'a>(json: &'a serde_json::Value, name: &str) -> &'a serde_json::Value {
		json["props"]
			.as_array()
			.and_then(|props| props.iter().find(|prop| prop["name"] == name))
			.unwrap_or_else(|| panic!("prop {name} listed"))
	}

	#[test]
	fn props_lists_own_values() {
		let path = scene_file("props.fbx");
		let json = run_fbxdoc_json(&["props", &path, "Paint", "--json"]);

		assert_eq!(json["element_type"], "material");
		let diffuse = prop(&json, "DiffuseColor");
		assert_eq!(diffuse["value"], serde_json::json!([1.0, 0.0, 0.0]));
		assert_eq!(diffuse["from_template"], false);
	}

	#[test]
	fn props_applies_animation_at_time() {
		let path = scene_file("props_time.fbx");
		let json = run_fbxdoc_json(&["props", &path, "Cube", "--time", "0.5", "--json"]);

		let translation = prop(&json, "Lcl Translation");
		let x = translation["value"][0].as_f64().expect("x");
		assert!((x - 5.0).abs() < 1e-6, "x = {x}");
		assert!(
			translation["flags"]
				.as_array()
				.is_some_and(|flags| flags.iter().any(|flag| flag == "animated"))
		);
	}
}
