use std::sync::Arc;

use glam::DVec3;

use crate::fbx::{Prop, PropFlags, PropType, Props, cmp_prop_names, prop_name_key};

#[test]
fn type_aliases_resolve_to_one_variant() {
	for name in ["bool", "Bool", "Boolean"] {
		assert_eq!(PropType::from_type_name(name), PropType::Boolean, "{name}");
	}
	assert_eq!(PropType::from_type_name("Lcl Translation"), PropType::Translation);
	assert_eq!(PropType::from_type_name("ColorRGB"), PropType::Color);
	assert_eq!(PropType::from_type_name("NoSuchType"), PropType::Unknown);
}

#[test]
fn flag_string_parsing() {
	let flags = PropFlags::parse("A+UH");
	assert!(flags.contains(PropFlags::ANIMATABLE | PropFlags::USER_DEFINED | PropFlags::HIDDEN));

	let lock = PropFlags::parse("L3");
	assert_eq!(lock, PropFlags::LOCK_X | PropFlags::LOCK_Y);
	assert_eq!(
		PropFlags::parse("M"),
		PropFlags::MUTE_X | PropFlags::MUTE_Y | PropFlags::MUTE_Z | PropFlags::MUTE_W
	);
}

#[test]
fn packed_key_orders_before_full_compare() {
	assert_eq!(prop_name_key("Lcl Translation"), u32::from_be_bytes(*b"Lcl "));
	assert_eq!(prop_name_key("ab"), u32::from_be_bytes([b'a', b'b', 0, 0]));
	assert!(cmp_prop_names("Lcl Rotation", "Lcl Scaling").is_lt());
	assert!(cmp_prop_names("ab", "abc").is_lt());
}

#[test]
fn duplicates_keep_last_entry() {
	let props = Props::from_unsorted(vec![
		Prop::real("Intensity", 1.0),
		Prop::vec3("Color", DVec3::ONE),
		Prop::real("Intensity", 2.0),
		Prop::int("CastShadows", 1),
	]);
	assert_eq!(props.len(), 3);
	assert_eq!(props.real("Intensity", 0.0), 2.0);
	let names: Vec<&str> = props.iter().map(|prop| &*prop.name).collect();
	let mut sorted = names.clone();
	sorted.sort_by(|a, b| cmp_prop_names(a, b));
	assert_eq!(names, sorted);
}

#[test]
fn lookup_falls_through_to_defaults() {
	let defaults = Arc::new(Props::from_unsorted(vec![
		Prop::real("Intensity", 100.0),
		Prop::string("Name", "template"),
	]));
	let mut props = Props::from_unsorted(vec![Prop::real("Intensity", 5.0)]);
	props.defaults = Some(defaults);

	assert_eq!(props.real("Intensity", 0.0), 5.0);
	assert_eq!(&*props.str("Name"), "template");
	assert!(props.find_own("Name").is_none());
	assert_eq!(props.real("Missing", 7.0), 7.0);

	props.insert(Prop::real("Decay", 2.0));
	assert_eq!(props.len(), 2);
	assert_eq!(props.real("Decay", 0.0), 2.0);
}
