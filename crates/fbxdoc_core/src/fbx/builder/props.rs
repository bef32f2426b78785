use glam::DVec4;

use crate::fbx::builder::SceneBuilder;
use crate::fbx::names as n;
use crate::fbx::{FbxNode, FbxValue, KTIME_SECOND, Prop, PropFlags, PropType, Props};

impl SceneBuilder<'_, '_> {
	/// Properties of `node` from its `Properties70` or `Properties60` child.
	pub(super) fn read_props(&self, node: &FbxNode) -> Props {
		let Some(container) = node.child(n::PROPERTIES70).or_else(|| node.child(n::PROPERTIES60)) else {
			return Props::default();
		};
		let props = container
			.children
			.iter()
			.filter_map(|record| match record.name {
				n::P => self.read_prop(record, false),
				n::PROPERTY => self.read_prop(record, true),
				_ => None,
			})
			.collect();
		Props::from_unsorted(props)
	}

	/// `P: name, type, label, flags, values...` or legacy `Property: name, type, flags, values...`.
	fn read_prop(&self, record: &FbxNode, legacy: bool) -> Option<Prop> {
		let pool = self.parser.pool();
		let text = |index: usize| record.value_str(index).map_or("", |symbol| pool.get(symbol));

		let mut prop = Prop::new(pool.arc(record.value_str(0)?));
		let (label, flags, first_value) = if legacy { ("", text(2), 3) } else { (text(2), text(3), 4) };
		prop.prop_type = match PropType::from_type_name(text(1)) {
			PropType::Unknown => PropType::from_type_name(label),
			known => known,
		};
		prop.flags = PropFlags::parse(flags);

		let mut components = [0.0; 4];
		let mut count = 0;
		for value in record.values.iter().skip(first_value) {
			match value {
				FbxValue::Number { f, i } => {
					if count == 0 {
						prop.value_int = *i;
					}
					if let Some(slot) = components.get_mut(count) {
						*slot = *f;
					}
					count += 1;
				}
				FbxValue::Str(symbol) => {
					prop.value_str = pool.arc(*symbol);
					prop.flags |= PropFlags::VALUE_STR;
				}
				FbxValue::Blob(bytes) => {
					prop.value_blob = Some(bytes.clone());
					prop.flags |= PropFlags::VALUE_BLOB;
				}
			}
		}
		prop.value_real = DVec4::from_array(components);
		prop.flags |= match count {
			0 if prop.flags.intersects(PropFlags::VALUE_STR | PropFlags::VALUE_BLOB) => PropFlags::empty(),
			0 => PropFlags::NO_VALUE,
			1 => PropFlags::VALUE_REAL,
			2 => PropFlags::VALUE_VEC2,
			3 => PropFlags::VALUE_VEC3,
			_ => PropFlags::VALUE_VEC4,
		};
		match prop.prop_type {
			PropType::Integer | PropType::Boolean => prop.flags |= PropFlags::VALUE_INT,
			PropType::Time => {
				prop.flags |= PropFlags::VALUE_INT;
				prop.value_real.x = prop.value_int as f64 / KTIME_SECOND as f64;
			}
			_ => {}
		}
		Some(prop)
	}
}
