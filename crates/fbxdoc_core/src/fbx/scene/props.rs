use std::cmp::Ordering;
use std::sync::Arc;

use bitflags::bitflags;
use glam::{DVec2, DVec3, DVec4};

/// Declared property data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropType {
	/// Unrecognized type name.
	#[default]
	Unknown,
	/// `bool`
	Boolean,
	/// `int`, `enum`
	Integer,
	/// `double`, `Number`
	Number,
	/// `Vector3D`
	Vector,
	/// `ColorRGB`
	Color,
	/// `ColorAndAlpha`
	ColorWithAlpha,
	/// `KString`
	String,
	/// `DateTime`
	DateTime,
	/// `Lcl Translation`
	Translation,
	/// `Lcl Rotation`
	Rotation,
	/// `Lcl Scaling`
	Scaling,
	/// `Distance`
	Distance,
	/// `Compound`
	Compound,
	/// `Blob`
	Blob,
	/// `object`, `Reference`
	Reference,
	/// `KTime`
	Time,
}

/// Type name aliases, byte-sorted.
const PROP_TYPES: &[(&str, PropType)] = &[
	("Blob", PropType::Blob),
	("Bool", PropType::Boolean),
	("Boolean", PropType::Boolean),
	("Color", PropType::Color),
	("ColorAndAlpha", PropType::ColorWithAlpha),
	("ColorRGB", PropType::Color),
	("Compound", PropType::Compound),
	("DateTime", PropType::DateTime),
	("Distance", PropType::Distance),
	("Double", PropType::Number),
	("Enum", PropType::Integer),
	("FieldOfView", PropType::Number),
	("FieldOfViewX", PropType::Number),
	("FieldOfViewY", PropType::Number),
	("Float", PropType::Number),
	("Int", PropType::Integer),
	("Integer", PropType::Integer),
	("KString", PropType::String),
	("KTime", PropType::Time),
	("Lcl Rotation", PropType::Rotation),
	("Lcl Scaling", PropType::Scaling),
	("Lcl Translation", PropType::Translation),
	("Number", PropType::Number),
	("Real", PropType::Number),
	("Reference", PropType::Reference),
	("Roll", PropType::Number),
	("String", PropType::String),
	("Time", PropType::Time),
	("ULongLong", PropType::Integer),
	("Vector", PropType::Vector),
	("Vector3D", PropType::Vector),
	("Visibility", PropType::Number),
	("Visibility Inheritance", PropType::Boolean),
	("bool", PropType::Boolean),
	("charptr", PropType::String),
	("double", PropType::Number),
	("enum", PropType::Integer),
	("float", PropType::Number),
	("int", PropType::Integer),
	("object", PropType::Reference),
];

impl PropType {
	/// Resolve a type name through the alias table.
	pub fn from_type_name(name: &str) -> Self {
		PROP_TYPES
			.binary_search_by(|(alias, _)| alias.as_bytes().cmp(name.as_bytes()))
			.map_or(Self::Unknown, |index| PROP_TYPES[index].1)
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Unknown => "unknown",
			Self::Boolean => "boolean",
			Self::Integer => "integer",
			Self::Number => "number",
			Self::Vector => "vector",
			Self::Color => "color",
			Self::ColorWithAlpha => "color_with_alpha",
			Self::String => "string",
			Self::DateTime => "date_time",
			Self::Translation => "translation",
			Self::Rotation => "rotation",
			Self::Scaling => "scaling",
			Self::Distance => "distance",
			Self::Compound => "compound",
			Self::Blob => "blob",
			Self::Reference => "reference",
			Self::Time => "time",
		}
	}
}

bitflags! {
	/// Property state and value layout bits.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct PropFlags: u32 {
		/// `A` flag.
		const ANIMATABLE = 1 << 0;
		/// `U` flag.
		const USER_DEFINED = 1 << 1;
		/// `H` flag.
		const HIDDEN = 1 << 2;
		/// Locked X component.
		const LOCK_X = 1 << 4;
		/// Locked Y component.
		const LOCK_Y = 1 << 5;
		/// Locked Z component.
		const LOCK_Z = 1 << 6;
		/// Locked W component.
		const LOCK_W = 1 << 7;
		/// Muted X component.
		const MUTE_X = 1 << 8;
		/// Muted Y component.
		const MUTE_Y = 1 << 9;
		/// Muted Z component.
		const MUTE_Z = 1 << 10;
		/// Muted W component.
		const MUTE_W = 1 << 11;
		/// Created by the loader, absent from the file.
		const SYNTHETIC = 1 << 12;
		/// Driven by an animation layer.
		const ANIMATED = 1 << 13;
		/// Lookup miss placeholder.
		const NOT_FOUND = 1 << 14;
		/// Target of a property connection.
		const CONNECTED = 1 << 15;
		/// Declared without a value.
		const NO_VALUE = 1 << 16;
		/// Replaced by a property override.
		const OVERRIDDEN = 1 << 17;
		/// One numeric component.
		const VALUE_REAL = 1 << 20;
		/// Two numeric components.
		const VALUE_VEC2 = 1 << 21;
		/// Three numeric components.
		const VALUE_VEC3 = 1 << 22;
		/// Four numeric components.
		const VALUE_VEC4 = 1 << 23;
		/// Integer value.
		const VALUE_INT = 1 << 24;
		/// String value.
		const VALUE_STR = 1 << 25;
		/// Blob value.
		const VALUE_BLOB = 1 << 26;
	}
}

impl PropFlags {
	/// Parse an FBX flag string such as `A+UL7`.
	pub fn parse(text: &str) -> Self {
		let mut flags = Self::empty();
		let mut chars = text.chars().peekable();
		while let Some(ch) = chars.next() {
			match ch {
				'A' => flags |= Self::ANIMATABLE,
				'U' => flags |= Self::USER_DEFINED,
				'H' => flags |= Self::HIDDEN,
				'L' | 'M' => {
					let mask = match chars.peek().and_then(|next| next.to_digit(16)) {
						Some(digit) => {
							chars.next();
							digit
						}
						None => 0xf,
					};
					let shift = if ch == 'L' { 4 } else { 8 };
					flags |= Self::from_bits_truncate((mask & 0xf) << shift);
				}
				_ => {}
			}
		}
		flags
	}
}

/// Big-endian packing of the first four name bytes, the primary sort key.
pub fn prop_name_key(name: &str) -> u32 {
	let mut key = [0_u8; 4];
	for (dst, src) in key.iter_mut().zip(name.as_bytes()) {
		*dst = *src;
	}
	u32::from_be_bytes(key)
}

/// Property ordering: packed key, then full bytes.
pub fn cmp_prop_names(a: &str, b: &str) -> Ordering {
	prop_name_key(a)
		.cmp(&prop_name_key(b))
		.then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

/// One named, typed property value.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
	/// Property name.
	pub name: Arc<str>,
	/// Cached [`prop_name_key`] of `name`.
	pub name_key: u32,
	/// Declared type.
	pub prop_type: PropType,
	/// State and value layout bits.
	pub flags: PropFlags,
	/// String value, empty when absent.
	pub value_str: Arc<str>,
	/// Blob value.
	pub value_blob: Option<Arc<[u8]>>,
	/// Integer value, truncated from the first component for numbers.
	pub value_int: i64,
	/// Numeric components.
	pub value_real: DVec4,
}

impl Prop {
	/// Empty property with only a name.
	pub fn new(name: Arc<str>) -> Self {
		Self {
			name_key: prop_name_key(&name),
			name,
			prop_type: PropType::Unknown,
			flags: PropFlags::empty(),
			value_str: Arc::from(""),
			value_blob: None,
			value_int: 0,
			value_real: DVec4::ZERO,
		}
	}

	/// Numeric property with one component.
	pub fn real(name: &str, value: f64) -> Self {
		let mut prop = Self::new(Arc::from(name));
		prop.prop_type = PropType::Number;
		prop.flags = PropFlags::VALUE_REAL;
		prop.value_real = DVec4::new(value, 0.0, 0.0, 0.0);
		prop.value_int = value as i64;
		prop
	}

	/// Numeric property with three components.
	pub fn vec3(name: &str, value: DVec3) -> Self {
		let mut prop = Self::real(name, value.x);
		prop.prop_type = PropType::Vector;
		prop.flags = PropFlags::VALUE_VEC3;
		prop.value_real = value.extend(0.0);
		prop
	}

	/// Integer property.
	pub fn int(name: &str, value: i64) -> Self {
		let mut prop = Self::real(name, value as f64);
		prop.prop_type = PropType::Integer;
		prop.flags = PropFlags::VALUE_INT;
		prop.value_int = value;
		prop
	}

	/// String property.
	pub fn string(name: &str, value: &str) -> Self {
		let mut prop = Self::new(Arc::from(name));
		prop.prop_type = PropType::String;
		prop.flags = PropFlags::VALUE_STR;
		prop.value_str = Arc::from(value);
		prop
	}

	/// First component.
	pub fn real_value(&self) -> f64 {
		self.value_real.x
	}

	/// First two components.
	pub fn vec2_value(&self) -> DVec2 {
		self.value_real.truncate().truncate()
	}

	/// First three components.
	pub fn vec3_value(&self) -> DVec3 {
		self.value_real.truncate()
	}

	/// Truthiness of the integer value.
	pub fn bool_value(&self) -> bool {
		self.value_int != 0
	}
}

/// Sorted property list with optional template defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
	props: Vec<Prop>,
	/// Read-through fallback for lookup misses.
	pub defaults: Option<Arc<Props>>,
}

impl Props {
	/// Sort `props` stably and keep the last of each name.
	pub fn from_unsorted(mut props: Vec<Prop>) -> Self {
		props.sort_by(|a, b| a.name_key.cmp(&b.name_key).then_with(|| a.name.as_bytes().cmp(b.name.as_bytes())));
		let mut out: Vec<Prop> = Vec::with_capacity(props.len());
		for prop in props {
			match out.last_mut() {
				Some(last) if last.name == prop.name => {
					log::trace!("duplicate property {}, keeping last", prop.name);
					*last = prop;
				}
				_ => out.push(prop),
			}
		}
		Self {
			props: out,
			defaults: None,
		}
	}

	/// Number of own properties.
	pub fn len(&self) -> usize {
		self.props.len()
	}

	/// True without own properties.
	pub fn is_empty(&self) -> bool {
		self.props.is_empty()
	}

	/// Own properties in sorted order.
	pub fn iter(&self) -> std::slice::Iter<'_, Prop> {
		self.props.iter()
	}

	/// Own properties as a slice.
	pub fn as_slice(&self) -> &[Prop] {
		&self.props
	}

	fn position(&self, name: &str) -> std::result::Result<usize, usize> {
		let key = prop_name_key(name);
		self.props
			.binary_search_by(|prop| prop.name_key.cmp(&key).then_with(|| prop.name.as_bytes().cmp(name.as_bytes())))
	}

	/// Own property only, ignoring defaults.
	pub fn find_own(&self, name: &str) -> Option<&Prop> {
		self.position(name).ok().map(|index| &self.props[index])
	}

	/// Mutable own property.
	pub fn find_own_mut(&mut self, name: &str) -> Option<&mut Prop> {
		self.position(name).ok().map(|index| &mut self.props[index])
	}

	/// Own property, else the template default.
	pub fn find(&self, name: &str) -> Option<&Prop> {
		self.find_own(name)
			.or_else(|| self.defaults.as_deref().and_then(|defaults| defaults.find(name)))
	}

	/// Insert or replace keeping sort order.
	pub fn insert(&mut self, prop: Prop) {
		match self.position(&prop.name) {
			Ok(index) => self.props[index] = prop,
			Err(index) => self.props.insert(index, prop),
		}
	}

	/// Numeric lookup with fallback.
	pub fn real(&self, name: &str, default: f64) -> f64 {
		self.find(name).map_or(default, Prop::real_value)
	}

	/// Vector lookup with fallback.
	pub fn vec3(&self, name: &str, default: DVec3) -> DVec3 {
		self.find(name).map_or(default, Prop::vec3_value)
	}

	/// Integer lookup with fallback.
	pub fn int(&self, name: &str, default: i64) -> i64 {
		self.find(name).map_or(default, |prop| prop.value_int)
	}

	/// Boolean lookup with fallback.
	pub fn bool(&self, name: &str, default: bool) -> bool {
		self.find(name).map_or(default, Prop::bool_value)
	}

	/// String lookup, empty when missing.
	pub fn str(&self, name: &str) -> Arc<str> {
		self.find(name).map_or_else(|| Arc::from(""), |prop| Arc::clone(&prop.value_str))
	}
}

#[cfg(test)]
mod tests;
