use crate::fbx::names::{self, KNOWN_NAMES};
use crate::fbx::{Allocator, ErrorKind, StringPool, UnicodeErrorHandling, find_canonical, hash_str, sanitize_utf8};

fn pool(policy: UnicodeErrorHandling) -> StringPool {
	StringPool::new(&Allocator::default(), policy)
}

#[test]
fn canonical_table_is_strictly_sorted() {
	assert!(KNOWN_NAMES.windows(2).all(|pair| pair[0].as_bytes() < pair[1].as_bytes()));
}

#[test]
fn canonical_names_resolve_without_insertion() {
	let mut pool = pool(UnicodeErrorHandling::default());
	let before = pool.len();
	for (index, name) in KNOWN_NAMES.iter().enumerate() {
		let symbol = find_canonical(name.as_bytes()).expect("canonical");
		assert_eq!(symbol.index(), index);
		assert!(symbol.is_canonical());
		assert_eq!(pool.intern(name.as_bytes()).expect("intern"), symbol);
	}
	assert_eq!(pool.len(), before);
	assert_eq!(pool.intern(b"Model").expect("intern"), names::MODEL);
	assert_eq!(pool.get(names::POLYGON_VERTEX_INDEX), "PolygonVertexIndex");
	assert_eq!(find_canonical(b"NotAName"), None);
}

#[test]
fn interning_is_idempotent_and_distinct() {
	let mut pool = pool(UnicodeErrorHandling::default());
	let a = pool.intern(b"Lcl Translation").expect("a");
	let b = pool.intern(b"Lcl Rotation").expect("b");
	assert_ne!(a, b);
	assert_eq!(pool.intern(b"Lcl Translation").expect("again"), a);
	assert_eq!(pool.find(b"Lcl Rotation"), Some(b));
	assert_eq!(pool.find(b"Lcl Scaling"), None);
	assert!(!a.is_canonical());
	assert!(std::sync::Arc::ptr_eq(&pool.arc(a), &pool.arc(a)));
}

#[test]
fn hash_reports_ascii() {
	assert!(hash_str(b"Geometry").1);
	assert!(!hash_str("Kü".as_bytes()).1);
	assert_ne!(hash_str(b"ab").0, hash_str(b"ba").0);
}

#[test]
fn sanitize_policies() {
	let bad = b"a\xffb";
	let fixed = |policy| sanitize_utf8(bad, policy).expect("sanitize").expect("changed");
	assert_eq!(fixed(UnicodeErrorHandling::ReplacementCharacter), "a\u{fffd}b");
	assert_eq!(fixed(UnicodeErrorHandling::Underscore), "a_b");
	assert_eq!(fixed(UnicodeErrorHandling::QuestionMark), "a?b");
	assert_eq!(fixed(UnicodeErrorHandling::Remove), "ab");
	assert_eq!(sanitize_utf8("ok ü".as_bytes(), UnicodeErrorHandling::AbortLoading).expect("valid"), None);

	let err = sanitize_utf8(bad, UnicodeErrorHandling::AbortLoading).expect_err("abort");
	assert_eq!(err.kind(), ErrorKind::InvalidUtf8);
}

#[test]
fn truncated_sequence_at_end_is_repaired() {
	let fixed = sanitize_utf8(b"ab\xe2\x82", UnicodeErrorHandling::Underscore).expect("sanitize");
	assert_eq!(fixed.as_deref(), Some("ab_"));
}

#[test]
fn raw_bytes_are_retained_on_request() {
	let mut pool = pool(UnicodeErrorHandling::Underscore).with_raw_retention(true);
	let symbol = pool.intern(b"tex\xfe.png").expect("intern");
	assert_eq!(pool.get(symbol), "tex_.png");
	assert_eq!(pool.raw(symbol), Some(&b"tex\xfe.png"[..]));

	let clean = pool.intern(b"clean").expect("intern");
	assert_eq!(pool.raw(clean), None);
}

#[test]
fn unsafe_ignore_always_keeps_raw() {
	let mut pool = pool(UnicodeErrorHandling::UnsafeIgnore);
	let symbol = pool.intern(b"\xc0").expect("intern");
	assert_eq!(pool.get(symbol), "\u{fffd}");
	assert_eq!(pool.raw(symbol), Some(&b"\xc0"[..]));
}
