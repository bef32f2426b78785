use crate::cmd::test_support::{run_fbxdoc, run_fbxdoc_json, scene_file};

#[test]
fn info_json_reports_header_and_counts() {
	let path = scene_file("info.fbx");
	let json = run_fbxdoc_json(&["info", &path, "--json"]);

	assert_eq!(json["format"], "binary");
	assert_eq!(json["compression"], "none");
	assert_eq!(json["version"], 7400);
	assert_eq!(json["axes"]["up"], "+y");
	assert_eq!(json["unit_meters"], 0.01);

	let counts = json["counts"].as_array().expect("counts array");
	let count_of = |label: &str| {
		counts
			.iter()
			.find(|entry| entry["element_type"] == label)
			.and_then(|entry| entry["count"].as_u64())
	};
	assert_eq!(count_of("node"), Some(2));
	assert_eq!(count_of("mesh"), Some(1));
	assert_eq!(count_of("material"), Some(1));
	assert_eq!(count_of("camera"), None, "absent types are omitted");
	assert!(json["warnings"].as_array().is_some_and(|items| items.is_empty()));
}

#[test]
fn info_fails_on_missing_file() {
	let output = run_fbxdoc(&["info", "does-not-exist.fbx"]);
	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("file not found"), "stderr: {stderr}");
}
