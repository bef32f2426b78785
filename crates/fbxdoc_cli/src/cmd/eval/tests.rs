use crate::cmd::test_support::{run_fbxdoc, run_fbxdoc_json, scene_file};

fn cube(json: &serde_json::Value) -> &serde_json::Value {
	json["nodes"]
		.as_array()
		.and_then(|nodes| nodes.iter().find(|node| node["name"] == "Cube"))
		.expect("cube node")
}

#[test]
fn eval_interpolates_animated_translation() {
	let path = scene_file("eval.fbx");
	let json = run_fbxdoc_json(&["eval", &path, "--time", "0.5", "--json"]);

	assert_eq!(json["layers"], 1);
	let translation = cube(&json)["translation"].as_array().expect("translation");
	let x = translation[0].as_f64().expect("x");
	let y = translation[1].as_f64().expect("y");
	assert!((x - 5.0).abs() < 1e-6, "x = {x}");
	assert!((y - 1.0).abs() < 1e-9, "unanimated channels keep their value, y = {y}");
}

#[test]
fn eval_selects_stack_by_name() {
	let path = scene_file("eval_stack.fbx");
	let json = run_fbxdoc_json(&["eval", &path, "--time", "1", "--stack", "Take", "--json"]);
	let x = cube(&json)["world_translation"][0].as_f64().expect("x");
	assert!((x - 10.0).abs() < 1e-6, "x = {x}");

	let output = run_fbxdoc(&["eval", &path, "--time", "0", "--stack", "Missing"]);
	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("Missing"), "stderr: {stderr}");
}
