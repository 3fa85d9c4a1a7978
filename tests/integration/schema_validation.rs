use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonschema::validator_for;
use prx::github::api::{Fixtures, GithubFixtureApi};
use prx::{Client, Config};

fn compile_schema() -> jsonschema::Validator {
  let schema = test_support::read_schema("pull-request-data.schema.json");
  validator_for(&schema).expect("compile schema")
}

fn assert_valid(v: &serde_json::Value) {
  let validator = compile_schema();
  let errors: Vec<String> = validator.iter_errors(v).map(|e| format!("{} at {}", e, e.instance_path)).collect();
  assert!(errors.is_empty(), "schema violations: {errors:#?}");
}

#[test]
fn cli_output_conforms_to_schema() {
  for fixture in ["pr_blocked.json", "pr_merged.json"] {
    let out = test_support::cmd_bin("prx")
      .env("PRX_TEST_FIXTURES", test_support::fixture_path(fixture))
      .args(["acme/widgets#1", "--no-cache"])
      .output()
      .unwrap();
    assert!(out.status.success(), "{fixture}: {}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_valid(&v);
  }
}

#[test]
fn library_output_conforms_to_schema() {
  test_support::init_tracing();
  let fixtures: Fixtures = test_support::read_fixture_json("pr_blocked.json");
  let client = Client::with_api(Arc::new(GithubFixtureApi::new(fixtures)), Config::in_memory());

  let data = client.fetch("acme", "widgets", 42, DateTime::<Utc>::UNIX_EPOCH).unwrap();
  assert_valid(&serde_json::to_value(&data).unwrap());
}

#[test]
fn schema_rejects_out_of_range_access() {
  let validator = compile_schema();
  let bad = serde_json::json!({
    "pull_request": {},
    "events": [{ "kind": "comment", "timestamp": "2024-01-01T00:00:00Z", "write_access": 5 }]
  });
  assert!(!validator.is_valid(&bad));
}
