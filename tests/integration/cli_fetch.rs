use predicates::prelude::*;
use serde_json::{json, Value};

fn run_fixture(fixture: &str, extra: &[&str]) -> Value {
  let mut cmd = test_support::cmd_bin("prx");
  let out = cmd
    .env("PRX_TEST_FIXTURES", test_support::fixture_path(fixture))
    .args(["acme/widgets#42", "--no-cache"])
    .args(extra)
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn cli_prints_blocked_pull_request() {
  test_support::init_insta();
  let v = run_fixture("pr_blocked.json", &[]);

  let pr = &v["pull_request"];
  assert_eq!(pr["number"], 42);
  assert_eq!(pr["author_write_access"], -1);
  assert_eq!(pr["mergeable"], false);

  let events = v["events"].as_array().unwrap();
  assert_eq!(events.len(), 13);
  assert_eq!(events[0]["kind"], "commit");
  // successful statuses are dropped from the timeline but still summarized
  assert!(!events.iter().any(|e| e["kind"] == "status_check" && e["outcome"] == "success"));
  assert_eq!(pr["check_summary"]["success"]["ci/lint"], "Lint passed");

  let derived = json!({
    "required_checks": pr["required_checks"],
    "reviewers": pr["reviewers"],
    "approval_summary": pr["approval_summary"],
    "test_state": pr["test_state"],
    "mergeable_state_description": pr["mergeable_state_description"],
  });
  insta::with_settings!({ sort_maps => true }, {
  insta::assert_json_snapshot!(derived, @r###"
  {
    "approval_summary": {
      "approvals_with_unknown_access": 0,
      "approvals_with_write_access": 0,
      "approvals_without_write_access": 0,
      "changes_requested": 1
    },
    "mergeable_state_description": "PR has failing status checks and requires approval",
    "required_checks": [
      "build",
      "test"
    ],
    "reviewers": {
      "lead": "pending",
      "maint": "changes_requested"
    },
    "test_state": "failing"
  }
  "###);
  });
}

#[test]
fn cli_counts_approvals_by_access_tier() {
  let v = run_fixture("pr_merged.json", &["--compact"]);
  let pr = &v["pull_request"];

  assert_eq!(pr["merged"], true);
  assert_eq!(pr["merged_by"], "lead");
  assert_eq!(pr["author_bot"], true);
  assert_eq!(pr["required_checks"], json!([]));
  assert_eq!(pr["test_state"], "passing");
  assert_eq!(pr["mergeable_state_description"], "PR is ready to merge");
  assert_eq!(
    pr["approval_summary"],
    json!({
      "approvals_with_write_access": 1,
      "approvals_with_unknown_access": 1,
      "approvals_without_write_access": 1,
      "changes_requested": 0
    })
  );
  assert_eq!(pr["participant_access"]["lead"], 2);

  let events = v["events"].as_array().unwrap();
  let rev2 = events.iter().find(|e| e["actor"] == "rev2").unwrap();
  assert_eq!(rev2["write_access"], -2);

  let merged = events.iter().find(|e| e["kind"] == "merged").unwrap();
  assert_eq!(merged["actor"], "lead");
  assert_eq!(merged["target"], "ddd4444");
}

#[test]
fn compact_output_is_single_line() {
  let mut cmd = test_support::cmd_bin("prx");
  cmd
    .env("PRX_TEST_FIXTURES", test_support::fixture_path("pr_merged.json"))
    .args(["https://github.com/acme/widgets/pull/7", "--no-cache", "--compact"])
    .assert()
    .success()
    .stdout(predicate::function(|s: &str| s.trim_end().lines().count() == 1));
}

#[test]
fn disk_cache_serves_until_fresh_is_requested() {
  let cache = test_support::tempdir();
  let cache_dir = cache.path().to_str().unwrap();

  test_support::cmd_bin("prx")
    .env("PRX_TEST_FIXTURES", test_support::fixture_path("pr_blocked.json"))
    .args(["acme/widgets#42", "--cache-dir", cache_dir])
    .assert()
    .success();

  // upstream now fails for everything; the cached copy still answers
  let broken = r#"{"errors":{"pull":500}}"#;
  test_support::cmd_bin("prx")
    .env("PRX_TEST_FIXTURES_JSON", broken)
    .args(["Acme/Widgets#42", "--cache-dir", cache_dir])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"number\": 42"));

  test_support::cmd_bin("prx")
    .env("PRX_TEST_FIXTURES_JSON", broken)
    .args(["acme/widgets#42", "--cache-dir", cache_dir, "--fresh"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("500"));
}
