use predicates::prelude::*;

#[test]
fn rejects_unparseable_reference() {
  test_support::cmd_bin("prx")
    .env("PRX_TEST_FIXTURES_JSON", "{}")
    .args(["not-a-pr", "--no-cache"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unrecognized pull request reference"));
}

#[test]
fn requires_a_reference() {
  test_support::cmd_bin("prx").assert().failure();
}

#[test]
fn missing_pull_request_reports_not_found() {
  test_support::cmd_bin("prx")
    .env("PRX_TEST_FIXTURES_JSON", "{}")
    .args(["acme/widgets#404", "--no-cache"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to fetch acme/widgets#404").and(predicate::str::contains("404")));
}

#[test]
fn malformed_fixtures_fail_client_setup() {
  test_support::cmd_bin("prx")
    .env("PRX_TEST_FIXTURES_JSON", "[not json")
    .args(["acme/widgets#1", "--no-cache"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to initialize GitHub client"));
}

#[test]
fn conflicting_cache_flags_are_rejected() {
  test_support::cmd_bin("prx")
    .args(["acme/widgets#1", "--no-cache", "--cache-dir", "/tmp/prx"])
    .assert()
    .failure();
}
