use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use prx::github::api::{Fixtures, GithubFixtureApi};
use prx::{Client, Config, EventKind, WriteAccess};

fn fixture_api(name: &str) -> Arc<GithubFixtureApi> {
  let fixtures: Fixtures = test_support::read_fixture_json(name);
  Arc::new(GithubFixtureApi::new(fixtures))
}

#[test]
fn permission_lookups_are_cached_on_disk() {
  test_support::init_tracing();
  let dir = test_support::tempdir();
  let config = Config {
    cache_dir: Some(dir.path().to_path_buf()),
    ..Config::in_memory()
  };

  let first = fixture_api("pr_merged.json");
  let client = Client::with_api(first.clone(), config.clone());
  let data = client.fetch_uncached("acme", "widgets", 7).unwrap();
  client.close();
  assert_eq!(first.call_count("collaborators"), 1);
  assert_eq!(first.call_count("permission"), 1);

  let rev2 = data.events.iter().find(|e| e.actor == "rev2").unwrap();
  assert_eq!(rev2.kind, EventKind::Review);
  assert_eq!(rev2.write_access, WriteAccess::No);

  // a new client over the same directory answers access questions from disk
  let second = fixture_api("pr_merged.json");
  let client = Client::with_api(second.clone(), config);
  client.fetch_uncached("acme", "widgets", 7).unwrap();
  assert_eq!(second.call_count("collaborators"), 0);
  assert_eq!(second.call_count("permission"), 0);
}

#[test]
fn short_deadline_degrades_to_timeout_error() {
  let config = Config {
    timeout: Duration::ZERO,
    ..Config::in_memory()
  };
  let client = Client::with_api(fixture_api("pr_blocked.json"), config);
  let err = client.fetch("acme", "widgets", 42, DateTime::<Utc>::UNIX_EPOCH).unwrap_err();
  assert_eq!(err, prx::FetchError::Timeout);
}
