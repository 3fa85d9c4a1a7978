// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for timestamps, text clipping, cache paths, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; RFC3339 strings; clap CommandFactory
// outputs: Parsed UTC instants, clipped strings, default cache directory, man page text
// side_effects: None
// invariants:
// - clip_text never splits UTF-8; output is at most `max_chars` characters
// - parse_timestamp accepts RFC3339 with any offset and normalizes to UTC
// errors: parse helpers return None; render_man_page surfaces IO errors
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::CommandFactory;

/// Maximum number of characters kept for event bodies and descriptions.
pub const MAX_TEXT_CHARS: usize = 256;

/// Parse an RFC3339 timestamp into UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s.trim()).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Clips text to at most `max_chars` characters without splitting a UTF-8 character.
pub fn clip_text(text: &str, max_chars: usize) -> String {
  match text.char_indices().nth(max_chars) {
    Some((byte_idx, _)) => text[..byte_idx].to_string(),
    None => text.to_string(),
  }
}

/// Default on-disk cache location (`$XDG_CACHE_HOME/prx` or platform equivalent).
pub fn default_cache_dir() -> Option<PathBuf> {
  dirs::cache_dir().map(|d| d.join("prx"))
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
