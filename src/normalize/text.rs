use once_cell::sync::Lazy;
use regex::Regex;

/// Interrogative phrases that mark a comment as a question even without `?`.
const QUESTION_PHRASES: [&str; 27] = [
  "how can",
  "how do",
  "how does",
  "how should",
  "how would",
  "should i",
  "should we",
  "can you",
  "could you",
  "would you",
  "can we",
  "can someone",
  "can anyone",
  "any suggestions",
  "any ideas",
  "any thoughts",
  "wondering if",
  "i wonder",
  "is it possible",
  "is there a way",
  "what do you think",
  "what is the",
  "does anyone",
  "do you know",
  "thoughts on",
  "not sure if",
  "not sure how",
];

static MENTION_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?:^|[^A-Za-z0-9_])@([A-Za-z0-9](?:-?[A-Za-z0-9])*)").unwrap());

const MAX_LOGIN_LEN: usize = 39;

pub fn is_question(text: &str) -> bool {
  if text.contains('?') {
    return true;
  }
  let lower = text.to_lowercase();
  QUESTION_PHRASES.iter().any(|p| lower.contains(p))
}

/// `@handle` mentions in order of first appearance, deduplicated case-insensitively.
pub fn extract_mentions(text: &str) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();

  for caps in MENTION_RE.captures_iter(text) {
    let Some(m) = caps.get(1) else { continue };
    let handle = m.as_str();
    if handle.len() > MAX_LOGIN_LEN {
      continue;
    }
    // `@foo_bar` is not a handle
    if text[m.end()..].starts_with('_') {
      continue;
    }
    if !out.iter().any(|h| h.eq_ignore_ascii_case(handle)) {
      out.push(handle.to_string());
    }
  }

  out
}
