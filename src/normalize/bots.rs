use crate::github::raw::RawUser;

const BOT_SUFFIXES: [&str; 4] = ["[bot]", "-bot", "_bot", "-robot"];

/// Whether an account is automated. Permissive: a false positive only affects
/// display and weighting, never access decisions.
pub fn is_bot(user: &RawUser) -> bool {
  if user.user_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("bot")) {
    return true;
  }
  if login_looks_like_bot(&user.login) {
    return true;
  }
  user.node_id.as_deref().is_some_and(node_id_looks_like_bot)
}

pub fn login_looks_like_bot(login: &str) -> bool {
  let l = login.to_ascii_lowercase();
  if l.is_empty() {
    return false;
  }
  BOT_SUFFIXES.iter().any(|s| l.ends_with(s)) || l.starts_with("bot-") || (l.ends_with("bot") && l.len() > 3)
}

fn node_id_looks_like_bot(id: &str) -> bool {
  id.starts_with("BOT_") || id.to_ascii_lowercase().contains("bot")
}
