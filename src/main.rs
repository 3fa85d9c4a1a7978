use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use prx::cli::{normalize, Cli};
use prx::{util, Client};

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prx=warn"));
  // stdout carries the JSON document
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_tracing();

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;
  let pr = &cfg.pr;

  // Phase 2: fetch through the cache
  let client = Client::new(cfg.config.clone()).context("failed to initialize GitHub client")?;
  let data = client
    .fetch(&pr.owner, &pr.repo, pr.number, cfg.reference_time)
    .with_context(|| format!("failed to fetch {}/{}#{}", pr.owner, pr.repo, pr.number))?;
  client.close();

  // Phase 3: render
  let out = if cfg.compact {
    serde_json::to_string(&data)?
  } else {
    serde_json::to_string_pretty(&data)?
  };
  println!("{}", out);

  Ok(())
}
