use anyhow::Context;
use locus_core::CachePolicy;

use crate::cli::args::{PolicyArgs, PolicySource};
use crate::exit_codes;

pub fn run(args: PolicyArgs) -> anyhow::Result<i32> {
    let policy = load(&args.policy)?;
    println!("{}", serde_json::to_string_pretty(&policy)?);
    Ok(exit_codes::FOUND)
}

/// Policy from `--config`, else from the environment.
pub fn load(source: &PolicySource) -> anyhow::Result<CachePolicy> {
    match &source.config {
        Some(path) => CachePolicy::from_file(path)
            .with_context(|| format!("loading cache policy from {}", path.display())),
        None => {
            let policy = CachePolicy::from_env();
            policy.validate().context("cache policy from environment")?;
            Ok(policy)
        }
    }
}
