use std::sync::Arc;

use anyhow::Context;
use locus_core::{
    CacheStats, CachingResolver, FileSystemLocator, LocateRequest, LocatedResource, ScopeId,
};
use serde::Serialize;
use tracing::info;

use crate::cli::args::{LocateArgs, OutputFormat};
use crate::exit_codes;

#[derive(Debug, Serialize)]
struct LocateReport {
    scope: String,
    path: String,
    found: Option<LocatedResource>,
    stats: CacheStats,
}

pub fn run(args: LocateArgs) -> anyhow::Result<i32> {
    let policy = super::policy::load(&args.policy)?;
    let locator = FileSystemLocator::new(args.roots.iter().cloned());
    let resolver =
        CachingResolver::with_policy(locator, policy).context("invalid cache policy")?;

    let request = build_request(&args);

    let mut found: Option<Arc<LocatedResource>> = None;
    for _ in 0..args.repeat {
        found = resolver
            .locate_request(&request)
            .with_context(|| format!("locating {} in scope {}", args.path, args.scope))?;
    }

    let stats = resolver.stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        delegate_calls = stats.delegate_calls,
        "locate finished"
    );

    let report = LocateReport {
        scope: args.scope.clone(),
        path: args.path.clone(),
        found: found.as_deref().cloned(),
        stats,
    };
    print_report(&report, args.format)?;

    Ok(if report.found.is_some() {
        exit_codes::FOUND
    } else {
        exit_codes::NOT_FOUND
    })
}

fn build_request(args: &LocateArgs) -> LocateRequest {
    let mut request = LocateRequest::new(ScopeId::new(args.scope.clone()), args.path.clone());
    if let Some(style) = &args.style {
        request = request.with_style(style.clone());
    }
    if let Some(variation) = &args.variation {
        request = request.with_variation(variation.clone());
    }
    if let Some(locale) = &args.locale {
        request = request.with_locale(locale.clone());
    }
    if let Some(extension) = &args.extension {
        request = request.with_extension(extension.clone());
    }
    if args.strict {
        request = request.strict(true);
    }
    request
}

fn print_report(report: &LocateReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            match &report.found {
                Some(found) => println!("found: {}", found.path.display()),
                None => println!("not found: {} (scope {})", report.path, report.scope),
            }
            let s = &report.stats;
            println!(
                "cache: {} hits, {} misses, {} delegate calls, {} entries",
                s.hits, s.misses, s.delegate_calls, s.entries
            );
        }
    }
    Ok(())
}
