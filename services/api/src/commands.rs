use crate::infra::parse_strategy;
use clap::Args;
use school_match::catalog::{Catalog, CatalogLoader, InstitutionRecord};
use school_match::config::{AppConfig, CatalogConfig};
use school_match::error::AppError;
use school_match::intake::IntakeServiceError;
use school_match::matching::{rank_matches, MatchResult, ScoringStrategy};
use school_match::normalize_profile;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct TableArgs {
    /// Academic percentile table (defaults to CATALOG_ACADEMICS_PATH)
    #[arg(long)]
    pub(crate) academics: Option<PathBuf>,
    /// Demographic table paired with the academic table by row position
    #[arg(long)]
    pub(crate) demographics: Option<PathBuf>,
}

impl TableArgs {
    fn resolve(self, configured: &CatalogConfig) -> CatalogConfig {
        CatalogConfig {
            academics_path: self
                .academics
                .unwrap_or_else(|| configured.academics_path.clone()),
            demographics_path: self
                .demographics
                .or_else(|| configured.demographics_path.clone()),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// JSON file holding the applicant profile (intake form shape)
    #[arg(long)]
    pub(crate) profile: PathBuf,
    #[command(flatten)]
    pub(crate) tables: TableArgs,
    /// Number of matches to print (defaults to MATCH_LIMIT)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Scoring strategy: interpolation or banded (defaults to MATCH_STRATEGY)
    #[arg(long, value_parser = parse_strategy)]
    pub(crate) strategy: Option<ScoringStrategy>,
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Institution name or fragment
    pub(crate) query: String,
    #[command(flatten)]
    pub(crate) tables: TableArgs,
    /// Maximum results to print (defaults to SEARCH_PAGE_SIZE)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&args.profile)?;
    let profile: Value = serde_json::from_str(&raw).map_err(std::io::Error::from)?;

    let strategy = args.strategy.unwrap_or(config.matching.strategy);
    let limit = args
        .limit
        .filter(|limit| *limit > 0)
        .unwrap_or(config.matching.default_limit);
    let catalog = CatalogLoader::from_config(&args.tables.resolve(&config.catalog))?;

    let matches = rank_profile(&profile, &catalog, strategy, limit)?;
    print!("{}", render_matches(&matches, strategy, catalog.len()));
    Ok(())
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let limit = args
        .limit
        .filter(|limit| *limit > 0)
        .unwrap_or(config.matching.search_page_size);
    let catalog = CatalogLoader::from_config(&args.tables.resolve(&config.catalog))?;

    let results: Vec<&InstitutionRecord> =
        catalog.search(&args.query).into_iter().take(limit).collect();
    print!("{}", render_search(&args.query, &results));
    Ok(())
}

pub(crate) fn rank_profile(
    raw: &Value,
    catalog: &Catalog,
    strategy: ScoringStrategy,
    limit: usize,
) -> Result<Vec<MatchResult>, AppError> {
    let profile = normalize_profile(raw);
    profile
        .ensure_scoreable()
        .map_err(|err| AppError::Intake(IntakeServiceError::from(err)))?;

    let scorer = strategy.scorer();
    Ok(rank_matches(scorer.as_ref(), &profile, catalog.list(), limit))
}

fn component(score: Option<u8>) -> String {
    score.map_or_else(|| "-".to_string(), |score| score.to_string())
}

pub(crate) fn render_matches(
    matches: &[MatchResult],
    strategy: ScoringStrategy,
    catalog_size: usize,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Top {} of {} institutions ({} scoring)",
        matches.len(),
        catalog_size,
        strategy.label()
    );
    if matches.is_empty() {
        let _ = writeln!(out, "No institution could be scored for this profile.");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>3}  {:<48} {:>5} {:>5} {:>5} {:>10} {:>11}",
        "#", "Institution", "Fit", "GPA", "Test", "GPA median", "Test median"
    );
    for (position, result) in matches.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<48} {:>5} {:>5} {:>5} {:>10.2} {:>11.0}",
            position + 1,
            result.name,
            result.match_score,
            component(result.gpa_component_score),
            component(result.test_score_component_score),
            result.gpa_median,
            result.test_score_median
        );
    }
    out
}

pub(crate) fn render_search(query: &str, results: &[&InstitutionRecord]) -> String {
    let mut out = String::new();
    if results.is_empty() {
        let _ = writeln!(out, "No institutions match '{}'.", query.trim());
        return out;
    }

    let _ = writeln!(out, "{} institution(s) match '{}'", results.len(), query.trim());
    for record in results {
        let location = match (&record.state, &record.region) {
            (Some(state), Some(region)) => format!("{state}, {region}"),
            (Some(state), None) => state.clone(),
            (None, Some(region)) => region.clone(),
            (None, None) => "location unknown".to_string(),
        };
        let _ = writeln!(
            out,
            "- {} ({}) | GPA median {:.2} | test median {:.0}",
            record.name, location, record.gpa_median, record.test_score_median
        );
    }
    out
}
