//! Institution catalog built from the academic percentile table and the optional
//! demographic table.
//!
//! The two tables carry no shared key: row *i* of the demographic table describes
//! row *i* of the academic table. Keeping both files in the same order is a
//! precondition of the data preparation step; the loader only compares row counts
//! and logs a warning when they differ.

mod headers;
pub(crate) mod normalizer;
mod parser;
pub mod record;

pub use record::{
    AcademicPercentiles, Demographics, InstitutionRecord, PercentileCurve, PercentilePoint,
    PERCENTILE_RUNGS,
};

use crate::config::CatalogConfig;
use headers::Metric;
use normalizer::normalize_name;
use parser::{RawTable, TableRow};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

#[derive(Debug)]
pub enum CatalogLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv(csv::Error),
}

impl std::fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogLoadError::Io { path, source } => write!(
                f,
                "failed to read catalog table {}: {}",
                path.display(),
                source
            ),
            CatalogLoadError::Csv(err) => write!(f, "invalid catalog table data: {}", err),
        }
    }
}

impl std::error::Error for CatalogLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogLoadError::Io { source, .. } => Some(source),
            CatalogLoadError::Csv(err) => Some(err),
        }
    }
}

impl From<csv::Error> for CatalogLoadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Immutable set of institutions with id and name indices.
///
/// Ids collide case-insensitively; the last row with a given id owns the id lookup
/// while every row stays in `list()` and in search results.
#[derive(Debug, Default)]
pub struct Catalog {
    list: Vec<InstitutionRecord>,
    by_id: HashMap<String, usize>,
    by_normalized_name: HashMap<String, Vec<usize>>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(list: Vec<InstitutionRecord>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_normalized_name: HashMap<String, Vec<usize>> = HashMap::new();

        for (position, record) in list.iter().enumerate() {
            by_id.insert(record.institution_id.to_lowercase(), position);
            by_normalized_name
                .entry(record.normalized_name.clone())
                .or_default()
                .push(position);
        }

        Self {
            list,
            by_id,
            by_normalized_name,
        }
    }

    pub fn list(&self) -> &[InstitutionRecord] {
        &self.list
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Case-insensitive id lookup.
    pub fn find_by_id(&self, id: &str) -> Option<&InstitutionRecord> {
        let key = id.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.by_id.get(&key).map(|position| &self.list[*position])
    }

    /// Exact normalized-name matches first, then substring matches, each group in
    /// catalog order. Uncapped; callers page the result.
    pub fn search(&self, query: &str) -> Vec<&InstitutionRecord> {
        let needle = normalize_name(query);
        if needle.is_empty() {
            return Vec::new();
        }

        let exact: &[usize] = self
            .by_normalized_name
            .get(&needle)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut results: Vec<&InstitutionRecord> =
            exact.iter().map(|position| &self.list[*position]).collect();
        results.extend(
            self.list
                .iter()
                .enumerate()
                .filter(|(position, record)| {
                    record.normalized_name.contains(&needle) && !exact.contains(position)
                })
                .map(|(_, record)| record),
        );
        results
    }
}

/// One-shot construction of a [`Catalog`] from the source tables.
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn from_paths<P: AsRef<Path>>(
        academics: P,
        demographics: Option<P>,
    ) -> Result<Catalog, CatalogLoadError> {
        let academics = open(academics.as_ref())?;
        let demographics = demographics.map(|path| open(path.as_ref())).transpose()?;
        Self::from_readers(academics, demographics)
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Catalog, CatalogLoadError> {
        Self::from_paths(
            config.academics_path.as_path(),
            config.demographics_path.as_deref(),
        )
    }

    pub fn from_readers<A: Read, D: Read>(
        academics: A,
        demographics: Option<D>,
    ) -> Result<Catalog, CatalogLoadError> {
        let academic_table = parser::parse_table(academics)?;
        let demographic_table = demographics.map(parser::parse_table).transpose()?;

        if let Some(table) = &demographic_table {
            warn_on_row_mismatch(academic_table.len(), table.len());
        }

        let records = build_records(&academic_table, demographic_table.as_ref());
        info!(institutions = records.len(), "institution catalog loaded");
        Ok(Catalog::from_records(records))
    }
}

/// Logs a warning when the paired tables differ in length. Returns whether they do.
fn warn_on_row_mismatch(academic_rows: usize, demographic_rows: usize) -> bool {
    if academic_rows == demographic_rows {
        return false;
    }
    warn!(
        academic_rows,
        demographic_rows, "catalog tables differ in row count; rows are paired by position"
    );
    true
}

fn open(path: &Path) -> Result<std::fs::File, CatalogLoadError> {
    std::fs::File::open(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn build_records(academics: &RawTable, demographics: Option<&RawTable>) -> Vec<InstitutionRecord> {
    let gpa_aliases = rung_aliases(Metric::Gpa);
    let test_aliases = rung_aliases(Metric::TestScore);

    academics
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let demographic_row = demographics.and_then(|table| table.row(index));
            build_record(index, row, demographic_row, &gpa_aliases, &test_aliases)
        })
        .collect()
}

fn rung_aliases(metric: Metric) -> Vec<Vec<String>> {
    PERCENTILE_RUNGS
        .iter()
        .map(|rung| headers::percentile_aliases(metric, *rung))
        .collect()
}

fn curve(row: &TableRow<'_>, aliases: &[Vec<String>]) -> PercentileCurve {
    let mut values = [None; 5];
    for (slot, rung_aliases) in values.iter_mut().zip(aliases) {
        *slot = row.number(rung_aliases.as_slice());
    }
    PercentileCurve::from_rungs(values)
}

fn build_record(
    index: usize,
    row: TableRow<'_>,
    demographic_row: Option<TableRow<'_>>,
    gpa_aliases: &[Vec<String>],
    test_aliases: &[Vec<String>],
) -> InstitutionRecord {
    let name = row
        .first_text(headers::NAME_ALIASES)
        .map(str::to_string)
        .unwrap_or_else(|| format!("unknown-{index}"));
    let institution_id = row
        .first_text(headers::ID_ALIASES)
        .map(str::to_string)
        .unwrap_or_else(|| name.clone());

    let gpa = curve(&row, gpa_aliases);
    let test_score = curve(&row, test_aliases);
    let gpa_median = gpa.value_at(50).unwrap_or(0.0);
    let test_score_median = test_score.value_at(50).unwrap_or(0.0);

    // Enrichment columns may live in either table; the demographic table wins.
    let lookup_text = |aliases: &[&str]| {
        demographic_row
            .and_then(|demo| demo.text(aliases))
            .or_else(|| row.text(aliases))
            .map(str::to_string)
    };
    let lookup_number = |aliases: &[&str]| {
        demographic_row
            .and_then(|demo| demo.number(aliases))
            .or_else(|| row.number(aliases))
    };

    let is_public = lookup_text(headers::CONTROL_ALIASES).and_then(|value| parse_control(&value));

    InstitutionRecord {
        normalized_name: normalize_name(&name),
        institution_id,
        name,
        academic_percentiles: AcademicPercentiles { gpa, test_score },
        gpa_median,
        test_score_median,
        state: lookup_text(headers::STATE_ALIASES),
        region: lookup_text(headers::REGION_ALIASES),
        is_public,
        demographics: Demographics {
            race_hispanic: lookup_number(headers::RACE_HISPANIC_ALIASES),
            race_black: lookup_number(headers::RACE_BLACK_ALIASES),
            race_asian: lookup_number(headers::RACE_ASIAN_ALIASES),
            race_white: lookup_number(headers::RACE_WHITE_ALIASES),
            race_other: lookup_number(headers::RACE_OTHER_ALIASES),
            gender_women: lookup_number(headers::GENDER_WOMEN_ALIASES),
            gender_men: lookup_number(headers::GENDER_MEN_ALIASES),
            ses_disadvantaged: lookup_number(headers::SES_DISADVANTAGED_ALIASES),
            ses_advantaged: lookup_number(headers::SES_ADVANTAGED_ALIASES),
            applicants: lookup_number(headers::APPLICANT_ALIASES),
            interviewed: lookup_number(headers::INTERVIEW_ALIASES),
            accepted: lookup_number(headers::ACCEPT_ALIASES),
        },
    }
}

fn parse_control(value: &str) -> Option<bool> {
    let lowered = value.to_lowercase();
    if lowered.contains("public") {
        Some(true)
    } else if lowered.contains("private") {
        Some(false)
    } else {
        None
    }
}

/// Shared holder of the current catalog. Readers take an `Arc` snapshot; a reload
/// builds the replacement completely before swapping it in.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `catalog`, returning the one it replaced.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(catalog))
    }

    /// Rebuilds from the configured tables. On failure the current catalog stays.
    pub fn reload(&self, config: &CatalogConfig) -> Result<usize, CatalogLoadError> {
        let catalog = CatalogLoader::from_config(config)?;
        let loaded = catalog.len();
        let previous = self.replace(catalog);
        info!(
            previous = previous.len(),
            loaded, "institution catalog replaced"
        );
        Ok(loaded)
    }
}
