use super::normalizer::normalize_header;
use std::collections::HashMap;

pub(crate) const NAME_ALIASES: &[&str] = &["school", "school name", "schoolname", "institution", "name"];
pub(crate) const ID_ALIASES: &[&str] = &["school"];

const GPA_NAMES: &[&str] = &["gpa"];
const TEST_SCORE_NAMES: &[&str] = &["mcat", "test score", "test"];

pub(crate) const STATE_ALIASES: &[&str] = &["state"];
pub(crate) const REGION_ALIASES: &[&str] = &["region"];
pub(crate) const CONTROL_ALIASES: &[&str] =
    &["public/private", "public or private", "public private", "type", "control"];

pub(crate) const RACE_HISPANIC_ALIASES: &[&str] = &["% hispanic", "hispanic", "race hispanic", "hispanic %"];
pub(crate) const RACE_BLACK_ALIASES: &[&str] = &["% black", "black", "race black", "black %"];
pub(crate) const RACE_ASIAN_ALIASES: &[&str] = &["% asian", "asian", "race asian", "asian %"];
pub(crate) const RACE_WHITE_ALIASES: &[&str] = &["% white", "white", "race white", "white %"];
pub(crate) const RACE_OTHER_ALIASES: &[&str] = &["% other", "other", "race other", "other %"];
pub(crate) const GENDER_WOMEN_ALIASES: &[&str] = &["% women", "women", "female", "% female"];
pub(crate) const GENDER_MEN_ALIASES: &[&str] = &["% men", "men", "male", "% male"];
pub(crate) const SES_DISADVANTAGED_ALIASES: &[&str] =
    &["% disadvantaged", "ses disadvantaged", "disadvantaged"];
pub(crate) const SES_ADVANTAGED_ALIASES: &[&str] =
    &["% advantaged", "ses advantaged", "advantaged"];
pub(crate) const APPLICANT_ALIASES: &[&str] = &["applicants", "total applicants", "applied"];
pub(crate) const INTERVIEW_ALIASES: &[&str] = &["interviewed", "interviews", "total interviewed"];
pub(crate) const ACCEPT_ALIASES: &[&str] = &["accepted", "acceptances", "matriculants"];

/// Which academic metric a percentile column describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Metric {
    Gpa,
    TestScore,
}

impl Metric {
    fn names(self) -> &'static [&'static str] {
        match self {
            Metric::Gpa => GPA_NAMES,
            Metric::TestScore => TEST_SCORE_NAMES,
        }
    }
}

/// Header spellings for one metric at one rung, highest priority first.
pub(crate) fn percentile_aliases(metric: Metric, rung: u8) -> Vec<String> {
    let mut aliases = Vec::new();
    for name in metric.names() {
        if rung == 50 {
            aliases.push(format!("{name} p50 (median)"));
            aliases.push(format!("{name} p50"));
            aliases.push(format!("{name} p50(median)"));
            aliases.push(format!("{name} median"));
        } else {
            aliases.push(format!("{name} p{rung}"));
        }
        aliases.push(format!("{name} {rung}th percentile"));
        aliases.push(format!("{name} {rung}th"));
        aliases.push(format!("{name} {rung}"));
    }
    aliases
}

/// Normalized header name to column position. The first occurrence of a repeated
/// header wins.
#[derive(Debug, Default, Clone)]
pub(crate) struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut columns = HashMap::new();
        for (position, header) in headers.into_iter().enumerate() {
            columns.entry(normalize_header(header)).or_insert(position);
        }
        Self { columns }
    }

    /// First alias present in the header row.
    pub(crate) fn resolve<S: AsRef<str>>(&self, aliases: &[S]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.columns.get(alias.as_ref()).copied())
    }

    /// Every alias present in the header row, in alias priority order.
    pub(crate) fn resolve_all<S: AsRef<str>>(&self, aliases: &[S]) -> Vec<usize> {
        aliases
            .iter()
            .filter_map(|alias| self.columns.get(alias.as_ref()).copied())
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
