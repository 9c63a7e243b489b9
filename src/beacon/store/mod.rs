//! Variant store boundary.
//!
//! The query core only depends on the `VariantStore` trait: compiled
//! criteria plus a chromosome in, matching records out.  The JSON-file
//! backed implementation evaluates criteria in memory with the store's
//! array-field semantics (a comparison over an array field matches when any
//! element matches).

use std::path::Path;

use enum_map::EnumMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::beacon::query::criteria::{fields, Comparison, Criteria};
use crate::beacon::query::filter::RelationalOperator;
use crate::common::{build_chrom_map, GenomeRelease};

/// Error for store resolution and execution failures.
///
/// These are infrastructure-caused and propagate to the caller; they are
/// never folded into a response envelope.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("variant store for {0} is not available")]
    StoreUnavailable(GenomeRelease),
    #[error("error reading variant store {0:?}: {1}")]
    Read(std::path::PathBuf, #[source] std::io::Error),
    #[error("error decoding variant store {0:?}: {1}")]
    Decode(std::path::PathBuf, #[source] serde_json::Error),
}

/// Per-study statistics attached to a source entry.
#[derive(Serialize, Deserialize, PartialEq, Debug, Default, Clone)]
pub struct VariantStats {
    /// Minor allele frequency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maf: Option<f64>,
}

/// Submission of a variant by one study.
#[derive(Serialize, Deserialize, PartialEq, Debug, Default, Clone)]
pub struct SourceEntry {
    /// Identifier of the submitting study.
    #[serde(rename = "sid")]
    pub study_id: String,
    /// Statistics over the study's samples.
    #[serde(rename = "st", default)]
    pub stats: VariantStats,
}

/// A single score value as stored, e.g. `{"sc": 0.582}`.
#[derive(Serialize, Deserialize, PartialEq, Debug, Default, Clone, Copy)]
pub struct Score {
    #[serde(rename = "sc")]
    pub score: f64,
}

/// Functional consequence of a variant on one transcript.
#[derive(Serialize, Deserialize, PartialEq, Debug, Default, Clone)]
pub struct ConsequenceAnnotation {
    /// Internal numeric consequence-type codes.
    #[serde(rename = "so", default)]
    pub so_codes: Vec<u32>,
    /// Polyphen pathogenicity prediction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polyphen: Option<Score>,
    /// SIFT impact prediction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sift: Option<Score>,
}

/// Annotation block of a variant document.
#[derive(Serialize, Deserialize, PartialEq, Debug, Default, Clone)]
pub struct VariantAnnotation {
    /// Per-transcript consequence annotations.
    #[serde(rename = "ct", default)]
    pub consequence_types: Vec<ConsequenceAnnotation>,
}

/// A variant document as stored; read-only to the query core.
#[derive(Serialize, Deserialize, PartialEq, Debug, Default, Clone)]
pub struct VariantRecord {
    /// Chromosome the variant lies on.
    #[serde(rename = "chr")]
    pub chromosome: String,
    /// Start coordinate.
    pub start: i64,
    /// End coordinate.
    pub end: i64,
    /// Reference allele content.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Alternate allele content.
    #[serde(rename = "alt")]
    pub alternate: String,
    /// Variant type classification token.
    #[serde(rename = "type", default)]
    pub variant_type: String,
    /// Per-study submissions, in store order.
    #[serde(rename = "files", default)]
    pub source_entries: Vec<SourceEntry>,
    /// Functional annotation, if any.
    #[serde(rename = "annot", skip_serializing_if = "Option::is_none")]
    pub annotation: Option<VariantAnnotation>,
}

impl VariantRecord {
    fn consequence_types(&self) -> impl Iterator<Item = &ConsequenceAnnotation> {
        self.annotation
            .iter()
            .flat_map(|annotation| annotation.consequence_types.iter())
    }
}

/// Query execution boundary to a variant store.
pub trait VariantStore {
    /// Return the variants on `chromosome` matching all of `criteria`, in
    /// store order.
    fn find_variants(
        &self,
        chromosome: &str,
        criteria: &Criteria,
    ) -> Result<Vec<VariantRecord>, StoreError>;
}

/// Evaluate compiled criteria against a single record.
pub fn matches_criteria(record: &VariantRecord, criteria: &Criteria) -> bool {
    criteria
        .clauses
        .iter()
        .all(|clause| match clause.field {
            fields::START => num_matches(&clause.comparison, record.start as f64),
            fields::END => num_matches(&clause.comparison, record.end as f64),
            fields::REFERENCE => str_matches(&clause.comparison, &record.reference),
            fields::ALTERNATE => str_matches(&clause.comparison, &record.alternate),
            fields::VARIANT_TYPE => str_matches(&clause.comparison, &record.variant_type),
            fields::CONSEQUENCE_TYPE_SO => record.consequence_types().any(|ct| {
                ct.so_codes
                    .iter()
                    .any(|code| num_matches(&clause.comparison, *code as f64))
            }),
            fields::MAF => record.source_entries.iter().any(|entry| {
                entry
                    .stats
                    .maf
                    .map_or(false, |maf| num_matches(&clause.comparison, maf))
            }),
            fields::POLYPHEN_SCORE => record
                .consequence_types()
                .filter_map(|ct| ct.polyphen)
                .any(|score| num_matches(&clause.comparison, score.score)),
            fields::SIFT_SCORE => record
                .consequence_types()
                .filter_map(|ct| ct.sift)
                .any(|score| num_matches(&clause.comparison, score.score)),
            fields::STUDY_ID => record
                .source_entries
                .iter()
                .any(|entry| str_matches(&clause.comparison, &entry.study_id)),
            _ => false,
        })
}

fn num_matches(comparison: &Comparison, lhs: f64) -> bool {
    let (operator, value) = match comparison {
        Comparison::Eq(value) => (RelationalOperator::Eq, value),
        Comparison::Lt(value) => (RelationalOperator::Lt, value),
        Comparison::Lte(value) => (RelationalOperator::Lte, value),
        Comparison::Gt(value) => (RelationalOperator::Gt, value),
        Comparison::Gte(value) => (RelationalOperator::Gte, value),
        Comparison::In(values) => {
            return values
                .iter()
                .any(|value| value.as_f64().map_or(false, |rhs| lhs == rhs))
        }
    };
    value.as_f64().map_or(false, |rhs| operator.compare(lhs, rhs))
}

fn str_matches(comparison: &Comparison, lhs: &str) -> bool {
    match comparison {
        Comparison::Eq(value) => value.as_str() == Some(lhs),
        Comparison::In(values) => values.iter().any(|value| value.as_str() == Some(lhs)),
        _ => false,
    }
}

/// Variant store backed by a JSON document file.
#[derive(Debug, Default)]
pub struct JsonStore {
    records: Vec<VariantRecord>,
    chrom_map: IndexMap<String, usize>,
}

impl JsonStore {
    /// Build a store from records already in memory.
    pub fn from_records(records: Vec<VariantRecord>) -> Self {
        JsonStore {
            records,
            chrom_map: build_chrom_map(),
        }
    }

    /// Load a store from a JSON file holding an array of variant documents.
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let fcontents =
            std::fs::read(path).map_err(|e| StoreError::Read(path.to_path_buf(), e))?;
        let records = serde_json::from_slice(&fcontents)
            .map_err(|e| StoreError::Decode(path.to_path_buf(), e))?;
        let store = Self::from_records(records);
        tracing::debug!("loaded {} variant records from {:?}", store.len(), path);
        Ok(store)
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl VariantStore for JsonStore {
    fn find_variants(
        &self,
        chromosome: &str,
        criteria: &Criteria,
    ) -> Result<Vec<VariantRecord>, StoreError> {
        // Unknown chromosome names cannot match any record.
        let Some(&chrom_idx) = self.chrom_map.get(chromosome) else {
            return Ok(Vec::new());
        };
        Ok(self
            .records
            .iter()
            .filter(|record| self.chrom_map.get(&record.chromosome) == Some(&chrom_idx))
            .filter(|record| matches_criteria(record, criteria))
            .cloned()
            .collect())
    }
}

/// Per-assembly variant stores.
///
/// The store handle for a request is resolved explicitly from the assembly
/// token via `get()`; there is no ambient store selection.
#[derive(Debug, Default)]
pub struct Stores {
    dbs: EnumMap<GenomeRelease, Option<JsonStore>>,
}

impl Stores {
    /// Load every `<store name>.json` file present under `path_db`.
    pub fn load(path_db: &Path) -> Result<Self, StoreError> {
        let mut dbs: EnumMap<GenomeRelease, Option<JsonStore>> = EnumMap::default();
        for release in GenomeRelease::iter() {
            let path = path_db.join(format!("{}.json", release.store_name()));
            if path.exists() {
                tracing::info!("loading variant store for {} from {:?}", release, &path);
                dbs[release] = Some(JsonStore::load(&path)?);
            } else {
                tracing::debug!("no variant store for {} at {:?}", release, &path);
            }
        }
        Ok(Stores { dbs })
    }

    /// Resolve the store handle for the given release.
    pub fn get(&self, release: GenomeRelease) -> Result<&JsonStore, StoreError> {
        self.dbs[release]
            .as_ref()
            .ok_or(StoreError::StoreUnavailable(release))
    }
}
