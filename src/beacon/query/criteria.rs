//! Compilation of filter predicates into store query criteria.

use serde::Serialize;

use super::filter::{FilterPredicate, RelationalOperator, ScoreKind, ThresholdFilter};
use super::region::Coordinate;

/// Store field names targeted by compiled criteria.
///
/// These are the short document field names of the variant store; the
/// chromosome is not part of the criteria but passed alongside them.
pub mod fields {
    /// Start coordinate of a variant.
    pub const START: &str = "start";
    /// End coordinate of a variant.
    pub const END: &str = "end";
    /// Reference allele content.
    pub const REFERENCE: &str = "ref";
    /// Alternate allele content.
    pub const ALTERNATE: &str = "alt";
    /// Variant type classification.
    pub const VARIANT_TYPE: &str = "type";
    /// Consequence-type codes of the variant annotation.
    pub const CONSEQUENCE_TYPE_SO: &str = "annot.ct.so";
    /// Minor allele frequency of the per-study statistics.
    pub const MAF: &str = "st.maf";
    /// Polyphen score of the variant annotation.
    pub const POLYPHEN_SCORE: &str = "annot.ct.polyphen.sc";
    /// SIFT score of the variant annotation.
    pub const SIFT_SCORE: &str = "annot.ct.sift.sc";
    /// Identifiers of the submitting studies.
    pub const STUDY_ID: &str = "files.sid";
}

/// A literal value in a criteria clause.
#[derive(Serialize, PartialEq, Debug, Clone)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Num(f64),
    Str(String),
}

impl Value {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Num(value) => Some(*value),
            Value::Str(_) => None,
        }
    }

    /// String view of the value, if it has one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }
}

/// Comparison applied to a store field.
///
/// Serializes to the store's operator document form, e.g. `{"$lte": 0.01}`.
#[derive(Serialize, PartialEq, Debug, Clone)]
pub enum Comparison {
    #[serde(rename = "$eq")]
    Eq(Value),
    #[serde(rename = "$lt")]
    Lt(Value),
    #[serde(rename = "$lte")]
    Lte(Value),
    #[serde(rename = "$gt")]
    Gt(Value),
    #[serde(rename = "$gte")]
    Gte(Value),
    #[serde(rename = "$in")]
    In(Vec<Value>),
}

impl From<ThresholdFilter> for Comparison {
    fn from(threshold: ThresholdFilter) -> Self {
        let value = Value::Num(threshold.value);
        match threshold.operator {
            RelationalOperator::Lt => Comparison::Lt(value),
            RelationalOperator::Lte => Comparison::Lte(value),
            RelationalOperator::Eq => Comparison::Eq(value),
            RelationalOperator::Gt => Comparison::Gt(value),
            RelationalOperator::Gte => Comparison::Gte(value),
        }
    }
}

/// One field restriction within compiled criteria.
#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct Clause {
    /// The store field the comparison applies to.
    pub field: &'static str,
    /// The comparison applied.
    pub comparison: Comparison,
}

/// Conjunction of clauses over the store's variant documents.
#[derive(Serialize, PartialEq, Debug, Clone, Default)]
pub struct Criteria {
    pub clauses: Vec<Clause>,
}

impl Criteria {
    fn push(&mut self, field: &'static str, comparison: Comparison) {
        self.clauses.push(Clause { field, comparison });
    }
}

/// Compile filter predicates into conjoined store criteria.
///
/// Compilation is pure and idempotent: the same predicate list always
/// yields structurally equal criteria.  Each predicate contributes its own
/// clauses; same-kind predicates are never merged.
pub fn compile(filters: &[FilterPredicate]) -> Criteria {
    let mut criteria = Criteria::default();
    for filter in filters {
        compile_filter(&mut criteria, filter);
    }
    criteria
}

fn compile_filter(criteria: &mut Criteria, filter: &FilterPredicate) {
    match filter {
        FilterPredicate::Region(coordinate, region) => {
            let field = match coordinate {
                Coordinate::Start => fields::START,
                Coordinate::End => fields::END,
            };
            if let Some(lower) = region.lower_bound {
                criteria.push(field, Comparison::Gte(Value::Int(lower)));
            }
            if let Some(upper) = region.upper_bound {
                criteria.push(field, Comparison::Lte(Value::Int(upper)));
            }
        }
        FilterPredicate::Allele {
            reference,
            alternate,
        } => {
            if let Some(reference) = reference {
                criteria.push(
                    fields::REFERENCE,
                    Comparison::Eq(Value::Str(reference.clone())),
                );
            }
            if let Some(alternate) = alternate {
                criteria.push(
                    fields::ALTERNATE,
                    Comparison::Eq(Value::Str(alternate.clone())),
                );
            }
        }
        FilterPredicate::VariantType(variant_type) => {
            criteria.push(
                fields::VARIANT_TYPE,
                Comparison::Eq(Value::Str(variant_type.to_string())),
            );
        }
        FilterPredicate::ConsequenceType(codes) => {
            criteria.push(
                fields::CONSEQUENCE_TYPE_SO,
                Comparison::In(codes.iter().map(|code| Value::Int(*code as i64)).collect()),
            );
        }
        FilterPredicate::PopulationStat(threshold) => {
            criteria.push(fields::MAF, (*threshold).into());
        }
        FilterPredicate::AnnotationScore(kind, threshold) => {
            let field = match kind {
                ScoreKind::Polyphen => fields::POLYPHEN_SCORE,
                ScoreKind::Sift => fields::SIFT_SCORE,
            };
            criteria.push(field, (*threshold).into());
        }
        FilterPredicate::Study(studies) => {
            criteria.push(
                fields::STUDY_ID,
                Comparison::In(studies.iter().map(|s| Value::Str(s.clone())).collect()),
            );
        }
    }
}
