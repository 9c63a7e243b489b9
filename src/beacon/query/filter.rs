//! Typed filter predicates and their construction from request parameters.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::ontology::SEQUENCE_ONTOLOGY;
use super::region::{Coordinate, GenomicRegion};
use super::schema::{BeaconAlleleRequest, ValidationError, VariantType};

/// Relational comparison operators for threshold filters.
#[derive(
    Serialize, Deserialize, EnumString, EnumIter, Display, PartialEq, Eq, Debug, Clone, Copy, Hash,
)]
pub enum RelationalOperator {
    /// Strictly less than.
    #[strum(serialize = "<")]
    Lt,
    /// Less than or equal.
    #[strum(serialize = "<=")]
    Lte,
    /// Equal.
    #[strum(serialize = "=")]
    Eq,
    /// Strictly greater than.
    #[strum(serialize = ">")]
    Gt,
    /// Greater than or equal.
    #[strum(serialize = ">=")]
    Gte,
}

impl RelationalOperator {
    /// Evaluate the comparison with `lhs` on the left-hand side.
    pub fn compare(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            RelationalOperator::Lt => lhs < rhs,
            RelationalOperator::Lte => lhs <= rhs,
            RelationalOperator::Eq => lhs == rhs,
            RelationalOperator::Gt => lhs > rhs,
            RelationalOperator::Gte => lhs >= rhs,
        }
    }
}

/// A parsed threshold token such as `"<=0.01"`.
///
/// The wire form is the relational operator immediately followed by a
/// decimal value.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy)]
pub struct ThresholdFilter {
    /// The comparison to apply.
    pub operator: RelationalOperator,
    /// The threshold value compared against.
    pub value: f64,
}

impl std::str::FromStr for ThresholdFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Two-character operators must be tried first.
        let (operator, rest) = if let Some(rest) = s.strip_prefix("<=") {
            (RelationalOperator::Lte, rest)
        } else if let Some(rest) = s.strip_prefix(">=") {
            (RelationalOperator::Gte, rest)
        } else if let Some(rest) = s.strip_prefix('<') {
            (RelationalOperator::Lt, rest)
        } else if let Some(rest) = s.strip_prefix('>') {
            (RelationalOperator::Gt, rest)
        } else if let Some(rest) = s.strip_prefix('=') {
            (RelationalOperator::Eq, rest)
        } else {
            return Err(ValidationError::MalformedThreshold(s.to_owned()));
        };

        let value = rest
            .parse()
            .map_err(|_| ValidationError::MalformedThreshold(s.to_owned()))?;
        Ok(ThresholdFilter { operator, value })
    }
}

/// Annotation score families that support threshold filtering.
#[derive(
    Serialize, Deserialize, EnumString, EnumIter, Display, PartialEq, Eq, Debug, Clone, Copy, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoreKind {
    /// Polyphen pathogenicity prediction.
    Polyphen,
    /// SIFT impact prediction.
    Sift,
}

/// A single independent restriction on the variant match set.
///
/// Predicates are order-insensitive for correctness; the builder emits them
/// in a fixed order anyway so that compiled criteria are reproducible.
#[derive(PartialEq, Debug, Clone)]
pub enum FilterPredicate {
    /// Restrict one coordinate to a genomic region.
    Region(Coordinate, GenomicRegion),
    /// Restrict the allele content.
    Allele {
        reference: Option<String>,
        alternate: Option<String>,
    },
    /// Restrict the variant type classification.
    VariantType(VariantType),
    /// Restrict to variants annotated with one of the given consequence
    /// codes.
    ConsequenceType(Vec<u32>),
    /// Threshold on the minor allele frequency.
    PopulationStat(ThresholdFilter),
    /// Threshold on a pathogenicity score.
    AnnotationScore(ScoreKind, ThresholdFilter),
    /// Restrict to variants submitted by one of the given studies.
    Study(Vec<String>),
}

/// Assembles the ordered filter list for a beacon allele query.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    filters: Vec<FilterPredicate>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn build(self) -> Vec<FilterPredicate> {
        self.filters
    }

    /// Add a region filter; the start-side region is added even when
    /// unbounded, the end-side one only when it constrains something.
    fn with_region(
        mut self,
        coordinate: Coordinate,
        region: GenomicRegion,
    ) -> Result<Self, ValidationError> {
        if region.lower_bound.map_or(false, |bound| bound < 0)
            || region.upper_bound.map_or(false, |bound| bound < 0)
        {
            return Err(ValidationError::NegativeCoordinate(coordinate));
        }
        if coordinate == Coordinate::Start || !region.is_trivial() {
            self.filters.push(FilterPredicate::Region(coordinate, region));
        }
        Ok(self)
    }

    fn with_alleles(mut self, reference: Option<&str>, alternate: Option<&str>) -> Self {
        if reference.is_some() || alternate.is_some() {
            self.filters.push(FilterPredicate::Allele {
                reference: reference.map(str::to_owned),
                alternate: alternate.map(str::to_owned),
            });
        }
        self
    }

    /// Add a variant type filter when the token is recognized; unrecognized
    /// tokens are treated as absent.
    fn with_variant_type(mut self, token: Option<&str>) -> Self {
        if let Some(variant_type) = token.and_then(|token| token.parse::<VariantType>().ok()) {
            self.filters.push(FilterPredicate::VariantType(variant_type));
        }
        self
    }

    fn with_consequence_types(mut self, terms: Option<&[String]>) -> Result<Self, ValidationError> {
        if let Some(terms) = terms {
            let codes = terms
                .iter()
                .map(|term| SEQUENCE_ONTOLOGY.decode(term))
                .collect::<Result<Vec<_>, _>>()?;
            self.filters.push(FilterPredicate::ConsequenceType(codes));
        }
        Ok(self)
    }

    fn with_maf(mut self, token: Option<&str>) -> Result<Self, ValidationError> {
        if let Some(token) = token {
            self.filters
                .push(FilterPredicate::PopulationStat(token.parse()?));
        }
        Ok(self)
    }

    fn with_score(mut self, kind: ScoreKind, token: Option<&str>) -> Result<Self, ValidationError> {
        if let Some(token) = token {
            self.filters
                .push(FilterPredicate::AnnotationScore(kind, token.parse()?));
        }
        Ok(self)
    }

    fn with_studies(mut self, studies: Option<&[String]>) -> Self {
        if let Some(studies) = studies {
            self.filters.push(FilterPredicate::Study(studies.to_vec()));
        }
        self
    }
}

/// Build the full filter list for a beacon allele query from the request
/// and its resolved regions.
///
/// Fails when neither `alternateBases` nor `variantType` was supplied or
/// when any region bound is negative.
pub fn beacon_filters(
    request: &BeaconAlleleRequest,
    start: GenomicRegion,
    end: GenomicRegion,
) -> Result<Vec<FilterPredicate>, ValidationError> {
    if request.alternate_bases.is_none() && request.variant_type.is_none() {
        return Err(ValidationError::MissingAlternateOrType);
    }

    Ok(FilterBuilder::new()
        .with_region(Coordinate::Start, start)?
        .with_region(Coordinate::End, end)?
        .with_alleles(
            Some(request.reference_bases.as_str()),
            request.alternate_bases.as_deref(),
        )
        .with_variant_type(request.variant_type.as_deref())
        .with_consequence_types(request.consequence_type.as_deref())?
        .with_maf(request.maf.as_deref())?
        .with_score(ScoreKind::Polyphen, request.polyphen.as_deref())?
        .with_score(ScoreKind::Sift, request.sift.as_deref())?
        .with_studies(request.dataset_ids.as_deref())
        .build())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::super::region::{resolve_end, resolve_start};
    use super::*;

    fn request() -> BeaconAlleleRequest {
        BeaconAlleleRequest {
            reference_name: "1".into(),
            start: Some(1000),
            reference_bases: "A".into(),
            alternate_bases: Some("T".into()),
            assembly_id: "grch37".into(),
            ..Default::default()
        }
    }

    #[rstest]
    #[case("<0.01", RelationalOperator::Lt, 0.01)]
    #[case("<=0.05", RelationalOperator::Lte, 0.05)]
    #[case("=0.5", RelationalOperator::Eq, 0.5)]
    #[case(">0.9", RelationalOperator::Gt, 0.9)]
    #[case(">=0.321", RelationalOperator::Gte, 0.321)]
    fn threshold_token_parsing(
        #[case] token: &str,
        #[case] operator: RelationalOperator,
        #[case] value: f64,
    ) -> Result<(), anyhow::Error> {
        let threshold: ThresholdFilter = token.parse()?;

        assert_eq!(threshold.operator, operator);
        assert_eq!(threshold.value, value);

        Ok(())
    }

    #[rstest]
    #[case("0.01")]
    #[case("==0.01")]
    #[case("<abc")]
    #[case("<")]
    #[case("")]
    fn malformed_threshold_tokens(#[case] token: &str) {
        assert_eq!(
            token.parse::<ThresholdFilter>(),
            Err(ValidationError::MalformedThreshold(token.to_owned()))
        );
    }

    #[rstest]
    #[case(RelationalOperator::Lt, 0.1, 0.2, true)]
    #[case(RelationalOperator::Lt, 0.2, 0.2, false)]
    #[case(RelationalOperator::Lte, 0.2, 0.2, true)]
    #[case(RelationalOperator::Eq, 0.2, 0.2, true)]
    #[case(RelationalOperator::Eq, 0.2, 0.3, false)]
    #[case(RelationalOperator::Gt, 0.3, 0.2, true)]
    #[case(RelationalOperator::Gt, 0.2, 0.2, false)]
    #[case(RelationalOperator::Gte, 0.2, 0.2, true)]
    fn relational_operator_sense(
        #[case] operator: RelationalOperator,
        #[case] lhs: f64,
        #[case] rhs: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(operator.compare(lhs, rhs), expected);
    }

    #[test]
    fn operator_tokens_round_trip() -> Result<(), anyhow::Error> {
        for operator in RelationalOperator::iter() {
            assert_eq!(
                operator.to_string().parse::<RelationalOperator>()?,
                operator
            );
        }

        Ok(())
    }

    #[test]
    fn minimal_request_yields_region_and_allele_filters() -> Result<(), anyhow::Error> {
        let request = request();
        let start = resolve_start(request.start, None, None)?;
        let end = resolve_end(&request.reference_name, None, None, None)?;

        let filters = beacon_filters(&request, start.clone(), end)?;

        assert_eq!(
            filters,
            vec![
                FilterPredicate::Region(Coordinate::Start, start),
                FilterPredicate::Allele {
                    reference: Some("A".into()),
                    alternate: Some("T".into()),
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn non_trivial_end_region_is_emitted() -> Result<(), anyhow::Error> {
        let request = BeaconAlleleRequest {
            end_min: Some(1900),
            end_max: Some(2100),
            ..request()
        };
        let start = resolve_start(request.start, None, None)?;
        let end = resolve_end(
            &request.reference_name,
            request.end,
            request.end_min,
            request.end_max,
        )?;

        let filters = beacon_filters(&request, start, end.clone())?;

        assert!(filters.contains(&FilterPredicate::Region(Coordinate::End, end)));

        Ok(())
    }

    #[test]
    fn unrecognized_variant_type_degrades_to_absent() -> Result<(), anyhow::Error> {
        let request = BeaconAlleleRequest {
            variant_type: Some("FUNKY".into()),
            ..request()
        };
        let start = resolve_start(request.start, None, None)?;
        let end = resolve_end(&request.reference_name, None, None, None)?;

        let filters = beacon_filters(&request, start, end)?;

        assert!(!filters
            .iter()
            .any(|f| matches!(f, FilterPredicate::VariantType(_))));

        Ok(())
    }

    #[test]
    fn recognized_variant_type_is_emitted() -> Result<(), anyhow::Error> {
        let request = BeaconAlleleRequest {
            alternate_bases: None,
            variant_type: Some("SNV".into()),
            ..request()
        };
        let start = resolve_start(request.start, None, None)?;
        let end = resolve_end(&request.reference_name, None, None, None)?;

        let filters = beacon_filters(&request, start, end)?;

        assert!(filters.contains(&FilterPredicate::VariantType(VariantType::Snv)));

        Ok(())
    }

    #[test]
    fn annotation_and_study_filters_are_built() -> Result<(), anyhow::Error> {
        let request = BeaconAlleleRequest {
            consequence_type: Some(vec!["SO:0001583".into(), "SO:0001234".into()]),
            maf: Some("<0.01".into()),
            polyphen: Some(">0.5".into()),
            sift: Some("<=0.05".into()),
            dataset_ids: Some(vec!["PRJEB1234".into()]),
            ..request()
        };
        let start = resolve_start(request.start, None, None)?;
        let end = resolve_end(&request.reference_name, None, None, None)?;

        let filters = beacon_filters(&request, start, end)?;

        assert!(filters.contains(&FilterPredicate::ConsequenceType(vec![1583, 1234])));
        assert!(filters.contains(&FilterPredicate::PopulationStat(ThresholdFilter {
            operator: RelationalOperator::Lt,
            value: 0.01,
        })));
        assert!(filters.contains(&FilterPredicate::AnnotationScore(
            ScoreKind::Polyphen,
            ThresholdFilter {
                operator: RelationalOperator::Gt,
                value: 0.5,
            }
        )));
        assert!(filters.contains(&FilterPredicate::AnnotationScore(
            ScoreKind::Sift,
            ThresholdFilter {
                operator: RelationalOperator::Lte,
                value: 0.05,
            }
        )));
        assert!(filters.contains(&FilterPredicate::Study(vec!["PRJEB1234".into()])));

        Ok(())
    }

    #[test]
    fn missing_alternate_and_type_is_rejected() -> Result<(), anyhow::Error> {
        let request = BeaconAlleleRequest {
            alternate_bases: None,
            ..request()
        };
        let start = resolve_start(request.start, None, None)?;
        let end = resolve_end(&request.reference_name, None, None, None)?;

        assert_eq!(
            beacon_filters(&request, start, end),
            Err(ValidationError::MissingAlternateOrType)
        );

        Ok(())
    }

    #[test]
    fn negative_range_bound_is_rejected() -> Result<(), anyhow::Error> {
        let request = request();
        let start = resolve_start(None, Some(-10), Some(10))?;
        let end = resolve_end(&request.reference_name, None, None, None)?;

        assert_eq!(
            beacon_filters(&request, start, end),
            Err(ValidationError::NegativeCoordinate(Coordinate::Start))
        );

        Ok(())
    }
}
