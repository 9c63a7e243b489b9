//! Resolution of point-vs-range coordinates into genomic regions.

use serde::{Deserialize, Serialize};

use super::schema::ValidationError;

/// The coordinate of a variant that a region constrains.
#[derive(strum_macros::Display, PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Coordinate {
    Start,
    End,
}

/// Inclusive interval over one coordinate, possibly unbounded on either side.
///
/// A point query resolves to `lower_bound == upper_bound`.  The start-side
/// region carries no chromosome of its own; the end-side region is tagged
/// with the query's chromosome.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Default, Clone)]
pub struct GenomicRegion {
    /// Chromosome the region is anchored to, if any.
    pub chromosome: Option<String>,
    /// Inclusive lower bound.
    pub lower_bound: Option<i64>,
    /// Inclusive upper bound.
    pub upper_bound: Option<i64>,
}

impl GenomicRegion {
    /// Whether the region constrains anything at all.
    pub fn is_trivial(&self) -> bool {
        self.lower_bound.is_none() && self.upper_bound.is_none()
    }
}

/// Resolve the start-side coordinate values into a region.
///
/// An `exact` value wins over the `min`/`max` pair and yields the point
/// region `[exact, exact]`.
pub fn resolve_start(
    exact: Option<i64>,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<GenomicRegion, ValidationError> {
    resolve(Coordinate::Start, None, exact, min, max)
}

/// Resolve the end-side coordinate values into a region tagged with the
/// query's chromosome.
pub fn resolve_end(
    chromosome: &str,
    exact: Option<i64>,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<GenomicRegion, ValidationError> {
    resolve(
        Coordinate::End,
        Some(chromosome.to_owned()),
        exact,
        min,
        max,
    )
}

fn resolve(
    coordinate: Coordinate,
    chromosome: Option<String>,
    exact: Option<i64>,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<GenomicRegion, ValidationError> {
    if let Some(exact) = exact {
        if exact < 0 {
            return Err(ValidationError::NegativeCoordinate(coordinate));
        }
        Ok(GenomicRegion {
            chromosome,
            lower_bound: Some(exact),
            upper_bound: Some(exact),
        })
    } else {
        Ok(GenomicRegion {
            chromosome,
            lower_bound: min,
            upper_bound: max,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some(1000), None, None, Some(1000), Some(1000))]
    // `exact` wins over a simultaneously supplied range
    #[case(Some(0), Some(1), Some(2), Some(0), Some(0))]
    #[case(None, Some(500), Some(1500), Some(500), Some(1500))]
    #[case(None, Some(500), None, Some(500), None)]
    #[case(None, None, Some(1500), None, Some(1500))]
    #[case(None, None, None, None, None)]
    fn start_resolution(
        #[case] exact: Option<i64>,
        #[case] min: Option<i64>,
        #[case] max: Option<i64>,
        #[case] expected_lower: Option<i64>,
        #[case] expected_upper: Option<i64>,
    ) -> Result<(), anyhow::Error> {
        let region = resolve_start(exact, min, max)?;

        assert_eq!(region.chromosome, None);
        assert_eq!(region.lower_bound, expected_lower);
        assert_eq!(region.upper_bound, expected_upper);

        Ok(())
    }

    #[test]
    fn end_region_is_tagged_with_chromosome() -> Result<(), anyhow::Error> {
        let region = resolve_end("1", Some(2000), None, None)?;

        assert_eq!(region.chromosome.as_deref(), Some("1"));
        assert_eq!(region.lower_bound, Some(2000));
        assert_eq!(region.upper_bound, Some(2000));

        Ok(())
    }

    #[test]
    fn negative_exact_start_is_rejected() {
        let err = resolve_start(Some(-1), None, None).unwrap_err();
        assert_eq!(err, ValidationError::NegativeCoordinate(Coordinate::Start));
        assert_eq!(err.to_string(), "please provide a positive start number");
    }

    #[test]
    fn negative_exact_end_is_rejected() {
        let err = resolve_end("1", Some(-5), None, None).unwrap_err();
        assert_eq!(err, ValidationError::NegativeCoordinate(Coordinate::End));
        assert_eq!(err.to_string(), "please provide a positive end number");
    }

    #[test]
    fn unbounded_region_is_trivial() -> Result<(), anyhow::Error> {
        assert!(resolve_start(None, None, None)?.is_trivial());
        assert!(!resolve_start(Some(0), None, None)?.is_trivial());
        assert!(!resolve_end("1", None, None, Some(10))?.is_trivial());

        Ok(())
    }
}
