//! Aggregation of per-study presence into dataset allele responses.

use itertools::Itertools;

use crate::beacon::store::VariantRecord;

use super::schema::{BeaconAlleleRequest, DatasetAlleleResponse, IncludeDatasetResponses};

/// Collect the distinct study ids appearing in any source entry of the
/// matched records, in first-appearance order.
pub fn studies_present(records: &[VariantRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.source_entries.iter())
        .map(|entry| entry.study_id.clone())
        .unique()
        .collect()
}

/// Render dataset membership for the request's response mode.
///
/// Presence is read from the matched records only; a `datasetIds` filter
/// narrows the match set first and thereby also what can be reported here.
pub fn dataset_allele_responses(
    records: &[VariantRecord],
    request: &BeaconAlleleRequest,
) -> Option<Vec<DatasetAlleleResponse>> {
    let present = studies_present(records);
    let requested = request.dataset_ids.as_deref().unwrap_or(&[]);

    match request.dataset_response_mode() {
        IncludeDatasetResponses::None => None,
        IncludeDatasetResponses::Hit => Some(
            present
                .iter()
                .map(|study| DatasetAlleleResponse::new(study, true))
                .collect(),
        ),
        IncludeDatasetResponses::Miss => Some(
            requested
                .iter()
                .filter(|study| !present.contains(study))
                .map(|study| DatasetAlleleResponse::new(study, false))
                .collect(),
        ),
        IncludeDatasetResponses::All => Some(
            requested
                .iter()
                .map(|study| DatasetAlleleResponse::new(study, present.contains(study)))
                .collect(),
        ),
    }
}
