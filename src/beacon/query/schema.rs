//! Data structures for beacon allele requests and responses.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Identifier under which this beacon announces itself.
pub const BEACON_ID: &str = "variant-archive-beacon";

/// Version of the beacon allele query contract.
pub const API_VERSION: &str = "v1.0";

/// HTTP-equivalent status for client-caused failures.
pub const STATUS_BAD_REQUEST: u16 = 400;

/// Error for client-caused query failures.
///
/// These are always rendered into the response envelope; they never abort
/// the worker.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please provide a valid assemblyId (got {0:?})")]
    UnknownAssembly(String),
    #[error("please provide a positive {0} number")]
    NegativeCoordinate(super::region::Coordinate),
    #[error("please provide either alternateBases or variantType")]
    MissingAlternateOrType,
    #[error("malformed ontology term {0:?}")]
    MalformedOntologyTerm(String),
    #[error("malformed threshold {0:?}, expected e.g. \"<0.01\"")]
    MalformedThreshold(String),
}

/// Classification of a variant by its allele content.
#[derive(
    Serialize, Deserialize, EnumString, Display, PartialEq, Eq, Debug, Clone, Copy, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VariantType {
    /// Single nucleotide variant.
    Snv,
    /// Multi nucleotide variant.
    Mnv,
    /// Insertion or deletion.
    Indel,
    /// Structural variant.
    Sv,
    /// Copy number variant.
    Cnv,
}

/// Modes for reporting dataset-level membership.
#[derive(EnumString, Display, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum IncludeDatasetResponses {
    /// Do not report dataset membership.
    #[default]
    None,
    /// Report the datasets the allele was found in.
    Hit,
    /// Report the requested datasets the allele was not found in.
    Miss,
    /// Report membership for every requested dataset.
    All,
}

/// A beacon allele request as received from the transport layer.
///
/// All optional parameters are modeled as `Option`, never as sentinel
/// values; the request is echoed verbatim in the response envelope.
#[derive(Serialize, Deserialize, PartialEq, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct BeaconAlleleRequest {
    /// Chromosome the query refers to.
    pub reference_name: String,
    /// Exact start position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// Lower bound of the start position range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_min: Option<i64>,
    /// Upper bound of the start position range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_max: Option<i64>,
    /// Exact end position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    /// Lower bound of the end position range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_min: Option<i64>,
    /// Upper bound of the end position range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_max: Option<i64>,
    /// Reference allele content.
    pub reference_bases: String,
    /// Alternate allele content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_bases: Option<String>,
    /// Variant type token, parsed leniently.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_type: Option<String>,
    /// Genome assembly the query is routed by.
    pub assembly_id: String,
    /// Datasets to restrict the match set to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_ids: Option<Vec<String>>,
    /// Dataset membership reporting mode token, parsed leniently.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_dataset_responses: Option<String>,
    /// Consequence-type ontology terms, e.g. `"SO:0001583"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consequence_type: Option<Vec<String>>,
    /// Minor allele frequency threshold, e.g. `"<0.01"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maf: Option<String>,
    /// Polyphen score threshold, e.g. `">0.5"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polyphen: Option<String>,
    /// SIFT score threshold, e.g. `"<=0.05"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sift: Option<String>,
}

impl BeaconAlleleRequest {
    /// The dataset membership reporting mode.
    ///
    /// Unrecognized and absent tokens degrade to `None` mode instead of
    /// failing the request.
    pub fn dataset_response_mode(&self) -> IncludeDatasetResponses {
        self.include_dataset_responses
            .as_deref()
            .and_then(|token| token.parse().ok())
            .unwrap_or_default()
    }
}

/// Error payload embedded in a beacon response.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BeaconError {
    /// HTTP-equivalent status code.
    pub error_code: u16,
    /// Human-readable error message.
    pub error_message: String,
}

impl BeaconError {
    /// Render a validation failure as a "bad request" error payload.
    pub fn bad_request(error: &ValidationError) -> Self {
        BeaconError {
            error_code: STATUS_BAD_REQUEST,
            error_message: error.to_string(),
        }
    }
}

/// Dataset-level presence information.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DatasetAlleleResponse {
    /// Identifier of the dataset.
    pub dataset_id: String,
    /// Whether the queried allele was found in the dataset.
    pub exists: bool,
}

impl DatasetAlleleResponse {
    pub fn new(dataset_id: &str, exists: bool) -> Self {
        DatasetAlleleResponse {
            dataset_id: dataset_id.to_owned(),
            exists,
        }
    }
}

/// Response envelope for a beacon allele query.
///
/// Absent optional sections are omitted from serialization rather than
/// written as `null`.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BeaconAlleleResponse {
    /// Identifier of the answering beacon.
    pub beacon_id: String,
    /// Version of the query contract.
    pub api_version: String,
    /// Whether a matching variant exists; absent on errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
    /// Echo of the normalized request.
    pub allele_request: BeaconAlleleRequest,
    /// Error payload; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BeaconError>,
    /// Dataset membership section; absent in `NONE` mode and on errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_allele_responses: Option<Vec<DatasetAlleleResponse>>,
}

impl BeaconAlleleResponse {
    /// Assemble the envelope for a failed query.
    pub fn with_error(request: BeaconAlleleRequest, error: &ValidationError) -> Self {
        BeaconAlleleResponse {
            beacon_id: BEACON_ID.to_owned(),
            api_version: API_VERSION.to_owned(),
            exists: None,
            allele_request: request,
            error: Some(BeaconError::bad_request(error)),
            dataset_allele_responses: None,
        }
    }

    /// Assemble the envelope for an answered query.
    pub fn with_result(
        request: BeaconAlleleRequest,
        exists: bool,
        dataset_allele_responses: Option<Vec<DatasetAlleleResponse>>,
    ) -> Self {
        BeaconAlleleResponse {
            beacon_id: BEACON_ID.to_owned(),
            api_version: API_VERSION.to_owned(),
            exists: Some(exists),
            allele_request: request,
            error: None,
            dataset_allele_responses,
        }
    }
}
