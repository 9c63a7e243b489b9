//! Decoding of consequence-type ontology terms into internal numeric codes.

use super::schema::ValidationError;

/// Prefix-based decoding rule for one ontology.
///
/// The rule is a plain value so call sites receive it explicitly instead of
/// hardcoding the prefix, and alternative ontology versions can be swapped
/// in.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct OntologyMapping {
    /// Prefix of the external term form, e.g. `"SO:"`.
    pub prefix: &'static str,
}

/// Mapping for Sequence Ontology terms as stored in variant annotations.
pub const SEQUENCE_ONTOLOGY: OntologyMapping = OntologyMapping { prefix: "SO:" };

impl OntologyMapping {
    /// Decode an external term such as `"SO:0001583"` into its internal
    /// numeric code, here `1583`.
    pub fn decode(&self, term: &str) -> Result<u32, ValidationError> {
        let digits = term
            .strip_prefix(self.prefix)
            .ok_or_else(|| ValidationError::MalformedOntologyTerm(term.to_owned()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::MalformedOntologyTerm(term.to_owned()));
        }
        digits
            .parse()
            .map_err(|_| ValidationError::MalformedOntologyTerm(term.to_owned()))
    }
}
