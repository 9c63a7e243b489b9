//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use indexmap::IndexMap;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Definition of canonical chromosome names.
pub const CHROMS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "X", "Y", "MT",
];

/// Build mapping of chromosome names to chromosome counts.
///
/// Both the plain and the `chr`-prefixed spellings are registered so that
/// queries and store documents can use either.
pub fn build_chrom_map() -> IndexMap<String, usize> {
    let mut result = IndexMap::new();
    for (i, &chrom_name) in CHROMS.iter().enumerate() {
        result.insert(chrom_name.to_owned(), i);
        result.insert(format!("chr{chrom_name}").to_owned(), i);
    }
    result.insert("x".to_owned(), 22);
    result.insert("y".to_owned(), 23);
    result.insert("chrx".to_owned(), 22);
    result.insert("chry".to_owned(), 23);
    result.insert("mt".to_owned(), 24);
    result.insert("m".to_owned(), 24);
    result.insert("chrmt".to_owned(), 24);
    result.insert("chrm".to_owned(), 24);
    result.insert("M".to_owned(), 24);
    result.insert("chrM".to_owned(), 24);
    result
}

/// Select the genome release a query is routed to.
#[derive(
    Clone,
    Copy,
    Debug,
    strum::Display,
    strum::EnumIter,
    PartialEq,
    Eq,
    enum_map::Enum,
    PartialOrd,
    Ord,
    Hash,
)]
pub enum GenomeRelease {
    /// GRCh37 / hg19
    #[strum(serialize = "grch37")]
    Grch37,
    /// GRCh38 / hg38
    #[strum(serialize = "grch38")]
    Grch38,
}

impl GenomeRelease {
    pub fn name(&self) -> String {
        match self {
            GenomeRelease::Grch37 => String::from("GRCh37"),
            GenomeRelease::Grch38 => String::from("GRCh38"),
        }
    }

    /// Name of the variant store that queries for this release are routed to.
    pub fn store_name(&self) -> &'static str {
        match self {
            GenomeRelease::Grch37 => "hsapiens_grch37",
            GenomeRelease::Grch38 => "hsapiens_grch38",
        }
    }
}

impl std::str::FromStr for GenomeRelease {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();
        if s.starts_with("grch37") {
            Ok(GenomeRelease::Grch37)
        } else if s.starts_with("grch38") {
            Ok(GenomeRelease::Grch38)
        } else {
            Err(anyhow::anyhow!("Unknown genome release: {}", s))
        }
    }
}

/// Return the version of the `beacon-worker` crate and `x.y.z` in tests.
pub fn worker_version() -> &'static str {
    if cfg!(test) {
        "x.y.z"
    } else {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn build_chrom_map_covers_all_spellings() {
        let map = super::build_chrom_map();
        assert_eq!(map.get("1"), Some(&0));
        assert_eq!(map.get("chr1"), Some(&0));
        assert_eq!(map.get("X"), Some(&22));
        assert_eq!(map.get("chrY"), Some(&23));
        assert_eq!(map.get("MT"), Some(&24));
        assert_eq!(map.get("chrM"), Some(&24));
        assert_eq!(map.get("HLA-A"), None);
    }

    #[rstest::rstest]
    #[case(crate::common::GenomeRelease::Grch37, "GRCh37")]
    #[case(crate::common::GenomeRelease::Grch38, "GRCh38")]
    fn genome_release_name(#[case] release: crate::common::GenomeRelease, #[case] expected: &str) {
        assert_eq!(expected, release.name());
    }

    #[rstest::rstest]
    #[case(crate::common::GenomeRelease::Grch37, "hsapiens_grch37")]
    #[case(crate::common::GenomeRelease::Grch38, "hsapiens_grch38")]
    fn genome_release_store_name(#[case] release: crate::common::GenomeRelease, #[case] expected: &str) {
        assert_eq!(expected, release.store_name());
    }

    #[rstest::rstest]
    #[case("grch37", crate::common::GenomeRelease::Grch37)]
    #[case("GRCh37", crate::common::GenomeRelease::Grch37)]
    #[case("grch38", crate::common::GenomeRelease::Grch38)]
    #[case("GRCH38", crate::common::GenomeRelease::Grch38)]
    fn genome_release_from_str(
        #[case] s: &str,
        #[case] release: crate::common::GenomeRelease,
    ) -> Result<(), anyhow::Error> {
        let res: crate::common::GenomeRelease = s.parse()?;

        assert_eq!(res, release);

        Ok(())
    }

    #[rstest::rstest]
    #[case("hg19")]
    #[case("hg38")]
    #[case("")]
    fn genome_release_from_str_unknown(#[case] s: &str) {
        assert!(s.parse::<crate::common::GenomeRelease>().is_err());
    }
}
