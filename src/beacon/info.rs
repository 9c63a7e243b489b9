//! Code supporting the `beacon info` sub command.

use std::fs::File;
use std::path::Path;

use clap::Parser;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::beacon::query::schema::{API_VERSION, BEACON_ID};
use crate::beacon::store::Stores;
use crate::common::GenomeRelease;

/// Organization hosting the beacon.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BeaconOrganization {
    pub id: String,
    pub name: String,
}

/// Dataset advertised by the beacon.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BeaconDataset {
    /// Identifier of the dataset, here the store name.
    pub id: String,
    /// Human-readable dataset name.
    pub name: String,
    /// Assembly the dataset is aligned to.
    pub assembly_id: String,
}

/// The static beacon metadata document.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BeaconInfo {
    pub id: String,
    pub name: String,
    pub api_version: String,
    pub description: String,
    pub version: String,
    pub organization: BeaconOrganization,
    /// Datasets available for querying.
    pub datasets: Vec<BeaconDataset>,
}

impl Default for BeaconInfo {
    fn default() -> Self {
        BeaconInfo {
            id: BEACON_ID.to_owned(),
            name: String::from("Variant Archive Beacon"),
            api_version: API_VERSION.to_owned(),
            description: String::from(
                "Answers allele existence queries against the variant archive",
            ),
            version: crate::common::worker_version().to_owned(),
            organization: BeaconOrganization {
                id: String::from("variant-archive"),
                name: String::from("Variant Archive"),
            },
            datasets: Vec::new(),
        }
    }
}

impl BeaconInfo {
    /// Build the metadata document, advertising the stores available under
    /// `path_db` as datasets.
    pub fn with_datasets(stores: &Stores) -> Self {
        let datasets = GenomeRelease::iter()
            .filter(|release| stores.get(*release).is_ok())
            .map(|release| BeaconDataset {
                id: release.store_name().to_owned(),
                name: format!("Variant archive ({})", release.name()),
                assembly_id: release.name(),
            })
            .collect();
        BeaconInfo {
            datasets,
            ..Default::default()
        }
    }
}

/// Command line arguments for `beacon info` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Write the beacon metadata document", long_about = None)]
pub struct Args {
    /// Optional path to the directory with the per-assembly variant store
    /// files; advertised as datasets when given.
    #[arg(long)]
    pub path_db: Option<String>,
    /// Optional path to the output JSON file; stdout is used otherwise.
    #[arg(long)]
    pub path_output: Option<String>,
}

/// Main entry point for `beacon info` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let info = if let Some(path_db) = &args.path_db {
        let stores = Stores::load(Path::new(path_db))?;
        BeaconInfo::with_datasets(&stores)
    } else {
        BeaconInfo::default()
    };

    if let Some(path_output) = &args.path_output {
        let file = File::create(path_output)
            .map_err(|e| anyhow::anyhow!("could not create {:?}: {}", path_output, e))?;
        serde_json::to_writer_pretty(file, &info)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&info)?);
    }

    Ok(())
}
