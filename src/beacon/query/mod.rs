//! Code implementing the "beacon query" sub command.

pub mod aggregate;
pub mod criteria;
pub mod filter;
pub mod ontology;
pub mod region;
pub mod schema;

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use clap::Parser;

use crate::beacon::store::{StoreError, Stores, VariantStore};
use crate::common::GenomeRelease;

use self::criteria::Criteria;
use self::schema::{BeaconAlleleRequest, BeaconAlleleResponse, ValidationError};

/// Command line arguments for `beacon query` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Run a beacon allele query", long_about = None)]
pub struct Args {
    /// Path to the directory with the per-assembly variant store files.
    #[arg(long, required = true)]
    pub path_db: String,
    /// Path to the beacon allele request JSON file.
    #[arg(long, required = true)]
    pub path_query_json: String,
    /// Optional path to the output JSON file; stdout is used otherwise.
    #[arg(long)]
    pub path_output: Option<String>,
}

/// Resolve the regions from the request and compile its filters.
fn compile_request(request: &BeaconAlleleRequest) -> Result<Criteria, ValidationError> {
    let start = region::resolve_start(request.start, request.start_min, request.start_max)?;
    let end = region::resolve_end(
        &request.reference_name,
        request.end,
        request.end_min,
        request.end_max,
    )?;
    let filters = filter::beacon_filters(request, start, end)?;
    Ok(criteria::compile(&filters))
}

/// Answer one beacon allele query against the given stores.
///
/// Client-caused failures are folded into an error envelope; store failures
/// propagate as `StoreError` and produce no partial response.
pub fn handle_query(
    request: &BeaconAlleleRequest,
    stores: &Stores,
) -> Result<BeaconAlleleResponse, StoreError> {
    let release = match request.assembly_id.parse::<GenomeRelease>() {
        Ok(release) => release,
        Err(_) => {
            return Ok(BeaconAlleleResponse::with_error(
                request.clone(),
                &ValidationError::UnknownAssembly(request.assembly_id.clone()),
            ))
        }
    };

    let criteria = match compile_request(request) {
        Ok(criteria) => criteria,
        Err(error) => {
            tracing::debug!("invalid beacon request: {}", &error);
            return Ok(BeaconAlleleResponse::with_error(request.clone(), &error));
        }
    };

    let store = stores.get(release)?;
    let records = store.find_variants(&request.reference_name, &criteria)?;
    tracing::debug!(
        "criteria {:?} matched {} records",
        &criteria,
        records.len()
    );

    let dataset_allele_responses = aggregate::dataset_allele_responses(&records, request);
    Ok(BeaconAlleleResponse::with_result(
        request.clone(),
        !records.is_empty(),
        dataset_allele_responses,
    ))
}

/// Main entry point for `beacon query` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    tracing::info!("Loading query...");
    let request: BeaconAlleleRequest = serde_json::from_reader(
        File::open(&args.path_query_json)
            .map_err(|e| anyhow::anyhow!("could not open {:?}: {}", &args.path_query_json, e))?,
    )?;
    tracing::info!("... done loading query = {}", &serde_json::to_string(&request)?);

    tracing::info!("Loading variant stores...");
    let before_loading = Instant::now();
    let stores = Stores::load(Path::new(&args.path_db))?;
    tracing::info!("... done loading stores in {:?}", before_loading.elapsed());

    tracing::info!("Running query...");
    let before_query = Instant::now();
    let response = handle_query(&request, &stores)?;
    tracing::info!("... done running query in {:?}", before_query.elapsed());
    match (&response.exists, &response.error) {
        (Some(exists), _) => tracing::info!("summary: exists = {}", exists),
        (_, Some(error)) => tracing::warn!("query rejected: {}", &error.error_message),
        _ => (),
    }

    if let Some(path_output) = &args.path_output {
        let file = File::create(path_output)
            .map_err(|e| anyhow::anyhow!("could not create {:?}: {}", path_output, e))?;
        serde_json::to_writer_pretty(file, &response)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    tracing::info!(
        "All of `beacon query` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
