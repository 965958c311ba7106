//! `prefixdb inspect`: show the records matching addresses or networks.

use std::io::Write;
use std::net::IpAddr;

use ipnetwork::IpNetwork;
use prefixdb::dataset::parse_network;
use serde::Serialize;
use serde_json::Value;

use crate::cli::InspectArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct QueryResult {
    query: String,
    records: Vec<Found>,
}

#[derive(Debug, Serialize)]
struct Found {
    network: String,
    record: Value,
}

pub(super) fn run(args: &InspectArgs, settings: &Settings, out: &mut dyn Write) -> Result<(), CliError> {
    let store = super::load_store(&args.input, settings)?;
    let results = args
        .queries
        .iter()
        .map(|query| {
            let network = parse_query(query)?;
            let records = store
                .networks_within(network)
                .into_iter()
                .map(|(found, record)| Found {
                    network: found.to_string(),
                    record: record.to_json(),
                })
                .collect();
            Ok(QueryResult {
                query: query.clone(),
                records,
            })
        })
        .collect::<Result<Vec<_>, CliError>>()?;
    output::render(&results, settings.format, out)
}

/// A bare address is treated as a host network.
fn parse_query(query: &str) -> Result<IpNetwork, CliError> {
    let invalid = |message: String| CliError::InvalidQuery {
        query: query.to_owned(),
        message,
    };
    if query.contains('/') {
        parse_network(query).map_err(|err| invalid(err.to_string()))
    } else {
        query
            .parse::<IpAddr>()
            .map(IpNetwork::from)
            .map_err(|err| invalid(err.to_string()))
    }
}
