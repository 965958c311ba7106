//! Drives `prefixdb` subcommands end to end against temporary files.

use anyhow::{Result, anyhow};
use clap::Parser;
use prefixdb::{EngineError, StoreError};
use prefixdb_cli::{Cli, CliError};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use test_helpers::dataset::DatasetBuilder;
use test_helpers::env;
use test_helpers::files::Workspace;

fn run(args: &[&str]) -> Result<String, CliError> {
    let cli = Cli::try_parse_from(std::iter::once("prefixdb").chain(args.iter().copied()))
        .expect("arguments parse");
    let mut out = Vec::new();
    prefixdb_cli::run(&cli, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn ok(args: &[&str]) -> Result<String> {
    run(args).map_err(|err| anyhow!("prefixdb {}: {err}", args.join(" ")))
}

#[fixture]
fn workspace() -> Workspace {
    Workspace::new().expect("temporary workspace")
}

fn base_dataset() -> Value {
    DatasetBuilder::new()
        .schema(json!({"asn": "uint"}))
        .entry("8.8.0.0/16", "replace", json!({"asn": 15169, "org": "Google"}))
        .entry("1.1.1.0/24", "replace", json!({"asn": 13335, "org": "Cloudflare"}))
        .remove("8.8.8.0/24")
        .build()
}

fn generate(workspace: &Workspace) -> Result<String> {
    let input = workspace.write_json("base.json", &base_dataset())?;
    let output = workspace.path("base.prefixdb");
    ok(&["generate", "-i", input.as_str(), "-o", output.as_str()])?;
    Ok(output.into_string())
}

fn inspect(db: &str, query: &str) -> Result<Value> {
    let text = ok(&["inspect", "-i", db, "--format", "json", query])?;
    Ok(serde_json::from_str(&text)?)
}

#[rstest]
fn generate_then_inspect(workspace: Workspace) -> Result<()> {
    let _env = env::isolated();
    let db = generate(&workspace)?;

    assert_eq!(
        inspect(&db, "1.1.1.1")?,
        json!([{
            "query": "1.1.1.1",
            "records": [{"network": "1.1.1.0/24", "record": {"asn": 13335, "org": "Cloudflare"}}]
        }])
    );
    assert_eq!(
        inspect(&db, "8.8.8.8")?,
        json!([{"query": "8.8.8.8", "records": []}])
    );
    let within = inspect(&db, "8.8.0.0/16")?;
    assert_eq!(
        within.pointer("/0/records/0/network"),
        Some(&json!("8.8.0.0/16"))
    );
    Ok(())
}

#[rstest]
fn inspect_renders_yaml(workspace: Workspace) -> Result<()> {
    let _env = env::isolated();
    let db = generate(&workspace)?;
    let text = ok(&["inspect", "-i", db.as_str(), "--format", "yaml", "1.1.1.1"])?;
    assert!(text.contains("network: 1.1.1.0/24"), "{text}");
    assert!(text.contains("org: Cloudflare"), "{text}");
    Ok(())
}

#[rstest]
fn metadata_reports_build_epoch(workspace: Workspace) -> Result<()> {
    let _env = env::isolated();
    let db = generate(&workspace)?;
    let text = ok(&["metadata", "-i", db.as_str(), "--format", "json"])?;
    let metadata: Value = serde_json::from_str(&text)?;
    assert_eq!(metadata["DatabaseType"], "Test-ASN");
    assert_eq!(metadata["IPVersion"], 6);
    assert!(metadata["BuildEpoch"].is_u64());
    Ok(())
}

#[rstest]
fn update_merges_into_a_new_file(workspace: Workspace) -> Result<()> {
    let _env = env::isolated();
    let db = generate(&workspace)?;
    let update = workspace.write_json(
        "update.json",
        &DatasetBuilder::new()
            .without_metadata()
            .entry("1.1.1.0/24", "top_level_merge", json!({"anycast": true}))
            .build(),
    )?;
    let updated = workspace.path("updated.prefixdb");
    workspace.write("updated.prefixdb", "stale")?;

    let summary = ok(&[
        "update", "-i", db.as_str(), "-d", update.as_str(), "-o", updated.as_str(),
    ])?;
    assert!(summary.contains("with 1 entries"), "{summary}");
    assert_eq!(
        inspect(updated.as_str(), "1.1.1.1")?.pointer("/0/records/0/record"),
        Some(&json!({"asn": 13335, "org": "Cloudflare", "anycast": true}))
    );
    assert_eq!(
        inspect(&db, "1.1.1.1")?.pointer("/0/records/0/record/anycast"),
        None
    );
    Ok(())
}

#[rstest]
fn dump_round_trips_through_generate(workspace: Workspace) -> Result<()> {
    let _env = env::isolated();
    let db = generate(&workspace)?;
    let dumped = workspace.path("dump.json");
    ok(&["dump", "-i", db.as_str(), "-o", dumped.as_str()])?;

    let document = workspace.read_json("dump.json")?;
    assert_eq!(document["version"], "v1");
    assert_eq!(document["metadata"]["DatabaseType"], "Test-ASN");
    let methods: Vec<&str> = document["dataset"]
        .as_array()
        .map(|entries| entries.iter().filter_map(|e| e["method"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(methods, vec!["replace", "replace", "remove"]);

    let rebuilt = workspace.path("rebuilt.prefixdb");
    ok(&["generate", "-i", dumped.as_str(), "-o", rebuilt.as_str()])?;
    for query in ["1.1.1.1", "8.8.4.4", "8.8.8.8"] {
        assert_eq!(inspect(rebuilt.as_str(), query)?, inspect(&db, query)?, "{query}");
    }
    Ok(())
}

#[rstest]
fn verify_accepts_generated_databases(workspace: Workspace) -> Result<()> {
    let _env = env::isolated();
    let db = generate(&workspace)?;
    let text = ok(&["verify", "-i", db.as_str()])?;
    assert!(text.contains("valid (3 entries)"), "{text}");
    Ok(())
}

#[rstest]
fn verify_fails_on_damaged_databases(workspace: Workspace) -> Result<()> {
    let _env = env::isolated();
    generate(&workspace)?;
    let mut snapshot = workspace.read_json("base.prefixdb")?;
    snapshot["format_version"] = json!(99);
    workspace.write_json("base.prefixdb", &snapshot)?;

    let db = workspace.path("base.prefixdb");
    let err = run(&["verify", "-i", db.as_str()]).expect_err("verification fails");
    assert!(
        matches!(err, CliError::VerificationFailed { problems: 1, .. }),
        "{err}"
    );
    Ok(())
}

#[rstest]
fn failing_entries_stop_generation_unless_continuing(workspace: Workspace) -> Result<()> {
    let _env = env::isolated();
    let input = workspace.write_json(
        "bad.json",
        &DatasetBuilder::new()
            .entry("1.1.1.0/24", "replace", json!({"asn": 13335}))
            .entry("8.8.8.0/24", "overwrite", json!({"asn": 15169}))
            .build(),
    )?;
    let output = workspace.path("bad.prefixdb");

    let err = run(&["generate", "-i", input.as_str(), "-o", output.as_str()])
        .expect_err("unknown method fails");
    assert!(
        matches!(err, CliError::Engine(EngineError::UnsupportedMethod { .. })),
        "{err}"
    );
    assert!(err.to_string().starts_with("record 2 (network: 8.8.8.0/24)"), "{err}");

    let summary = ok(&[
        "generate", "-i", input.as_str(), "-o", output.as_str(), "--continue-on-error",
    ])?;
    assert!(summary.contains("from 1 entries"), "{summary}");
    Ok(())
}

#[rstest]
fn reserved_networks_need_an_explicit_flag(workspace: Workspace) -> Result<()> {
    let _env = env::isolated();
    let input = workspace.write_json(
        "private.json",
        &DatasetBuilder::new()
            .entry("192.168.1.0/24", "replace", json!({"site": "lab"}))
            .build(),
    )?;
    let output = workspace.path("private.prefixdb");

    let err = run(&["generate", "-i", input.as_str(), "-o", output.as_str()])
        .expect_err("reserved network is rejected");
    assert!(
        matches!(
            err,
            CliError::Engine(EngineError::Store {
                source: StoreError::ReservedNetwork { .. },
                ..
            })
        ),
        "{err}"
    );

    ok(&[
        "generate", "-i", input.as_str(), "-o", output.as_str(), "--include-reserved-networks",
    ])?;
    assert_eq!(
        inspect(output.as_str(), "192.168.1.1")?.pointer("/0/records/0/record"),
        Some(&json!({"site": "lab"}))
    );
    Ok(())
}

#[rstest]
fn strict_mode_can_come_from_the_environment(workspace: Workspace) -> Result<()> {
    let mut held = env::isolated();
    let input = workspace.write_json(
        "typed.json",
        &DatasetBuilder::new()
            .schema(json!({"asn": "uint"}))
            .entry("1.1.1.0/24", "replace", json!({"asn": "AS13335"}))
            .build(),
    )?;
    let output = workspace.path("typed.prefixdb");
    ok(&["generate", "-i", input.as_str(), "-o", output.as_str()])?;

    held.set_var("PREFIXDB_STRICT", "true");
    let err = run(&["generate", "-i", input.as_str(), "-o", output.as_str()])
        .expect_err("strict mode rejects the mismatch");
    assert!(
        matches!(err, CliError::Engine(EngineError::Conversion { .. })),
        "{err}"
    );
    Ok(())
}

#[rstest]
#[case(&["generate", "-i", "dataset.txt", "-o", "out.prefixdb"])]
#[case(&["generate", "-i", "dataset.json", "-o", "out.db"])]
#[case(&["verify", "-i", "db.json"])]
fn wrong_extensions_are_rejected(#[case] args: &[&str]) {
    let _env = env::isolated();
    assert!(matches!(run(args), Err(CliError::InvalidExtension { .. })));
}

#[rstest]
fn missing_inputs_are_reported(workspace: Workspace) {
    let _env = env::isolated();
    let input = workspace.path("absent.json");
    let output = workspace.path("out.prefixdb");
    assert!(matches!(
        run(&["generate", "-i", input.as_str(), "-o", output.as_str()]),
        Err(CliError::MissingInput(_))
    ));
}

#[rstest]
fn version_names_the_tool() -> Result<()> {
    let _env = env::isolated();
    let text = ok(&["version"])?;
    assert!(
        text.starts_with(&format!("prefixdb {}\n", env!("CARGO_PKG_VERSION"))),
        "{text}"
    );
    assert!(text.contains("homepage: "), "{text}");
    Ok(())
}
