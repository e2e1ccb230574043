use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use payintensity_client::ClientResult;
use payintensity_client::commands::normalize::{
    self, NormalizeOptions, ReferenceSource,
};
use payintensity_client::commands::publish::ScriptTarget;
use payintensity_client::contracts::envelope::failure_from_error;
use payintensity_client::derive::MetricMode;
use payintensity_client::publish::tabular::read_metric_table_file;
use payintensity_client::reference::codes::CountryCodes;
use payintensity_client::reference::gdp::StaticReference;
use payintensity_client::reference::remote::{
    FetchedSeries, PopulationStrategy, RemoteReference, RemoteStrategyKind,
};
use serde_json::Value;
use tempfile::tempdir;

const HEADER: &str = "Country,2018,2019,2020,2021,2022,2023,2024,2025,Latitude,Longitude";

fn write_file(path: &Path, body: &str) {
    let result = fs::write(path, body);
    assert!(result.is_ok());
}

fn transactions_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("transactions.csv");
    write_file(
        &path,
        &format!(
            "{HEADER}\nX,100,100,100,100,100,100,100,100,1.5,2.5\nY,\"1,000\",10,10,10,10,10,10,10,-3.0,4.0\nZ,7,7,7,7,7,7,7,7,0,0\n"
        ),
    );
    path
}

fn options(dir: &Path, mode: MetricMode, script: Option<ScriptTarget>) -> NormalizeOptions {
    NormalizeOptions {
        input: transactions_fixture(dir),
        output: dir.join("out").join("metrics.csv"),
        mode,
        source: ReferenceSource::StaticGdp { table_path: None },
        script,
    }
}

struct CannedPopulation {
    values: HashMap<String, BTreeMap<i32, f64>>,
}

impl PopulationStrategy for CannedPopulation {
    fn kind(&self) -> RemoteStrategyKind {
        RemoteStrategyKind::Batched
    }

    fn fetch(&self, codes: &[&str], _years: &[i32]) -> ClientResult<FetchedSeries> {
        Ok(FetchedSeries {
            values: self
                .values
                .iter()
                .filter(|(code, _)| codes.contains(&code.as_str()))
                .map(|(code, series)| (code.clone(), series.clone()))
                .collect(),
            failures: Vec::new(),
        })
    }
}

fn canned_remote() -> Option<RemoteReference> {
    let codes = CountryCodes::from_pairs(&[("X", "XXA"), ("Y", "YYA"), ("Z", "ZZA")]).ok()?;
    let series = (2018..=2025)
        .map(|year| (year, 2_000_000.0))
        .collect::<BTreeMap<i32, f64>>();
    let mut partial = series.clone();
    partial.remove(&2025);
    let values = HashMap::from([
        ("XXA".to_string(), series),
        ("YYA".to_string(), partial),
    ]);
    Some(RemoteReference::new(
        codes,
        Box::new(CannedPopulation { values }),
    ))
}

#[test]
fn gdp_percentage_flow_writes_table_and_reports_unresolved_countries() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let resolver = StaticReference::from_pairs("static_gdp", [("X", 50.0), ("Y", 20.0)]);
    assert!(resolver.is_ok());
    let Ok(resolver) = resolver else { return };

    let run_options = options(dir.path(), MetricMode::GdpPercentage, None);
    let result = normalize::run_with_resolver(&run_options, &resolver);
    assert!(result.is_ok());
    let Ok(envelope) = result else { return };

    assert_eq!(envelope.command, "normalize");
    assert_eq!(envelope.data["mode"], "gdp_percentage");
    assert_eq!(envelope.data["reference_source"], "static_gdp");
    assert_eq!(envelope.data["summary"]["countries_total"], 3);
    assert_eq!(envelope.data["summary"]["countries_fully_processed"], 2);
    assert_eq!(envelope.data["summary"]["countries_without_metrics"], 1);
    assert_eq!(envelope.data["unresolved_countries"], serde_json::json!(["Z"]));
    assert_eq!(envelope.data["unresolved"][0]["country"], "Z");
    assert_eq!(envelope.data["unresolved"][0]["reason"], "no_reference_entry");
    assert_eq!(envelope.data["highlights"]["year"], 2025);
    assert_eq!(envelope.data["highlights"]["highest"]["country"], "X");

    let table = read_metric_table_file(&run_options.output);
    assert!(table.is_ok());
    let Ok(table) = table else { return };
    let x = table.row("X");
    assert_eq!(x.and_then(|row| row.value_for(2025)), Some(200.0));
    let y = table.row("Y");
    assert_eq!(y.and_then(|row| row.value_for(2018)), Some(5000.0));
    assert_eq!(y.and_then(|row| row.value_for(2019)), Some(50.0));
    let z = table.row("Z");
    assert!(z.is_some_and(|row| row.is_empty()));
    assert_eq!(z.map(|row| row.latitude.as_str()), Some("0"));

    let written = fs::read_to_string(&run_options.output);
    assert!(written.is_ok());
    if let Ok(written) = written {
        assert!(written.starts_with(HEADER));
        assert!(written.contains("\nX,200.00,200.00,200.00,200.00,200.00,200.00,200.00,200.00,1.5,2.5\n"));
        assert!(written.contains("\nZ,,,,,,,,,0,0\n"));
    }
}

#[test]
fn per_capita_flow_resolves_population_and_leaves_gaps_absent() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let Some(resolver) = canned_remote() else {
        panic!("canned remote reference should build");
    };

    let run_options = options(dir.path(), MetricMode::PerCapita, None);
    let result = normalize::run_with_resolver(&run_options, &resolver);
    assert!(result.is_ok());
    let Ok(envelope) = result else { return };

    assert_eq!(envelope.data["reference_source"], "remote_population:batched");
    assert_eq!(envelope.data["summary"]["countries_partial"], 1);

    let unresolved = envelope.data["unresolved"].as_array().cloned().unwrap_or_default();
    let reasons = unresolved
        .iter()
        .map(|entry| {
            (
                entry["country"].as_str().unwrap_or_default().to_string(),
                entry["year"].as_i64(),
                entry["reason"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect::<Vec<(String, Option<i64>, String)>>();
    assert_eq!(
        reasons,
        vec![
            ("Y".to_string(), Some(2025), "no_observation".to_string()),
            ("Z".to_string(), None, "no_observation".to_string()),
        ]
    );

    let table = read_metric_table_file(&run_options.output);
    assert!(table.is_ok());
    let Ok(table) = table else { return };
    assert_eq!(table.row("X").and_then(|row| row.value_for(2020)), Some(50000.0));
    assert_eq!(table.row("Y").and_then(|row| row.value_for(2024)), Some(5000.0));
    assert_eq!(table.row("Y").and_then(|row| row.value_for(2025)), None);
}

#[test]
fn zero_reference_yields_absent_cell_and_report_entry() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let resolver =
        StaticReference::from_pairs("static_gdp", [("X", 50.0), ("Y", 0.0), ("Z", 7.0)]);
    let Ok(resolver) = resolver else {
        panic!("zero is a valid table value");
    };

    let run_options = options(dir.path(), MetricMode::GdpPercentage, None);
    let result = normalize::run_with_resolver(&run_options, &resolver);
    assert!(result.is_ok());
    let Ok(envelope) = result else { return };

    let unresolved = envelope.data["unresolved"].as_array().cloned().unwrap_or_default();
    assert_eq!(unresolved.len(), 8);
    assert!(unresolved.iter().all(|entry| entry["country"] == "Y"));
    assert!(unresolved.iter().all(|entry| entry["reason"] == "zero_reference"));
    assert_eq!(unresolved[0]["year"], 2018);
    assert_eq!(envelope.data["summary"]["cells_absent"], 8);
}

#[test]
fn empty_input_is_malformed_and_writes_nothing() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let input = dir.path().join("empty.csv");
    write_file(&input, &format!("{HEADER}\n"));
    let output = dir.path().join("metrics.csv");

    let result = normalize::run(NormalizeOptions {
        input,
        output: output.clone(),
        mode: MetricMode::GdpPercentage,
        source: ReferenceSource::StaticGdp { table_path: None },
        script: None,
    });
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "malformed_input");
    }
    assert!(!output.exists());
}

#[test]
fn toml_gdp_table_replaces_embedded_values() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let table_path = dir.path().join("gdp.toml");
    write_file(&table_path, "[gdp]\nX = 25.0\nY = 10.0\nZ = 70.0\n");

    let mut run_options = options(dir.path(), MetricMode::GdpPercentage, None);
    run_options.source = ReferenceSource::StaticGdp {
        table_path: Some(table_path),
    };
    let result = normalize::run(run_options.clone());
    assert!(result.is_ok());
    let Ok(envelope) = result else { return };
    assert_eq!(envelope.data["reference_source"], "static_gdp:file");
    assert_eq!(envelope.data["summary"]["countries_fully_processed"], 3);

    let table = read_metric_table_file(&run_options.output);
    assert!(table.is_ok());
    if let Ok(table) = table {
        assert_eq!(table.row("X").and_then(|row| row.value_for(2021)), Some(400.0));
        assert_eq!(table.row("Z").and_then(|row| row.value_for(2021)), Some(10.0));
    }
}

#[test]
fn invalid_toml_gdp_table_is_reported() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let table_path = dir.path().join("gdp.toml");
    write_file(&table_path, "[gdp]\nX = \"lots\"\n");

    let mut run_options = options(dir.path(), MetricMode::GdpPercentage, None);
    run_options.source = ReferenceSource::StaticGdp {
        table_path: Some(table_path),
    };
    let result = normalize::run(run_options);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "reference_table_invalid");
    }
}

#[test]
fn script_target_is_spliced_after_tabular_output() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let host = dir.path().join("index.html");
    write_file(
        &host,
        "<script>\n    const paymentDataPerCapita = {\n        \"Old\": { \"2025\": 1.00 }\n    };\n</script>\n",
    );
    let resolver = StaticReference::from_pairs("static_gdp", [("X", 50.0), ("Y", 20.0)]);
    let Ok(resolver) = resolver else { return };

    let mut target = ScriptTarget::host(host.clone());
    target.years = vec![2025];
    let run_options = options(dir.path(), MetricMode::GdpPercentage, Some(target));
    let result = normalize::run_with_resolver(&run_options, &resolver);
    assert!(result.is_ok());
    let Ok(envelope) = result else { return };
    assert_eq!(envelope.data["script"]["splice"]["changed"], true);
    assert_eq!(envelope.data["script"]["years"], serde_json::json!([2025]));

    let document = fs::read_to_string(&host);
    assert!(document.is_ok());
    if let Ok(document) = document {
        assert_eq!(
            document,
            "<script>\n    const paymentDataPerCapita = {\n        \"X\": { \"2025\": 200.00 },\n        \"Y\": { \"2025\": 50.00 },\n        \"Z\": { \"2025\": null }\n    };\n</script>\n"
        );
    }

    let rerun = normalize::run_with_resolver(&run_options, &resolver);
    assert!(rerun.is_ok());
    if let Ok(envelope) = rerun {
        assert_eq!(envelope.data["script"]["splice"]["changed"], false);
    }
}

#[test]
fn missing_marker_fails_but_keeps_tabular_output() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let host = dir.path().join("index.html");
    write_file(&host, "<script>\n    const somethingElse = {\n    };\n</script>\n");
    let resolver = StaticReference::from_pairs("static_gdp", [("X", 50.0)]);
    let Ok(resolver) = resolver else { return };

    let run_options = options(
        dir.path(),
        MetricMode::GdpPercentage,
        Some(ScriptTarget::host(host.clone())),
    );
    let result = normalize::run_with_resolver(&run_options, &resolver);
    assert!(result.is_err());
    let Err(error) = result else { return };
    assert_eq!(error.code, "splice_target_not_found");

    let failure = serde_json::to_value(failure_from_error(&error));
    assert!(failure.is_ok());
    if let Ok(failure) = failure {
        let tabular = failure["data"]["tabular_output"].as_str().map(PathBuf::from);
        assert_eq!(tabular.as_deref(), Some(run_options.output.as_path()));
    }
    assert!(run_options.output.exists());

    let untouched = fs::read_to_string(&host);
    assert_eq!(
        untouched.ok().as_deref(),
        Some("<script>\n    const somethingElse = {\n    };\n</script>\n")
    );
}

#[test]
fn invalid_script_years_fail_before_any_output() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let resolver = StaticReference::from_pairs("static_gdp", [("X", 50.0)]);
    let Ok(resolver) = resolver else { return };

    let mut target = ScriptTarget::host(dir.path().join("index.html"));
    target.years = vec![2017];
    let run_options = options(dir.path(), MetricMode::GdpPercentage, Some(target));
    let result = normalize::run_with_resolver(&run_options, &resolver);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "invalid_argument");
    }
    assert!(!run_options.output.exists());
}

#[test]
fn unresolved_entries_follow_input_order() {
    let dir = tempdir();
    assert!(dir.is_ok());
    let Ok(dir) = dir else { return };
    let resolver = StaticReference::from_pairs("static_gdp", [("Y", 20.0)]);
    let Ok(resolver) = resolver else { return };

    let run_options = options(dir.path(), MetricMode::GdpPercentage, None);
    let result = normalize::run_with_resolver(&run_options, &resolver);
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        let countries = envelope.data["unresolved"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry["country"].as_str().map(str::to_string))
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default();
        assert_eq!(countries, vec!["X".to_string(), "Z".to_string()]);
        assert!(matches!(envelope.data["highlights"], Value::Object(_)));
    }
}
