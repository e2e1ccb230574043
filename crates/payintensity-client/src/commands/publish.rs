use std::path::PathBuf;

use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{PublishData, ScriptPublishData};
use crate::derive::OutputTable;
use crate::load::schema::normalize_year_selection;
use crate::publish::script::{render_script_block, write_snippet};
use crate::publish::splice::splice_file;
use crate::publish::tabular::read_metric_table_file;
use crate::{ClientError, ClientResult};

pub const DEFAULT_DECLARATION: &str = "paymentDataPerCapita";

#[derive(Debug, Clone)]
pub struct ScriptTarget {
    pub host: Option<PathBuf>,
    pub declaration: String,
    pub years: Vec<i32>,
    pub snippet_out: Option<PathBuf>,
}

impl ScriptTarget {
    pub fn host(path: PathBuf) -> Self {
        Self {
            host: Some(path),
            declaration: DEFAULT_DECLARATION.to_string(),
            years: Vec::new(),
            snippet_out: None,
        }
    }

    pub(crate) fn validate(&self) -> ClientResult<Vec<i32>> {
        if self.host.is_none() && self.snippet_out.is_none() {
            return Err(ClientError::invalid_argument_with_recovery(
                "Nothing to publish: no host document and no snippet path.",
                vec!["Pass `--host <document>` and/or `--snippet-out <path>`.".to_string()],
            ));
        }
        if self.declaration.trim().is_empty() {
            return Err(ClientError::invalid_argument("Declaration name must not be empty."));
        }
        normalize_year_selection(&self.years)
    }
}

#[derive(Debug, Clone)]
pub struct PublishScriptOptions {
    pub metrics: PathBuf,
    pub target: ScriptTarget,
}

pub fn script(options: PublishScriptOptions) -> ClientResult<SuccessEnvelope> {
    options.target.validate()?;
    let table = read_metric_table_file(&options.metrics)?;
    let script = publish_script(&table, &options.target)?;

    let countries_with_absent_cells = table
        .rows
        .iter()
        .filter(|row| script.years.iter().any(|year| row.value_for(*year).is_none()))
        .map(|row| row.country.clone())
        .collect();

    success(
        "publish script",
        PublishData {
            metrics_path: options.metrics.display().to_string(),
            script,
            countries_with_absent_cells,
        },
    )
}

pub(crate) fn publish_script(
    table: &OutputTable,
    target: &ScriptTarget,
) -> ClientResult<ScriptPublishData> {
    let years = target.validate()?;
    let block = render_script_block(table, &years)?;

    let snippet_path = match &target.snippet_out {
        Some(path) => {
            write_snippet(path, &block)?;
            Some(path.display().to_string())
        }
        None => None,
    };

    let splice = match &target.host {
        Some(host) => Some(splice_file(host, &target.declaration, &block)?),
        None => None,
    };

    Ok(ScriptPublishData {
        declaration: target.declaration.clone(),
        years,
        countries: table.rows.len(),
        splice,
        snippet_path,
    })
}
