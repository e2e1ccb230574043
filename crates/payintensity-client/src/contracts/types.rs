use serde::Serialize;

use crate::derive::{MetricMode, YearHighlights};
use crate::publish::splice::SpliceReport;
use crate::reference::UnresolvedEntry;

#[derive(Debug, Clone, Serialize)]
pub struct NormalizeData {
    pub mode: MetricMode,
    pub unit: String,
    pub reference_source: String,
    pub input_path: String,
    pub output_path: String,
    pub years: Vec<i32>,
    pub summary: NormalizeSummary,
    pub unresolved: Vec<UnresolvedEntry>,
    pub unresolved_countries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<YearHighlights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptPublishData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizeSummary {
    pub countries_total: usize,
    pub countries_fully_processed: usize,
    pub countries_partial: usize,
    pub countries_without_metrics: usize,
    pub cells_resolved: usize,
    pub cells_absent: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScriptPublishData {
    pub declaration: String,
    pub years: Vec<i32>,
    pub countries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splice: Option<SpliceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishData {
    pub metrics_path: String,
    pub script: ScriptPublishData,
    pub countries_with_absent_cells: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodesCheckData {
    pub input_path: String,
    pub countries_total: usize,
    pub countries_mapped: usize,
    pub unmapped: Vec<String>,
}
