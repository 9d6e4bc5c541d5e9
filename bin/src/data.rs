//! Input document loading for the Ronda CLI.
//!
//! All inputs are JSON files: a fund document per series and a portfolio
//! document for the allocation commands. Loading validates the documents
//! through the engine constructors, so malformed series or matrices fail
//! here with a path-annotated error.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use ndarray::Array2;
use ronda_allocate::{AssetStats, CorrelationMatrix};
use ronda_core::{Date, Frequency, ReturnSeries};
use ronda_report::AllocationInput;
use serde::Deserialize;

/// One observation row of a fund document.
#[derive(Debug, Deserialize)]
pub(crate) struct Observation {
    pub date: Date,
    #[serde(rename = "return")]
    pub periodic_return: f64,
}

/// JSON document describing one fund's return series.
#[derive(Debug, Deserialize)]
pub(crate) struct FundDocument {
    pub fund_id: String,
    pub frequency: Frequency,
    pub observations: Vec<Observation>,
}

impl FundDocument {
    fn into_series(self) -> Result<ReturnSeries> {
        let observations = self
            .observations
            .into_iter()
            .map(|o| (o.date, o.periodic_return))
            .collect();
        ReturnSeries::new(self.fund_id, self.frequency, observations).map_err(Into::into)
    }
}

/// Per-asset summary row of a portfolio document.
#[derive(Debug, Deserialize)]
pub(crate) struct AssetStatsDocument {
    pub expected_return: f64,
    pub volatility: f64,
}

/// Correlation block of a portfolio document.
#[derive(Debug, Deserialize)]
pub(crate) struct CorrelationDocument {
    pub assets: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

/// JSON document describing a portfolio for the allocation commands.
#[derive(Debug, Deserialize)]
pub(crate) struct PortfolioDocument {
    pub weights: BTreeMap<String, f64>,
    pub stats: BTreeMap<String, AssetStatsDocument>,
    pub correlation: CorrelationDocument,
}

/// Load a single fund series from a JSON file.
pub(crate) fn load_fund(path: &Path) -> Result<ReturnSeries> {
    let doc: FundDocument = read_json(path)?;
    doc.into_series()
        .with_context(|| format!("validating {}", path.display()))
}

/// Load an array of fund series from a JSON file.
pub(crate) fn load_funds(path: &Path) -> Result<Vec<ReturnSeries>> {
    let docs: Vec<FundDocument> = read_json(path)?;
    docs.into_iter()
        .map(|doc| {
            doc.into_series()
                .with_context(|| format!("validating {}", path.display()))
        })
        .collect()
}

/// Load a portfolio document and build the allocation input.
pub(crate) fn load_portfolio(path: &Path) -> Result<AllocationInput> {
    let doc: PortfolioDocument = read_json(path)?;

    let n = doc.correlation.assets.len();
    if doc.correlation.matrix.len() != n {
        bail!(
            "{}: correlation matrix has {} rows for {} assets",
            path.display(),
            doc.correlation.matrix.len(),
            n
        );
    }
    let mut flat = Vec::with_capacity(n * n);
    for row in &doc.correlation.matrix {
        if row.len() != n {
            bail!(
                "{}: correlation row has {} entries for {} assets",
                path.display(),
                row.len(),
                n
            );
        }
        flat.extend_from_slice(row);
    }
    let values = Array2::from_shape_vec((n, n), flat)
        .with_context(|| format!("shaping correlation matrix from {}", path.display()))?;
    let correlations = CorrelationMatrix::new(doc.correlation.assets, values)
        .with_context(|| format!("validating correlation matrix from {}", path.display()))?;

    let stats = doc
        .stats
        .into_iter()
        .map(|(asset, s)| {
            (
                asset,
                AssetStats {
                    expected_return: s.expected_return,
                    volatility: s.volatility,
                },
            )
        })
        .collect();

    Ok(AllocationInput {
        weights: doc.weights,
        stats,
        correlations,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
