use std::{
    collections::BTreeMap,
    error::Error,
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::{db::fingrid::datasets::Dataset, pipeline::FetchedSeries};

/// Key of the production → consumption pairing.
pub const PRODUCTION_VS_CONSUMPTION: &str = "tuotanto_v_kulutus";
/// Key of the production series grouped by source.
pub const PRODUCTION_BY_SOURCE: &str = "tuotanto";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum MergeValue {
    IntMap(BTreeMap<i64, i64>),
    NestedMap(BTreeMap<String, Vec<i64>>),
}

impl MergeValue {
    pub fn as_int_map(&self) -> Option<&BTreeMap<i64, i64>> {
        match self {
            MergeValue::IntMap(data) => Some(data),
            MergeValue::NestedMap(_) => None,
        }
    }

    pub fn as_nested_map(&self) -> Option<&BTreeMap<String, Vec<i64>>> {
        match self {
            MergeValue::NestedMap(data) => Some(data),
            MergeValue::IntMap(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MergedResult(pub BTreeMap<String, MergeValue>);

impl MergedResult {
    pub fn get(&self, key: &str) -> Option<&MergeValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn production_vs_consumption(&self) -> Option<&BTreeMap<i64, i64>> {
        self.get(PRODUCTION_VS_CONSUMPTION)
            .and_then(MergeValue::as_int_map)
    }

    pub fn production_by_source(&self) -> Option<&BTreeMap<String, Vec<i64>>> {
        self.get(PRODUCTION_BY_SOURCE)
            .and_then(MergeValue::as_nested_map)
    }

    /// Write the result as pretty json, creating the parent directory if needed.
    pub fn write_json(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut out, self)?;
        out.flush()?;
        Ok(())
    }
}

/// Pair two series by position.  The result has at most `min(keys, values)`
/// entries, a repeated key keeps the last value paired with it.
pub fn pair_positions(keys: &[i64], values: &[i64]) -> BTreeMap<i64, i64> {
    keys.iter().copied().zip(values.iter().copied()).collect()
}

/// Group the water, nuclear and wind series under their Finnish labels.
/// Series are passed through as is, nothing is aggregated.
pub fn group_by_source(water: &[i64], nuclear: &[i64], wind: &[i64]) -> BTreeMap<String, Vec<i64>> {
    let mut groups: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for (dataset, series) in [
        (Dataset::Water, water),
        (Dataset::Nuclear, nuclear),
        (Dataset::Wind, wind),
    ] {
        if let Some(label) = dataset.label() {
            groups
                .entry(label.to_string())
                .or_default()
                .extend_from_slice(series);
        }
    }
    groups
}

pub fn merge(fetched: &FetchedSeries) -> MergedResult {
    let mut res = BTreeMap::new();
    res.insert(
        PRODUCTION_VS_CONSUMPTION.to_string(),
        MergeValue::IntMap(pair_positions(&fetched.production, &fetched.consumption)),
    );
    res.insert(
        PRODUCTION_BY_SOURCE.to_string(),
        MergeValue::NestedMap(group_by_source(
            &fetched.water,
            &fetched.nuclear,
            &fetched.wind,
        )),
    );
    MergedResult(res)
}
