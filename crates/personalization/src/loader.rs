//! Reads the JSON table documents produced by the data-preparation pipeline.

use retail_core::config::TableOrientation;
use retail_core::{Key, RecoError, RecoResult};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::catalog::{ItemCatalog, ItemMetadata};
use crate::model::LatentFactorModel;
use crate::tables::{InteractionTable, SimilarityTable};

type NestedScores<K> = BTreeMap<K, BTreeMap<K, f64>>;

fn read_json<T: DeserializeOwned>(path: &Path) -> RecoResult<T> {
    let bytes = std::fs::read(path)
        .map_err(|e| RecoError::DataLoad(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| RecoError::DataLoad(format!("failed to parse {}: {e}", path.display())))
}

pub fn load_similarity_table<K>(
    path: impl AsRef<Path>,
    orientation: TableOrientation,
) -> RecoResult<SimilarityTable<K>>
where
    K: Key + DeserializeOwned,
{
    let path = path.as_ref();
    let data: NestedScores<K> = read_json(path)?;
    let table = SimilarityTable::with_orientation(data, orientation)?;
    info!(
        path = %path.display(),
        items = table.len(),
        domain = table.domain().len(),
        "Similarity table loaded"
    );
    Ok(table)
}

pub fn load_interaction_table<K>(path: impl AsRef<Path>) -> RecoResult<InteractionTable<K>>
where
    K: Key + DeserializeOwned,
{
    let path = path.as_ref();
    let data: NestedScores<K> = read_json(path)?;
    let table = InteractionTable::from_users(data)?;
    info!(path = %path.display(), users = table.len(), "Interaction table loaded");
    Ok(table)
}

pub fn load_catalog<K>(
    path: impl AsRef<Path>,
    placeholder_image_url: &str,
) -> RecoResult<ItemCatalog<K>>
where
    K: Key + DeserializeOwned,
{
    let path = path.as_ref();
    let items: BTreeMap<K, ItemMetadata> = read_json(path)?;
    info!(path = %path.display(), items = items.len(), "Item catalog loaded");
    Ok(ItemCatalog::from_items(items, placeholder_image_url))
}

pub fn load_latent_factors<K>(path: impl AsRef<Path>) -> RecoResult<LatentFactorModel<K>>
where
    K: Key + DeserializeOwned,
{
    let path = path.as_ref();
    let model: LatentFactorModel<K> = read_json(path)?;
    model.validate()?;
    info!(
        path = %path.display(),
        users = model.users.len(),
        items = model.items.len(),
        dimensions = model.dimensions,
        "Latent factor model loaded"
    );
    Ok(model)
}
