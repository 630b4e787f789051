//! GeoJSON export for the map client

use crate::{round2, Asset, Result, RiskAssessment, RiskError, REALTIME_DATA_SOURCE};
use chrono::{DateTime, SecondsFormat, Utc};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// RFC 3339 UTC timestamp with second precision, e.g. `2025-01-31T20:42:00Z`
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Point feature at the asset's `[lon, lat]`
pub(crate) fn point_feature(asset: &Asset, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![asset.lon, asset.lat]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Properties common to every asset feature
pub(crate) fn asset_properties(asset: &Asset) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), json!(asset.name));
    properties.insert("asset_type".to_string(), json!(asset.category.as_str()));
    properties.insert("insured_value".to_string(), json!(asset.insured_value));
    properties
}

/// `metadata` member shared by both document kinds
pub(crate) fn metadata(
    generated_at: DateTime<Utc>,
    total_assets: usize,
    data_source: &str,
) -> serde_json::Value {
    json!({
        "generated_at": format_timestamp(generated_at),
        "total_assets": total_assets,
        "data_source": data_source,
    })
}

/// Feature for one assessment with 2-decimal weather and score properties
pub fn assessment_feature(assessment: &RiskAssessment) -> Feature {
    let wx = &assessment.weather;
    let mut properties = asset_properties(&assessment.asset);
    properties.insert("fire_index".to_string(), json!(round2(wx.fire_index)));
    properties.insert("wind_speed".to_string(), json!(round2(wx.wind_speed)));
    properties.insert("temperature".to_string(), json!(round2(wx.temperature)));
    properties.insert("humidity".to_string(), json!(round2(wx.humidity)));
    properties.insert("precipitation".to_string(), json!(round2(wx.precipitation)));
    properties.insert("risk_score".to_string(), json!(round2(assessment.risk_score)));
    properties.insert("risk_level".to_string(), json!(assessment.risk_level.as_str()));

    point_feature(&assessment.asset, properties)
}

/// Wrap assessments in a FeatureCollection with generation metadata
pub fn to_feature_collection(
    assessments: &[RiskAssessment],
    generated_at: DateTime<Utc>,
) -> FeatureCollection {
    let features: Vec<Feature> = assessments.iter().map(assessment_feature).collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert(
        "metadata".to_string(),
        metadata(generated_at, features.len(), REALTIME_DATA_SOURCE),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

/// Pretty-print a collection to `path`, creating parent directories
pub fn write_collection(path: &Path, collection: &FeatureCollection) -> Result<PathBuf> {
    let mut written = write_all(&[(path, collection)])?;
    Ok(written.remove(0))
}

/// Write several collections so that either all of them land or none do
///
/// Each document is staged to a `.tmp` sibling first. Targets are only
/// replaced once every document has been staged.
pub fn write_all(outputs: &[(&Path, &FeatureCollection)]) -> Result<Vec<PathBuf>> {
    let mut staged: Vec<PathBuf> = Vec::with_capacity(outputs.len());

    for (path, collection) in outputs {
        match stage_collection(path, collection) {
            Ok(tmp) => staged.push(tmp),
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }

    for (i, ((path, collection), tmp)) in outputs.iter().zip(&staged).enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            discard(&staged[i..]);
            return Err(e.into());
        }
        debug!(
            "Wrote {} features to {:?}",
            collection.features.len(),
            path
        );
    }

    Ok(outputs.iter().map(|(path, _)| path.to_path_buf()).collect())
}

/// Sibling path the document is written to before it replaces `path`
fn staging_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| RiskError::InvalidOutputPath(path.to_path_buf()))?;

    let mut staged = file_name.to_os_string();
    staged.push(".tmp");
    Ok(path.with_file_name(staged))
}

fn stage_collection(path: &Path, collection: &FeatureCollection) -> Result<PathBuf> {
    let tmp = staging_path(path)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let written = File::create(&tmp).map_err(RiskError::from).and_then(|file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, collection)?;
        writer.flush()?;
        Ok(())
    });

    match written {
        Ok(()) => Ok(tmp),
        Err(e) => {
            discard(std::slice::from_ref(&tmp));
            Err(e)
        }
    }
}

fn discard(staged: &[PathBuf]) {
    for tmp in staged {
        if let Err(e) = fs::remove_file(tmp) {
            warn!("Could not remove staged file {:?}: {}", tmp, e);
        }
    }
}
