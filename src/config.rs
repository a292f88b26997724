use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunables for a pipeline run. Every field has a default, so a partial
/// JSON document (or none at all) is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub census: CensusOptions,
    pub geometry: GeometryOptions,
    pub payload: PayloadOptions,
    pub sampling: SamplingOptions,
    pub schema: SchemaOptions,

    /// Restrict communal views to one region.
    pub target_region: Option<i8>,
}

impl PipelineConfig {
    /// Reads a JSON configuration file; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("reading config {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the geometry passes cannot honor.
    pub fn validate(&self) -> Result<()> {
        let geometry = &self.geometry;
        if !(geometry.tolerance.is_finite() && geometry.tolerance >= 0.0) {
            return Err(Error::Config(format!("geometry.tolerance must be a non-negative number, got {}", geometry.tolerance)));
        }
        if let Some(max_points) = geometry.max_points {
            if max_points < 3 {
                return Err(Error::Config(format!("geometry.max_points must be at least 3, got {max_points}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusOptions {
    /// Rows per streamed chunk.
    pub chunk_size: usize,
    pub delimiter: char,
    /// Any WHATWG encoding label; "latin1" resolves to windows-1252.
    pub encoding: String,
}

impl Default for CensusOptions {
    fn default() -> Self {
        Self { chunk_size: 500_000, delimiter: ';', encoding: "latin1".into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryOptions {
    /// Simplification tolerance in coordinate degrees.
    pub tolerance: f64,
    /// Per-ring point budget; `None` disables the cap.
    pub max_points: Option<usize>,
    /// PROJ.4 definition of the region shapefile CRS, when it is not WGS84.
    pub region_proj: Option<String>,
    /// PROJ.4 definition of the commune shapefile CRS, when it is not WGS84.
    pub commune_proj: Option<String>,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self { tolerance: 0.01, max_points: Some(1000), region_proj: None, commune_proj: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadOptions {
    pub region_max_rows: Option<usize>,
    pub commune_max_rows: Option<usize>,
    pub fields: Vec<String>,
}

impl Default for PayloadOptions {
    fn default() -> Self {
        Self {
            region_max_rows: Some(20),
            commune_max_rows: Some(50),
            fields: vec!["population_total".into(), "age_mean".into(), "pct_female".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    /// Upper bound for the pyramid sample.
    pub census_sample_size: usize,
    /// Target size for the general-purpose sampler.
    pub sample_size: usize,
    pub seed: u64,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self { census_sample_size: 100_000, sample_size: 50_000, seed: 42 }
    }
}

/// Ordered candidate names for each identifying shapefile column.
/// Earlier names win when a file carries several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    pub region_key: Vec<String>,
    pub commune_key: Vec<String>,
    pub commune_region_key: Vec<String>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> { list.iter().map(|s| s.to_string()).collect() }
        Self {
            region_key: names(&["codregion", "REGION", "REGION_C", "COD_REG", "COD_REGION", "REGIONCOD"]),
            commune_key: names(&["cod_comuna", "COMUNA", "COD_COMUNA", "COMUNA_COD", "Cod_Comun", "ID_COMUNA"]),
            commune_region_key: names(&["codregion"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{
            "geometry": { "tolerance": 0.05 },
            "target_region": 13
        }"#).unwrap();

        assert_eq!(config.geometry.tolerance, 0.05);
        assert_eq!(config.geometry.max_points, Some(1000));
        assert_eq!(config.census.chunk_size, 500_000);
        assert_eq!(config.sampling.seed, 42);
        assert_eq!(config.target_region, Some(13));
    }

    #[test]
    fn point_budget_below_a_triangle_is_rejected() {
        for max_points in [1, 2] {
            let mut config = PipelineConfig::default();
            config.geometry.max_points = Some(max_points);
            assert!(matches!(config.validate(), Err(Error::Config(msg)) if msg.contains("max_points")));
        }

        let mut config = PipelineConfig::default();
        config.geometry.max_points = Some(3);
        assert!(config.validate().is_ok());
        config.geometry.max_points = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let mut config = PipelineConfig::default();
        config.geometry.tolerance = -0.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn config_file_is_validated_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "geometry": { "max_points": 2 } }"#).unwrap();
        assert!(matches!(PipelineConfig::from_json_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn region_candidates_in_priority_order() {
        let schema = SchemaOptions::default();
        assert_eq!(schema.region_key.first().map(String::as_str), Some("codregion"));
        assert_eq!(schema.commune_key.len(), 6);
    }
}
