//! Cached entry points over the pure pipeline.
//!
//! A [`Session`] owns a configuration and an injected [`Cache`]. Loaded
//! tables are shared as `Arc`s and never mutated; each derived table is
//! memoized under a key built from the identity of the inputs it was
//! computed from plus the parameters that shaped it.

use std::{path::{Path, PathBuf}, sync::Arc};

use log::info;
use polars::prelude::DataFrame;

use crate::{
    aggregate,
    cache::{memoize, Cache, CacheKey, MemoryCache},
    common,
    config::PipelineConfig,
    error::Result,
    geom::{optimize_geometries, GeoTable},
    io,
    normalize::{normalize_communes, normalize_regions},
    payload::{self, MapPayload},
};

/// Locations of the three source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub regions: PathBuf,
    pub communes: PathBuf,
    pub census: PathBuf,
}

/// The three loaded source tables, plus the keys that identify them.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub regions: Arc<GeoTable>,
    pub communes: Arc<GeoTable>,
    pub census: Arc<DataFrame>,
    keys: DatasetKeys,
}

#[derive(Debug, Clone, Copy)]
struct DatasetKeys {
    regions: CacheKey,
    communes: CacheKey,
    census: CacheKey,
}

pub struct Session<C: Cache = MemoryCache> {
    config: PipelineConfig,
    cache: C,
}

impl Session<MemoryCache> {
    /// Session with a process-lifetime in-memory cache.
    pub fn in_memory(config: PipelineConfig) -> Self { Self::new(config, MemoryCache::new()) }
}

impl<C: Cache> Session<C> {
    pub fn new(config: PipelineConfig, cache: C) -> Self { Self { config, cache } }

    #[inline] pub fn config(&self) -> &PipelineConfig { &self.config }

    #[inline] pub fn cache(&self) -> &C { &self.cache }

    #[inline] pub fn cache_mut(&mut self) -> &mut C { &mut self.cache }

    /// Load and normalize all three sources. Any failure aborts the load.
    pub fn load(&mut self, sources: &Sources) -> Result<Dataset> {
        self.config.validate()?;
        let (regions, regions_key) = self.load_regions(&sources.regions)?;
        let (communes, communes_key) = self.load_communes(&sources.communes)?;
        let (census, census_key) = self.load_census(&sources.census)?;
        Ok(Dataset {
            regions,
            communes,
            census,
            keys: DatasetKeys { regions: regions_key, communes: communes_key, census: census_key },
        })
    }

    fn load_regions(&mut self, path: &Path) -> Result<(Arc<GeoTable>, CacheKey)> {
        let proj = self.config.geometry.region_proj.clone();
        let key = CacheKey::builder("load_regions")
            .str("file", &common::shapefile_fingerprint(path)?)
            .str("candidates", &self.config.schema.region_key.join("\u{1f}"))
            .str("proj", proj.as_deref().unwrap_or(""))
            .finish();
        let schema = self.config.schema.clone();
        let table = memoize(&mut self.cache, key, || {
            normalize_regions(io::read_geo_table(path, proj.as_deref())?, &schema)
        })?;
        Ok((table, key))
    }

    fn load_communes(&mut self, path: &Path) -> Result<(Arc<GeoTable>, CacheKey)> {
        let proj = self.config.geometry.commune_proj.clone();
        let key = CacheKey::builder("load_communes")
            .str("file", &common::shapefile_fingerprint(path)?)
            .str("candidates", &self.config.schema.commune_key.join("\u{1f}"))
            .str("region_candidates", &self.config.schema.commune_region_key.join("\u{1f}"))
            .str("proj", proj.as_deref().unwrap_or(""))
            .finish();
        let schema = self.config.schema.clone();
        let table = memoize(&mut self.cache, key, || {
            normalize_communes(io::read_geo_table(path, proj.as_deref())?, &schema)
        })?;
        Ok((table, key))
    }

    fn load_census(&mut self, path: &Path) -> Result<(Arc<DataFrame>, CacheKey)> {
        let options = self.config.census.clone();
        let key = CacheKey::builder("load_census")
            .str("file", &common::file_fingerprint(path)?)
            .u64("chunk_size", options.chunk_size as u64)
            .str("delimiter", &options.delimiter.to_string())
            .str("encoding", &options.encoding)
            .finish();
        let table = memoize(&mut self.cache, key, || io::load_census(path, &options))?;
        Ok((table, key))
    }

    pub fn regional_summary(&mut self, data: &Dataset) -> Result<Arc<DataFrame>> {
        let key = CacheKey::builder("regional_summary").key("census", &data.keys.census).finish();
        memoize(&mut self.cache, key, || aggregate::regional_summary(&data.census))
    }

    /// Communal summary over the full census, scoped to `region` when given.
    pub fn communal_summary(&mut self, data: &Dataset, region: Option<i8>) -> Result<Arc<DataFrame>> {
        let key = CacheKey::builder("communal_summary")
            .key("census", &data.keys.census)
            .opt_u64("region", region.map(|r| r as u8 as u64))
            .finish();
        memoize(&mut self.cache, key, || aggregate::communal_summary(&data.census, region))
    }

    pub fn age_by_region(&mut self, data: &Dataset) -> Result<Arc<DataFrame>> {
        let key = CacheKey::builder("age_by_region").key("census", &data.keys.census).finish();
        memoize(&mut self.cache, key, || aggregate::age_by_region(&data.census))
    }

    pub fn sex_by_region(&mut self, data: &Dataset) -> Result<Arc<DataFrame>> {
        let key = CacheKey::builder("sex_by_region").key("census", &data.keys.census).finish();
        memoize(&mut self.cache, key, || aggregate::sex_by_region(&data.census))
    }

    /// The bounded census sample (default 100,000 rows, seed 42).
    pub fn census_sample(&mut self, data: &Dataset) -> Result<Arc<DataFrame>> {
        let sampling = self.config.sampling.clone();
        self.sample_of(data, sampling.census_sample_size, sampling.seed)
    }

    /// General-purpose sample of the configured size (default 50,000).
    pub fn sample(&mut self, data: &Dataset) -> Result<Arc<DataFrame>> {
        let sampling = self.config.sampling.clone();
        self.sample_of(data, sampling.sample_size, sampling.seed)
    }

    fn sample_of(&mut self, data: &Dataset, size: usize, seed: u64) -> Result<Arc<DataFrame>> {
        let key = CacheKey::builder("sample")
            .key("census", &data.keys.census)
            .u64("size", size as u64)
            .u64("seed", seed)
            .finish();
        memoize(&mut self.cache, key, || aggregate::sample(&data.census, size, seed))
    }

    /// Population pyramid over the census sample.
    pub fn pyramid(&mut self, data: &Dataset) -> Result<Arc<DataFrame>> {
        let sample = self.census_sample(data)?;
        let key = CacheKey::builder("pyramid")
            .key("census", &data.keys.census)
            .u64("size", self.config.sampling.census_sample_size as u64)
            .u64("seed", self.config.sampling.seed)
            .finish();
        memoize(&mut self.cache, key, || aggregate::pyramid(&sample))
    }

    pub fn overview(&mut self, data: &Dataset) -> Result<Arc<aggregate::Overview>> {
        let key = CacheKey::builder("overview").key("census", &data.keys.census).finish();
        memoize(&mut self.cache, key, || aggregate::overview(&data.census))
    }

    pub fn available_regions(&mut self, data: &Dataset) -> Result<Arc<Vec<aggregate::RegionEntry>>> {
        let key = CacheKey::builder("available_regions").key("regions", &data.keys.regions).finish();
        memoize(&mut self.cache, key, || aggregate::available_regions(&data.regions))
    }

    /// Region layer with geometries reduced per the geometry options.
    pub fn optimized_regions(&mut self, data: &Dataset) -> Result<Arc<GeoTable>> {
        self.optimized(&data.regions, data.keys.regions)
    }

    /// Commune layer with geometries reduced per the geometry options.
    pub fn optimized_communes(&mut self, data: &Dataset) -> Result<Arc<GeoTable>> {
        self.optimized(&data.communes, data.keys.communes)
    }

    fn optimized(&mut self, table: &GeoTable, source: CacheKey) -> Result<Arc<GeoTable>> {
        let geometry = &self.config.geometry;
        let (tolerance, max_points) = (geometry.tolerance, geometry.max_points);
        let key = CacheKey::builder("optimize_geometries")
            .key("table", &source)
            .f64("tolerance", tolerance)
            .opt_u64("max_points", max_points.map(|n| n as u64))
            .finish();
        memoize(&mut self.cache, key, || {
            info!("[optimize] simplifying {} shapes (tolerance {tolerance}, max points {max_points:?})", table.len());
            table.clone().with_shapes(optimize_geometries(table.shapes(), tolerance, max_points))
        })
    }

    /// Choropleth payload for the region layer.
    pub fn region_payload(&mut self, data: &Dataset) -> Result<Arc<MapPayload>> {
        let summary = self.regional_summary(data)?;
        let regions = self.optimized_regions(data)?;
        let options = self.config.payload.clone();
        let key = CacheKey::builder("region_payload")
            .key("census", &data.keys.census)
            .key("regions", &data.keys.regions)
            .key("geometry", &self.geometry_key())
            .str("fields", &options.fields.join("\u{1f}"))
            .opt_u64("max_rows", options.region_max_rows.map(|n| n as u64))
            .finish();
        memoize(&mut self.cache, key, || {
            let joined = payload::region_map(&regions, &summary)?;
            payload::build_map_payload(&joined, &options.fields, options.region_max_rows)
        })
    }

    /// Choropleth payload for the communes of `region` (all communes when
    /// `None`). `area_km2` and `density` can be requested as fields.
    pub fn commune_payload(&mut self, data: &Dataset, region: Option<i8>) -> Result<Arc<MapPayload>> {
        let summary = self.communal_summary(data, region)?;
        let communes = self.optimized_communes(data)?;
        let options = self.config.payload.clone();
        let key = CacheKey::builder("commune_payload")
            .key("census", &data.keys.census)
            .key("communes", &data.keys.communes)
            .key("geometry", &self.geometry_key())
            .opt_u64("region", region.map(|r| r as u8 as u64))
            .str("fields", &options.fields.join("\u{1f}"))
            .opt_u64("max_rows", options.commune_max_rows.map(|n| n as u64))
            .finish();
        let raw = Arc::clone(&data.communes);
        memoize(&mut self.cache, key, || {
            // Areas come from the unreduced shapes.
            let dense = payload::with_density(payload::commune_map(&raw, &summary, region)?)?;
            let (_, shapes) = payload::commune_map(&communes, &summary, region)?.into_parts();
            payload::build_map_payload(&dense.with_shapes(shapes)?, &options.fields, options.commune_max_rows)
        })
    }

    fn geometry_key(&self) -> CacheKey {
        let geometry = &self.config.geometry;
        CacheKey::builder("geometry_options")
            .f64("tolerance", geometry.tolerance)
            .opt_u64("max_points", geometry.max_points.map(|n| n as u64))
            .finish()
    }
}
