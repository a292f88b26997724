#![doc = "Census aggregation and map-payload pipeline"]
mod aggregate;
mod cache;
mod census;
mod common;
mod config;
mod error;
mod geom;
mod io;
mod normalize;
mod payload;
mod session;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use config::{CensusOptions, GeometryOptions, PayloadOptions, PipelineConfig, SamplingOptions, SchemaOptions};

#[doc(inline)]
pub use cache::{memoize, Cache, CacheKey, CachedValue, KeyBuilder, MemoryCache, NoCache};

#[doc(inline)]
pub use census::{columns, AgeBand, SexCategory};

#[doc(inline)]
pub use io::{load_census, multipolygon_to_geojson, read_census, read_geo_table, to_feature_collection, write_csv, write_csv_to, CENSUS_COLUMNS};

#[doc(inline)]
pub use normalize::{normalize_column, normalize_communes, normalize_regions, COMUNA_NAME, PROVINCE_NAME, REGION_ID_COM, REGION_NAME};

#[doc(inline)]
pub use aggregate::{
    age_by_region, age_mean, age_median, age_std, available_regions, census_sample, communal_summary,
    overview, pct_female, population_total, pyramid, regional_summary, round2, sample, sex_by_region,
    summary_reductions, Overview, RegionEntry, AGE_MEAN, AGE_MEDIAN, AGE_STD, COUNT, PCT_FEMALE, POPULATION_TOTAL,
};

#[doc(inline)]
pub use geom::{
    cap_ring_points, optimize_geometries, optimize_multipolygon, reproject_to_wgs84, simplify_multipolygon,
    GeoTable, DEFAULT_MAX_POINTS, DEFAULT_TOLERANCE,
};

#[doc(inline)]
pub use payload::{
    build_map_payload, commune_map, region_map, with_density, MapPayload, AREA_KM2, DENSITY, ID_FIELDS,
    NAME_FIELDS, PAYLOAD_MAX_POINTS, PAYLOAD_TOLERANCE,
};

#[doc(inline)]
pub use session::{Dataset, Session, Sources};
