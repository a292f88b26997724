//! Person-level census records and their derived categorical fields.

mod derive;

pub use derive::{AgeBand, SexCategory};

/// Canonical column names of the person table.
pub mod columns {
    pub const REGION_ID: &str = "region_id";
    pub const COMUNA_ID: &str = "comuna_id";
    pub const SEX: &str = "sex";
    pub const AGE: &str = "age";
    pub const ESCOLARIDAD: &str = "escolaridad";
    pub const SEX_CATEGORY: &str = "sex_category";
    pub const AGE_BAND: &str = "age_band";
}
