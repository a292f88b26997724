// Shared on-disk fixtures: two tiny shapefiles and a census file.

#![allow(dead_code)]

use std::path::Path;

use censomap::Sources;
use shapefile::{
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
    Point, Polygon, PolygonRing, Writer,
};

/// Header of the raw census file; P16 and PROVINCIA are present but unused.
pub const CENSUS_HEADER: &str = "REGION;PROVINCIA;COMUNA;P08;P09;P16;ESCOLARIDAD";

/// Five people: region 1 (ages 10/40/70, one woman) and region 2 (ages
/// 20/50, one woman).
pub const CENSUS_ROWS: [&str; 5] = [
    "1;11;101;1;10;1;4",
    "1;11;101;2;40;2;12",
    "1;11;102;1;70;1;",
    "2;21;201;2;20;1;15",
    "2;21;201;1;50;2;8",
];

pub fn square(x0: f64, y0: f64, size: f64) -> Polygon {
    Polygon::with_rings(vec![PolygonRing::Outer(vec![
        Point::new(x0, y0),
        Point::new(x0, y0 + size),
        Point::new(x0 + size, y0 + size),
        Point::new(x0 + size, y0),
        Point::new(x0, y0),
    ])])
}

fn field(name: &str) -> FieldName {
    FieldName::try_from(name).unwrap()
}

/// Region layer keyed by the legacy `REGION` column, with a padded name.
pub fn write_regions(path: &Path) {
    write_regions_named(path, ["  Segunda ", "Primera", "Tercera"], 40);
}

/// Region layer with the given names for regions 2, 1 and 3, stored in a
/// character field `name_width` bytes wide.
pub fn write_regions_named(path: &Path, names: [&str; 3], name_width: u8) {
    let table = TableWriterBuilder::new()
        .add_numeric_field(field("REGION"), 10, 0)
        .add_character_field(field("Region"), name_width);
    let mut writer = Writer::from_path(path, table).unwrap();

    for ((id, x0), name) in [(2.0, 1.0), (1.0, 0.0), (3.0, 2.0)].into_iter().zip(names) {
        let mut record = Record::default();
        record.insert("REGION".to_string(), FieldValue::Numeric(Some(id)));
        record.insert("Region".to_string(), FieldValue::Character(Some(name.to_string())));
        writer.write_shape_and_record(&square(x0, 0.0, 1.0), &record).unwrap();
    }
}

/// Commune layer keyed by `COMUNA`, with the region foreign key `codregion`.
/// Communes are 0.01° squares, roughly 1.2 km² at the equator.
pub fn write_communes(path: &Path) {
    let table = TableWriterBuilder::new()
        .add_numeric_field(field("COMUNA"), 10, 0)
        .add_numeric_field(field("codregion"), 10, 0)
        .add_character_field(field("Comuna"), 40);
    let mut writer = Writer::from_path(path, table).unwrap();

    let communes = [
        (101.0, 1.0, "Uno A", 0.0, 0.0),
        (102.0, 1.0, "Uno B", 0.5, 0.0),
        (201.0, 2.0, "Dos A", 1.0, 0.0),
        (301.0, 3.0, "Tres A", 2.0, 0.0),
    ];
    for (id, region, name, x0, y0) in communes {
        let mut record = Record::default();
        record.insert("COMUNA".to_string(), FieldValue::Numeric(Some(id)));
        record.insert("codregion".to_string(), FieldValue::Numeric(Some(region)));
        record.insert("Comuna".to_string(), FieldValue::Character(Some(name.to_string())));
        writer.write_shape_and_record(&square(x0, y0, 0.01), &record).unwrap();
    }
}

pub fn write_census(path: &Path, rows: &[&str]) {
    let mut text = String::from(CENSUS_HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    std::fs::write(path, text).unwrap();
}

/// Write all three fixtures into `dir`.
pub fn fixtures(dir: &Path) -> Sources {
    let paths = Sources {
        regions: dir.join("regions.shp"),
        communes: dir.join("communes.shp"),
        census: dir.join("census.csv"),
    };
    write_regions(&paths.regions);
    write_communes(&paths.communes);
    write_census(&paths.census, &CENSUS_ROWS);
    paths
}
