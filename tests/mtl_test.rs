use std::{io::Cursor, path::Path};

use abduction_scene::{
    data_structures::model::Material,
    error::AssetErrorKind,
    resources::mtl::{MaterialTable, load_mtl, parse_mtl},
};
use cgmath::Vector3;

use crate::common::test_utils::fixture;

mod common;

fn parse(text: &str) -> Result<MaterialTable, abduction_scene::error::AssetError> {
    let mut table = MaterialTable::new();
    parse_mtl(Cursor::new(text.as_bytes()), Path::new("inline.mtl"), &mut table)?;
    Ok(table)
}

#[test]
fn coefficients_land_on_the_latest_material() {
    let table = parse(
        "newmtl first\nKd 1 0 0\n\
         newmtl second\nKa 0 0.5 0\nNs 12.5\n",
    )
    .unwrap();
    assert_eq!(table.len(), 2);

    let first = table.get("first").unwrap();
    assert_eq!(first.diffuse, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(first.ambient, Material::default().ambient);

    let second = table.get("second").unwrap();
    assert_eq!(second.ambient, Vector3::new(0.0, 0.5, 0.0));
    assert_eq!(second.diffuse, Material::default().diffuse);
    assert_eq!(second.shininess, 12.5);
}

#[test]
fn diffuse_map_takes_the_last_token() {
    let table = parse("newmtl grass\nmap_Kd -s 2 2 1 grass.png\n").unwrap();
    assert_eq!(table.texture("grass"), Some("grass.png"));
    assert_eq!(table.texture("missing"), None);
}

#[test]
fn redefining_a_material_starts_from_defaults() {
    let table = parse("newmtl a\nKd 0 0 0\nmap_Kd a.png\nnewmtl a\nNs 4\n").unwrap();
    let a = table.get("a").unwrap();
    assert_eq!(a.diffuse, Material::default().diffuse);
    assert_eq!(a.shininess, 4.0);
    assert_eq!(table.texture("a"), None);
}

#[test]
fn unsupported_tags_and_comments_are_skipped() {
    let table = parse("# header\nnewmtl glass\nNi 1.5\nd 0.3\nillum 4\nKs 1 1 1\n").unwrap();
    assert_eq!(table.get("glass").unwrap().specular, Vector3::new(1.0, 1.0, 1.0));
}

#[test]
fn coefficient_before_newmtl_is_rejected() {
    let err = parse("Kd 1 0 0\nnewmtl late\n").unwrap_err();
    assert!(err.is_malformed_material_table());
    match err.kind {
        AssetErrorKind::MalformedMaterialTable { line, .. } => assert_eq!(line, 1),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn malformed_numbers_are_rejected() {
    assert!(parse("newmtl a\nKd 1 0\n").unwrap_err().is_malformed_material_table());
    assert!(parse("newmtl a\nNs shiny\n").unwrap_err().is_malformed_material_table());
    assert!(parse("newmtl\n").unwrap_err().is_malformed_material_table());
}

#[test]
fn unopenable_table_is_reported_but_not_fatal() {
    let mut table = MaterialTable::new();
    let loaded = load_mtl(&fixture("does_not_exist.mtl"), &mut table).unwrap();
    assert!(!loaded);
    assert!(table.is_empty());

    let loaded = load_mtl(&fixture("barn.mtl"), &mut table).unwrap();
    assert!(loaded);
    assert_eq!(table.len(), 2);
    assert_eq!(table.texture("red"), Some("red.png"));
}

#[test]
fn latin1_bytes_do_not_fail_the_table() {
    let mut table = MaterialTable::new();
    let bytes: &[u8] = b"# cor da vaca \xE7\nnewmtl cow\nKd 1 1 1\nmap_Kd vaca.png\n";
    parse_mtl(Cursor::new(bytes), Path::new("inline.mtl"), &mut table).unwrap();
    assert_eq!(table.get("cow").unwrap().diffuse, Vector3::new(1.0, 1.0, 1.0));
    assert_eq!(table.texture("cow"), Some("vaca.png"));

    let mut table = MaterialTable::new();
    let err = parse_mtl(
        Cursor::new(&b"# \xE7\nKd 1 0 0\n"[..]),
        Path::new("inline.mtl"),
        &mut table,
    )
    .unwrap_err();
    match err.kind {
        AssetErrorKind::MalformedMaterialTable { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn later_tables_add_to_the_same_table() {
    let mut table = MaterialTable::new();
    assert!(load_mtl(&fixture("barn.mtl"), &mut table).unwrap());
    assert!(load_mtl(&fixture("extra.mtl"), &mut table).unwrap());
    assert_eq!(table.len(), 3);
    assert_eq!(table.texture("red"), Some("red.png"));
    assert_eq!(table.texture("green"), Some("green.png"));
}
