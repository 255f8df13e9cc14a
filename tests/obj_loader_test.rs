use abduction_scene::{
    data_structures::model::Material,
    error::AssetErrorKind,
    resources::{
        load_model_obj,
        obj::LoadOptions,
        texture::{TextureHandle, TextureRegistry},
    },
};
use cgmath::Vector3;

use crate::common::test_utils::{assert_close, fixture, fixtures, parse_bytes, parse_text};

mod common;

const TEN_POSITIONS: &str = "v 0 0 0\nv 1 0 0\nv 2 0 0\nv 3 0 0\nv 4 0 0\n\
                             v 5 0 0\nv 6 0 0\nv 7 0 0\nv 8 0 0\nv 9 0 0\n";

#[test]
fn submeshes_follow_material_activation_order() {
    let mut textures = TextureRegistry::new();
    let model = load_model_obj(
        fixture("barn.obj"),
        fixtures(),
        &LoadOptions::default(),
        &mut textures,
    )
    .expect("barn loads");

    let names: Vec<_> = model
        .submeshes()
        .iter()
        .map(|s| s.material_name().unwrap_or("<none>"))
        .collect();
    assert_eq!(names, ["red", "blue", "red"]);
    assert_eq!(model.name, "barn");

    let counts: Vec<_> = model.submeshes().iter().map(|s| s.vertex_count()).collect();
    assert_eq!(counts, [6, 3, 3]);
    assert_eq!(model.vertex_count(), 4 * 3);
    assert!(model.submeshes().iter().all(|s| s.vertex_count() % 3 == 0));
}

#[test]
fn repeated_material_reuses_snapshot_and_texture() {
    let mut textures = TextureRegistry::new();
    let model = load_model_obj(
        fixture("barn.obj"),
        fixtures(),
        &LoadOptions::default(),
        &mut textures,
    )
    .unwrap();
    let parts = model.submeshes();

    let red = parts[0].material();
    assert_eq!(red.ambient, Vector3::new(0.3, 0.0, 0.0));
    assert_eq!(red.diffuse, Vector3::new(0.9, 0.1, 0.1));
    assert_eq!(red.specular, Vector3::new(0.2, 0.2, 0.2));
    assert_eq!(red.shininess, 64.0);
    assert_eq!(parts[2].material(), red);

    assert_eq!(parts[0].texture(), Some(TextureHandle(0)));
    assert_eq!(parts[2].texture(), Some(TextureHandle(0)));
    assert_eq!(parts[0].texture_path(), Some(fixture("red.png").as_path()));
    assert_eq!(textures.len(), 1);
}

#[test]
fn material_without_map_has_no_texture_and_keeps_defaults() {
    let mut textures = TextureRegistry::new();
    let model = load_model_obj(
        fixture("barn.obj"),
        fixtures(),
        &LoadOptions::default(),
        &mut textures,
    )
    .unwrap();
    let blue = &model.submeshes()[1];

    assert_eq!(blue.texture(), None);
    assert_eq!(blue.texture_path(), None);
    let defaults = Material::default();
    assert_eq!(blue.material().ambient, defaults.ambient);
    assert_eq!(blue.material().specular, defaults.specular);
    assert_eq!(blue.material().shininess, 32.0);
    assert_eq!(blue.material().diffuse, Vector3::new(0.1, 0.1, 0.9));
}

#[test]
fn texture_coordinates_use_a_top_left_origin() {
    let mut textures = TextureRegistry::new();
    let model = load_model_obj(
        fixture("barn.obj"),
        fixtures(),
        &LoadOptions::default(),
        &mut textures,
    )
    .unwrap();
    // blue's first reference is `3/2/2`
    let vertex = model.submeshes()[1].vertices()[0];
    assert_eq!(vertex.position, [1.0, 1.0, 0.0]);
    assert_eq!(vertex.tex_coords, [1.0, 1.0]);
    assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);

    // red's third reference is `3/3/1`, raw v = 0.25
    let vertex = model.submeshes()[0].vertices()[2];
    assert_close(vertex.tex_coords[1], 0.75);
}

#[test]
fn face_references_resolve_one_based() {
    let text = "v 1 0 0\nv 2 0 0\nv 3 0 0\n\
                vt 0.1 0.2\nvt 0.3 0.4\n\
                vn 0 0 1\n\
                f 3/2/1 1/1/1 2/2/1\n";
    let submeshes = parse_text(text, LoadOptions { flip_v: false }).unwrap();
    let first = submeshes[0].vertices()[0];
    assert_eq!(first.position, [3.0, 0.0, 0.0]);
    assert_eq!(first.tex_coords, [0.3, 0.4]);
    assert_eq!(first.normal, [0.0, 0.0, 1.0]);
}

#[test]
fn negative_and_partial_references_are_supported() {
    let text = "v 1 0 0\nv 2 0 0\nv 3 0 0\nvn 0 1 0\nf -1//-1 -2//1 1\n";
    let submeshes = parse_text(text, LoadOptions::default()).unwrap();
    let vertices = submeshes[0].vertices();
    assert_eq!(vertices[0].position, [3.0, 0.0, 0.0]);
    assert_eq!(vertices[0].normal, [0.0, 1.0, 0.0]);
    assert_eq!(vertices[1].position, [2.0, 0.0, 0.0]);
    assert_eq!(vertices[2].normal, [0.0, 0.0, 0.0]);
    assert_eq!(vertices[2].tex_coords, [0.0, 0.0]);
}

#[test]
fn out_of_range_position_is_malformed_geometry() {
    let text = format!("{TEN_POSITIONS}f 1 2 99\n");
    let err = parse_text(&text, LoadOptions::default()).unwrap_err();
    assert!(err.is_malformed_geometry(), "{err}");
    match err.kind {
        AssetErrorKind::MalformedGeometry { line, .. } => assert_eq!(line, 11),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn reference_into_empty_table_is_malformed_geometry() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1/1 2/1/1 3/1/1\n";
    let err = parse_text(text, LoadOptions::default()).unwrap_err();
    assert!(err.is_malformed_geometry());
    assert!(err.to_string().contains("texture coordinate"), "{err}");
}

#[test]
fn zero_index_is_rejected() {
    let err = parse_text("v 0 0 0\nf 0 1 1\n", LoadOptions::default()).unwrap_err();
    assert!(err.is_malformed_geometry());
}

#[test]
fn non_triangular_faces_are_rejected() {
    let quad = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
    let err = parse_text(quad, LoadOptions::default()).unwrap_err();
    assert!(err.is_malformed_geometry());
    assert!(err.to_string().contains("4 references"), "{err}");

    let line = "v 0 0 0\nv 1 0 0\nf 1 2\n";
    assert!(parse_text(line, LoadOptions::default()).unwrap_err().is_malformed_geometry());
}

#[test]
fn malformed_vertex_line_is_rejected() {
    let err = parse_text("v 0 zero 0\n", LoadOptions::default()).unwrap_err();
    assert!(err.is_malformed_geometry());
}

#[test]
fn faces_before_any_material_use_defaults() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nusemtl blue\nf 3 2 1\n";
    let submeshes = parse_text(text, LoadOptions::default()).unwrap();
    assert_eq!(submeshes.len(), 2);
    assert_eq!(submeshes[0].material_name(), None);
    assert_eq!(*submeshes[0].material(), Material::default());
    // no `mtllib`, so `blue` is unknown as well
    assert_eq!(submeshes[1].material_name(), Some("blue"));
    assert_eq!(*submeshes[1].material(), Material::default());
}

#[test]
fn empty_groups_are_discarded() {
    let text = "mtllib barn.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\n\
                usemtl red\nusemtl blue\nf 1 2 3\nusemtl red\n";
    let submeshes = parse_text(text, LoadOptions::default()).unwrap();
    assert_eq!(submeshes.len(), 1);
    assert_eq!(submeshes[0].material_name(), Some("blue"));
}

#[test]
fn unknown_lines_are_skipped() {
    let text = "# comment\no thing\ng group\ns 1\nl 1 2\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvp 0.5\nf 1 2 3\n";
    let submeshes = parse_text(text, LoadOptions::default()).unwrap();
    assert_eq!(submeshes.len(), 1);
    assert_eq!(submeshes[0].triangle_count(), 1);
}

#[test]
fn missing_material_table_is_tolerated() {
    let mut textures = TextureRegistry::new();
    let model = load_model_obj(
        fixture("no_table.obj"),
        fixtures(),
        &LoadOptions::default(),
        &mut textures,
    )
    .expect("geometry still loads");
    assert_eq!(model.submeshes().len(), 1);
    assert_eq!(model.submeshes()[0].material_name(), Some("anything"));
    assert_eq!(*model.submeshes()[0].material(), Material::default());
    assert_eq!(model.submeshes()[0].texture(), None);
    assert!(textures.is_empty());
}

#[test]
fn broken_material_table_fails_the_asset() {
    let mut textures = TextureRegistry::new();
    let err = load_model_obj(
        fixture("broken_table.obj"),
        fixtures(),
        &LoadOptions::default(),
        &mut textures,
    )
    .unwrap_err();
    assert!(err.is_malformed_material_table(), "{err}");
    assert!(err.path.ends_with("broken.mtl"));
}

#[test]
fn asset_without_faces_is_empty() {
    let mut textures = TextureRegistry::new();
    let err = load_model_obj(
        fixture("no_faces.obj"),
        fixtures(),
        &LoadOptions::default(),
        &mut textures,
    )
    .unwrap_err();
    assert!(matches!(err.kind, AssetErrorKind::EmptyAsset));
    assert!(err.path.ends_with("no_faces.obj"));
}

#[test]
fn unreadable_asset_is_an_io_error() {
    let mut textures = TextureRegistry::new();
    let err = load_model_obj(
        fixture("nowhere.obj"),
        fixtures(),
        &LoadOptions::default(),
        &mut textures,
    )
    .unwrap_err();
    assert!(matches!(err.kind, AssetErrorKind::Io(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn failing_texture_loader_leaves_texture_absent() {
    let mut textures = TextureRegistry::requiring_files();
    let model = load_model_obj(
        fixture("barn.obj"),
        fixtures(),
        &LoadOptions::default(),
        &mut textures,
    )
    .expect("a missing image is not fatal");
    let red = &model.submeshes()[0];
    assert_eq!(red.texture(), None);
    assert_eq!(red.texture_path(), Some(fixture("red.png").as_path()));
}

#[test]
fn latin1_comment_does_not_fail_the_asset() {
    let bytes = b"# modelo da vaca - \xE7\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
    let submeshes = parse_bytes(bytes, LoadOptions::default()).unwrap();
    assert_eq!(submeshes.len(), 1);
    assert_eq!(submeshes[0].vertices()[1].position, [1.0, 0.0, 0.0]);

    // line numbers still count the undecodable line
    let err = parse_bytes(b"# \xE7\xE3o\nv 0 x 0\n", LoadOptions::default()).unwrap_err();
    match err.kind {
        AssetErrorKind::MalformedGeometry { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn crlf_line_endings_are_accepted() {
    let text = "mtllib barn.mtl\r\nv 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nusemtl red\r\nf 1 2 3\r\n";
    let submeshes = parse_text(text, LoadOptions::default()).unwrap();
    assert_eq!(submeshes[0].material_name(), Some("red"));
    assert_eq!(submeshes[0].material().shininess, 64.0);
}

#[test]
fn material_table_loaded_later_replaces_earlier_defaults() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
                usemtl red\nf 1 2 3\n\
                mtllib barn.mtl\n\
                usemtl red\nf 3 2 1\n";
    let submeshes = parse_text(text, LoadOptions::default()).unwrap();
    assert_eq!(submeshes.len(), 2);

    let before = &submeshes[0];
    assert_eq!(before.material_name(), Some("red"));
    assert_eq!(*before.material(), Material::default());
    assert_eq!(before.texture(), None);
    assert_eq!(before.texture_path(), None);

    let after = &submeshes[1];
    assert_eq!(after.material_name(), Some("red"));
    assert_eq!(after.material().ambient, Vector3::new(0.3, 0.0, 0.0));
    assert_eq!(after.material().diffuse, Vector3::new(0.9, 0.1, 0.1));
    assert_eq!(after.material().shininess, 64.0);
    assert!(after.texture().is_some());
    assert_eq!(after.texture_path(), Some(fixture("red.png").as_path()));
}

#[test]
fn one_mtllib_line_can_name_several_tables() {
    let text = "mtllib barn.mtl extra.mtl\n\
                v 0 0 0\nv 1 0 0\nv 0 1 0\n\
                usemtl red\nf 1 2 3\n\
                usemtl green\nf 1 2 3\n";
    let mut textures = TextureRegistry::new();
    let submeshes = abduction_scene::resources::obj::parse_obj(
        std::io::Cursor::new(text.as_bytes()),
        std::path::Path::new("inline.obj"),
        &fixtures(),
        &LoadOptions::default(),
        &mut textures,
    )
    .unwrap();

    let names: Vec<_> = submeshes.iter().map(|s| s.material_name()).collect();
    assert_eq!(names, [Some("red"), Some("green")]);
    assert_eq!(submeshes[0].material().diffuse, Vector3::new(0.9, 0.1, 0.1));
    assert_eq!(submeshes[1].material().ambient, Vector3::new(0.0, 0.2, 0.0));
    assert_eq!(submeshes[1].material().diffuse, Vector3::new(0.1, 0.8, 0.1));

    let red = submeshes[0].texture().unwrap();
    let green = submeshes[1].texture().unwrap();
    assert_ne!(red, green);
    assert_eq!(textures.path(red), Some(fixture("red.png").as_path()));
    assert_eq!(textures.path(green), Some(fixture("green.png").as_path()));
    assert_eq!(textures.len(), 2);
}
