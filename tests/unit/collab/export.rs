use super::*;
use crate::foundation::core::Point;
use crate::scene::model::{BitmapItem, PointDef, RectDef};
use std::collections::BTreeMap;

fn doc_with_bitmap() -> Document {
    let mut library = BTreeMap::new();
    library.insert(
        "photo".to_string(),
        LibraryItem::Bitmap(BitmapItem {
            width: 40.0,
            height: 20.0,
        }),
    );
    Document {
        frame_rate: 24.0,
        library,
        selection: Vec::new(),
    }
}

fn request<'a>(doc: &'a Document, element: &'a Element) -> ExportRequest<'a> {
    ExportRequest {
        doc,
        element,
        name: "img",
        path: "images/img.png",
    }
}

#[test]
fn manifest_sizes_bitmaps_from_library() {
    let doc = doc_with_bitmap();
    let el = Element::new(
        "p",
        ElementKind::Bitmap {
            item: "photo".into(),
        },
    );
    let mut ex = ManifestExporter::new(2.0).unwrap();
    let d = ex.export(&request(&doc, &el)).unwrap();
    assert_eq!((d.width, d.height, d.scale), (80.0, 40.0, 2.0));
    // Center (20, 10) relative to the registration point, y flipped.
    assert_eq!((d.x, d.y), (20.0, -10.0));
    assert_eq!(ex.requests().len(), 1);
}

#[test]
fn manifest_pivot_is_relative_to_anchor() {
    let doc = doc_with_bitmap();
    let mut el = Element::instance("i", "IMG_thing");
    el.bounds = Some(RectDef {
        x0: -10.0,
        y0: -10.0,
        x1: 10.0,
        y1: 30.0,
    });
    el.transformation_point = Some(PointDef::new(5.0, 5.0));
    let d = ManifestExporter::default()
        .export(&request(&doc, &el))
        .unwrap();
    assert_eq!((d.width, d.height), (20.0, 40.0));
    assert_eq!((d.x, d.y), (-5.0, -5.0));
}

#[test]
fn shape_bounds_are_relative_to_shape_position() {
    let doc = doc_with_bitmap();
    let mut el = Element::shape("M100,100 L120,100 L120,110 L100,110 Z");
    el.x = 100.0;
    el.y = 100.0;
    let r = local_bounds(&doc, &el).unwrap();
    assert_eq!(r.origin(), Point::new(0.0, 0.0));
    assert_eq!((r.width(), r.height()), (20.0, 10.0));
}

#[test]
fn unknown_bounds_export_an_empty_image() {
    let doc = doc_with_bitmap();
    let el = Element::new("t", ElementKind::Text { text: "hi".into() });
    let d = ManifestExporter::default()
        .export(&request(&doc, &el))
        .unwrap();
    assert_eq!((d.width, d.height), (0.0, 0.0));
}

#[test]
fn invalid_scale_is_rejected() {
    assert!(ManifestExporter::new(0.0).is_err());
    assert!(PrerenderedExporter::new("out", f64::NAN).is_err());
}

#[test]
fn prerendered_reports_missing_files_as_export_errors() {
    let doc = doc_with_bitmap();
    let el = Element::new(
        "p",
        ElementKind::Bitmap {
            item: "photo".into(),
        },
    );
    let mut ex = PrerenderedExporter::new("/nonexistent/rigbake-test", 1.0).unwrap();
    let err = ex.export(&request(&doc, &el)).unwrap_err();
    assert!(matches!(err, RigError::Export(_)));
}

#[test]
fn prerendered_reads_pixel_size_from_disk() {
    let dir = std::env::temp_dir().join(format!("rigbake-export-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("images")).unwrap();
    image::RgbaImage::new(8, 6)
        .save(dir.join("images/img.png"))
        .unwrap();

    let doc = doc_with_bitmap();
    let el = Element::new(
        "p",
        ElementKind::Bitmap {
            item: "photo".into(),
        },
    );
    let mut ex = PrerenderedExporter::new(&dir, 1.0).unwrap();
    let d = ex.export(&request(&doc, &el)).unwrap();
    assert_eq!((d.width, d.height), (8.0, 6.0));
    assert_eq!((d.x, d.y), (20.0, -10.0));
    let _ = std::fs::remove_dir_all(&dir);
}
