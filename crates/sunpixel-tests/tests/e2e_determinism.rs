//! Repeated conversions must produce identical bytes.

use std::sync::Arc;
use sunpixel_backend_structure::{builtin_source, convert, ConvertOptions, TaskStore};
use sunpixel_spec::{NullProgress, StructureFormat};
use sunpixel_tests::{compute_hash, gradient, jpeg_bytes, png_bytes, verify_determinism};

fn options(format: StructureFormat) -> ConvertOptions {
    ConvertOptions {
        width: Some(12),
        height: Some(9),
        format,
        ..Default::default()
    }
}

#[test]
fn each_format_is_deterministic() {
    let image = png_bytes(&gradient(48, 36));
    let source = builtin_source();

    for format in StructureFormat::ALL {
        let options = options(format);
        let result = verify_determinism(
            || {
                convert(&image, "png", &options, &source, NullProgress)
                    .unwrap()
                    .bytes
            },
            3,
        );
        result.assert_deterministic();
    }
}

#[test]
fn jpeg_conversion_is_deterministic() {
    let image = jpeg_bytes(&gradient(40, 30), 90);
    let source = builtin_source();
    let options = options(StructureFormat::Schem);

    verify_determinism(
        || {
            convert(&image, "jpeg", &options, &source, NullProgress)
                .unwrap()
                .bytes
        },
        3,
    )
    .assert_deterministic();
}

#[test]
fn report_hash_matches_bytes() {
    let image = png_bytes(&gradient(8, 8));
    let conversion = convert(
        &image,
        "png",
        &options(StructureFormat::Json),
        &builtin_source(),
        NullProgress,
    )
    .unwrap();
    assert_eq!(conversion.report.hash, compute_hash(&conversion.bytes));
}

#[test]
fn concurrent_tasks_match_sequential_output() {
    let image = png_bytes(&gradient(30, 20));
    let source = Arc::new(builtin_source());
    let expected = convert(
        &image,
        "png",
        &options(StructureFormat::Litematic),
        source.as_ref(),
        NullProgress,
    )
    .unwrap()
    .report
    .hash;

    let store = TaskStore::new();
    let ids: Vec<_> = (0..6)
        .map(|_| {
            store
                .spawn(
                    image.clone(),
                    "png".to_string(),
                    options(StructureFormat::Litematic),
                    Arc::clone(&source),
                )
                .unwrap()
        })
        .collect();

    for id in ids {
        store.wait(id).unwrap();
        let conversion = store.take_result(id).unwrap().unwrap();
        assert_eq!(conversion.report.hash, expected);
    }
    assert!(store.is_empty());
}
