//! CLI command handlers driven directly, without a subprocess.

use pretty_assertions::assert_eq;
use std::fs;
use std::process::ExitCode;
use sunpixel_backend_structure::{read_structure, ConvertOptions};
use sunpixel_cli::commands::{batch, convert, inspect, palettes, suggest};
use sunpixel_cli::config::PaletteLocation;
use sunpixel_spec::{Rgb, StructureFormat};
use sunpixel_tests::{gradient, png_bytes, solid, PaletteDirFixture};

fn location(fixture: &PaletteDirFixture) -> PaletteLocation {
    PaletteLocation::Directory(fixture.path().to_path_buf())
}

#[test]
fn convert_writes_next_to_input_by_default() {
    let fixture = PaletteDirFixture::with_builtin();
    let input = fixture.add_input("tile.png", &png_bytes(&gradient(6, 4)));

    let code = convert::run(
        &input,
        None,
        &ConvertOptions::default(),
        &location(&fixture),
        true,
    )
    .unwrap();

    assert_eq!(code, ExitCode::SUCCESS);
    let output = fixture.scratch().join("tile.schem");
    let decoded = read_structure(StructureFormat::Schem, &fs::read(output).unwrap()).unwrap();
    assert_eq!((decoded.width, decoded.length), (6, 4));
}

#[test]
fn convert_failure_in_json_mode_exits_nonzero() {
    let fixture = PaletteDirFixture::new();
    let input = fixture.add_input("tile.png", &png_bytes(&solid(2, 2, Rgb::WHITE)));

    let code = convert::run(
        &input,
        None,
        &ConvertOptions::default(),
        &location(&fixture),
        true,
    )
    .unwrap();

    assert_eq!(code, ExitCode::from(1));
    assert!(!fixture.scratch().join("tile.schem").exists());
}

#[test]
fn convert_failure_in_text_mode_carries_code() {
    let fixture = PaletteDirFixture::new();
    let input = fixture.add_input("tile.png", &png_bytes(&solid(2, 2, Rgb::WHITE)));

    let err = convert::run(
        &input,
        None,
        &ConvertOptions::default(),
        &location(&fixture),
        false,
    )
    .unwrap_err();
    assert!(err.to_string().starts_with("E004"), "{err}");
}

#[test]
fn builtin_location_needs_no_directory() {
    let fixture = PaletteDirFixture::new();
    let input = fixture.add_input("tile.png", &png_bytes(&solid(3, 3, Rgb::WHITE)));
    let output = fixture.scratch().join("out.json");
    let options = ConvertOptions {
        format: StructureFormat::Json,
        ..Default::default()
    };

    let code = convert::run(&input, Some(&output), &options, &PaletteLocation::Builtin, true)
        .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    let decoded = read_structure(StructureFormat::Json, &fs::read(output).unwrap()).unwrap();
    assert_eq!(decoded.palette, vec!["minecraft:white_wool"]);
}

#[test]
fn inspect_reads_written_structure() {
    let fixture = PaletteDirFixture::with_builtin();
    let input = fixture.add_input("tile.png", &png_bytes(&gradient(5, 5)));
    let output = fixture.scratch().join("tile.litematic");
    let options = ConvertOptions {
        format: StructureFormat::Litematic,
        ..Default::default()
    };
    convert::run(&input, Some(&output), &options, &location(&fixture), true).unwrap();

    assert_eq!(inspect::run(&output, None, true).unwrap(), ExitCode::SUCCESS);
    assert!(inspect::run(&output, Some(StructureFormat::Json), true).is_err());
}

#[test]
fn suggest_accepts_matching_and_mismatched_sizes() {
    let fixture = PaletteDirFixture::new();
    let input = fixture.add_input("wide.png", &png_bytes(&solid(40, 20, Rgb::BLACK)));

    assert_eq!(suggest::run(&input, 20, 10, true).unwrap(), ExitCode::SUCCESS);
    assert_eq!(suggest::run(&input, 20, 20, true).unwrap(), ExitCode::SUCCESS);

    let bmp = fixture.add_input("wide.bmp", b"BM");
    let err = suggest::run(&bmp, 20, 10, true).unwrap_err();
    assert!(err.to_string().starts_with("E001"), "{err}");
}

#[test]
fn palettes_init_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("block");

    assert_eq!(palettes::init(&target, false).unwrap(), ExitCode::SUCCESS);
    assert!(target.join("wool.json").exists());
    assert!(target.join("concrete.json").exists());

    // A second init leaves edited files alone.
    fs::write(target.join("wool.json"), "# Mine\n{}").unwrap();
    palettes::init(&target, false).unwrap();
    assert_eq!(
        fs::read_to_string(target.join("wool.json")).unwrap(),
        "# Mine\n{}"
    );

    let listed = palettes::list(&PaletteLocation::Directory(target), true).unwrap();
    assert_eq!(listed, ExitCode::SUCCESS);
}

#[test]
fn batch_converts_tree_and_reports_failures() {
    let fixture = PaletteDirFixture::with_builtin();
    fixture.add_input("a.png", &png_bytes(&solid(4, 4, Rgb::WHITE)));
    fixture.add_input("nested/b.png", &png_bytes(&gradient(4, 4)));
    fixture.add_input("broken.png", b"\x89PNG not really");
    let out = fixture.root.path().join("out");
    let options = ConvertOptions {
        format: StructureFormat::Json,
        ..Default::default()
    };

    let code = batch::run(
        &fixture.scratch(),
        Some(&out),
        &options,
        &location(&fixture),
        2,
        true,
    )
    .unwrap();

    assert_eq!(code, ExitCode::from(1));
    assert!(out.join("a.json").exists());
    assert!(out.join("nested").join("b.json").exists());
    assert!(!out.join("broken.json").exists());

    let decoded =
        read_structure(StructureFormat::Json, &fs::read(out.join("a.json")).unwrap()).unwrap();
    assert_eq!(decoded.name.as_deref(), Some("a"));
}

#[test]
fn batch_of_good_images_succeeds() {
    let fixture = PaletteDirFixture::with_builtin();
    for i in 0..5 {
        fixture.add_input(&format!("img{i}.png"), &png_bytes(&gradient(3 + i, 3)));
    }

    let code = batch::run(
        &fixture.scratch(),
        None,
        &ConvertOptions::default(),
        &location(&fixture),
        3,
        true,
    )
    .unwrap();

    assert_eq!(code, ExitCode::SUCCESS);
    for i in 0..5 {
        assert!(fixture.scratch().join(format!("img{i}.schem")).exists());
    }
}
