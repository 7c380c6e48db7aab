#![no_main]

use libfuzzer_sys::fuzz_target;
use sunpixel_backend_structure::parse_definition;
use sunpixel_spec::PaletteTable;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let definition = parse_definition("fuzz", text);

    let mut table = PaletteTable::new();
    table.merge(&definition);
    assert!(table.len() <= definition.entries.len());
});
