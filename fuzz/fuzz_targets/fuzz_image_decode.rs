#![no_main]

use libfuzzer_sys::fuzz_target;
use sunpixel_backend_structure::decode;
use sunpixel_spec::ImageFormat;

fuzz_target!(|data: &[u8]| {
    for format in [ImageFormat::Png, ImageFormat::Jpeg] {
        if let Ok(buffer) = decode(data, format) {
            assert_eq!(
                buffer.data.len(),
                buffer.width as usize * buffer.height as usize
            );
        }
    }
});
