#![no_main]

use libfuzzer_sys::fuzz_target;
use mcap_schema::{MessageDecoder, SchemaFormat};

// Fuzz target: definition parsing, type resolution and payload decoding.
//
// Input layout: [format selector][schema text][0xFF][payload]. Catches
// panics in the `.msg` parser, unresolved or recursive types, and
// dynamic lengths larger than the payload.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let format = if selector & 1 == 0 { SchemaFormat::Ros1 } else { SchemaFormat::Ros2 };
    let (schema, payload) = match rest.iter().position(|&b| b == 0xFF) {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => (rest, &[][..]),
    };

    if let Ok(decoder) = MessageDecoder::resolve(format, "fuzz/Root", schema) {
        let _ = decoder.decode(payload);
    }
});
