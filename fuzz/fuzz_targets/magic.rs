#![no_main]

use libfuzzer_sys::fuzz_target;
use mcap_wire::{Magic, MAGIC_LEN};

// Fuzz target: Magic::probe on arbitrary prefixes.
//
// A probe that succeeds must report exactly MAGIC_LEN bytes and the
// marker must write back to the same bytes.
fuzz_target!(|data: &[u8]| {
    if let Ok(Some((magic, len))) = Magic::probe(data) {
        assert_eq!(len, MAGIC_LEN);
        assert_eq!(&magic.to_bytes()[..], &data[..MAGIC_LEN]);
    }
});
