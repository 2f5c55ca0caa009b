#![no_main]

use libfuzzer_sys::fuzz_target;
use mcap_wire::RecordReader;

// Fuzz target: RecordReader::read_record tokenizing.
//
// Catches bugs in:
// - Length prefixes near u64::MAX
// - Truncated string and byte fields inside a complete body
// - Unknown opcodes
// - Consumed counts that overrun the buffer
fuzz_target!(|data: &[u8]| {
    let reader = RecordReader::with_max_record_len(1 << 20);
    if let Ok(Some((_, consumed))) = reader.read_record(data) {
        assert!(consumed <= data.len());
    }
    for item in reader.records(data) {
        if item.is_err() {
            break;
        }
    }
});
