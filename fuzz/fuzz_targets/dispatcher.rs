#![no_main]

use libfuzzer_sys::fuzz_target;
use mcap_stream::{RecordDispatcher, RequestWindow, StreamConfig, Subscriptions};

// Fuzz target: the record state machine over arbitrary streams.
//
// The first input byte picks a split point. Feeding the stream whole
// and in two increments must agree on success.
fn run(stream: &[u8], split: usize) -> bool {
    let config = StreamConfig {
        max_record_len: 1 << 20,
        max_chunk_decompressed_size: 1 << 20,
        ..StreamConfig::default()
    };
    let mut dispatcher = RecordDispatcher::new(&config, RequestWindow::all(), Subscriptions::All);
    let mut pending = Vec::new();

    for part in [&stream[..split], &stream[split..]] {
        pending.extend_from_slice(part);
        match dispatcher.advance(&pending) {
            Ok(consumed) => {
                pending.drain(..consumed);
            }
            Err(_) => return false,
        }
    }
    dispatcher.finish(pending.len()).is_ok()
}

fuzz_target!(|data: &[u8]| {
    let Some((&split, stream)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(stream.len());
    assert_eq!(run(stream, split), run(stream, stream.len()));
});
