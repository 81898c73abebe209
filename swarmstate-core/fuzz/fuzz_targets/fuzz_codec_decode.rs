#![no_main]

use libfuzzer_sys::fuzz_target;
use swarmstate_core::core_codec::{decode, encode, DictConsumer, Unknowns};

fuzz_target!(|data: &[u8]| {
    // Strict decode: anything accepted must re-encode to the same bytes
    if let Ok(value) = decode(data) {
        assert_eq!(encode(&value), data);
    }

    // Streaming consumption must agree with strict decode on validity
    if let Ok(mut consumer) = DictConsumer::new(data) {
        let mut unknowns = Unknowns::new();
        let _ = consumer.seek(b"d", &mut unknowns);
        let _ = consumer.finish(&mut unknowns);
    }
});
