//! Merge and dump metrics
//!
//! Recording goes through the `metrics` facade and is a no-op until the
//! embedding application installs a recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

pub const MERGE_ACCEPTED: &str = "config.merge.accepted";
pub const MERGE_DUPLICATE: &str = "config.merge.duplicate";
pub const MERGE_SKIPPED: &str = "config.merge.skipped";
pub const DUMP_TOTAL: &str = "config.dump.total";
pub const DUMP_BYTES: &str = "config.dump.bytes";

/// Initialize metrics with descriptions
pub fn init_metrics() {
    describe_counter!(MERGE_ACCEPTED, Unit::Count, "Config messages newly applied");
    describe_counter!(MERGE_DUPLICATE, Unit::Count, "Config messages ignored as already applied");
    describe_counter!(MERGE_SKIPPED, Unit::Count, "Config messages skipped as undecodable or misrouted");
    describe_counter!(DUMP_TOTAL, Unit::Count, "Single-namespace dumps produced");
    describe_histogram!(DUMP_BYTES, Unit::Bytes, "Size of produced dumps in bytes");
}

/// Record the outcome counts of one merge call for `namespace`
pub(crate) fn record_merge(namespace: &'static str, accepted: usize, duplicate: usize, skipped: usize) {
    if accepted > 0 {
        counter!(MERGE_ACCEPTED, "namespace" => namespace).increment(accepted as u64);
    }
    if duplicate > 0 {
        counter!(MERGE_DUPLICATE, "namespace" => namespace).increment(duplicate as u64);
    }
    if skipped > 0 {
        counter!(MERGE_SKIPPED, "namespace" => namespace).increment(skipped as u64);
    }
}

pub(crate) fn record_dump(namespace: &'static str, bytes: usize) {
    counter!(DUMP_TOTAL, "namespace" => namespace).increment(1);
    histogram!(DUMP_BYTES, "namespace" => namespace).record(bytes as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_without_recorder() {
        init_metrics();
        record_merge("user_profile", 2, 1, 0);
        record_dump("user_profile", 128);
    }
}
