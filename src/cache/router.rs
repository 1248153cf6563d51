//! Hash Router Module
//!
//! Maps keys to bucket indices.

// == Hash Router ==
/// Routes a key to one of `bucket_count` buckets using CRC32.
///
/// The mapping depends only on the key bytes, so a key lands in the same
/// bucket for the lifetime of the cache (and across processes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashRouter {
    mask: usize,
}

impl HashRouter {
    // == Constructor ==
    /// Creates a router over `bucket_count` buckets.
    ///
    /// `bucket_count` must be a non-zero power of two; `Config::validate`
    /// enforces this before a router is built.
    pub(crate) fn new(bucket_count: usize) -> Self {
        debug_assert!(bucket_count.is_power_of_two());
        Self {
            mask: bucket_count - 1,
        }
    }

    // == Route ==
    /// Returns the bucket index for `key`, always in `[0, bucket_count)`.
    pub fn route(&self, key: &str) -> usize {
        crc32fast::hash(key.as_bytes()) as usize & self.mask
    }

    /// Number of buckets this router distributes over.
    pub fn bucket_count(&self) -> usize {
        self.mask + 1
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_is_stable() {
        let router = HashRouter::new(256);
        for key in ["", "a", "user:42", "ünïcødé"] {
            assert_eq!(router.route(key), router.route(key));
            assert_eq!(router.route(key), HashRouter::new(256).route(key));
        }
    }

    #[test]
    fn test_route_in_range() {
        let router = HashRouter::new(16);
        for i in 0..1000 {
            assert!(router.route(&format!("key{}", i)) < 16);
        }
    }

    #[test]
    fn test_empty_key_routes() {
        let router = HashRouter::new(256);
        // crc32 of the empty input is 0
        assert_eq!(router.route(""), 0);
    }

    #[test]
    fn test_single_bucket() {
        let router = HashRouter::new(1);
        assert_eq!(router.bucket_count(), 1);
        assert_eq!(router.route("anything"), 0);
    }

    #[test]
    fn test_distribution() {
        let buckets = 16;
        let samples = 16_000;
        let router = HashRouter::new(buckets);
        let mut counts = vec![0usize; buckets];

        for i in 0..samples {
            counts[router.route(&format!("session:{}:{}", i, i * 7919))] += 1;
        }

        // Expected 1000 per bucket; allow generous statistical slack.
        for count in counts {
            assert!(
                (700..=1300).contains(&count),
                "bucket received {} keys",
                count
            );
        }
    }
}
