// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::models::{Identifier, ScannerDetails};
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Hash, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    // stable across runs and processes : same identifier + same scanner
    // identity always address the same store entry
    pub fn derive(identifier: &Identifier, scanner: &ScannerDetails) -> Self {
        let fingerprint = configuration_fingerprint(&scanner.configuration);

        let segments = [
            identifier.kind.as_str(),
            identifier.namespace.as_str(),
            identifier.name.as_str(),
            identifier.version.as_str(),
            scanner.name.as_str(),
            scanner.version.as_str(),
            fingerprint.as_str(),
        ];

        let key = segments.map(path_safe).join("/");
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// canonical serialization of the effective tool options : key/value pairs
// sorted by key, so option ordering never splits the cache. Semantically
// equivalent but textually different values still fingerprint apart.
pub fn canonical_configuration(options: &[(&str, &str)]) -> String {
    let mut pairs = options
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>();
    pairs.sort();
    pairs.join(" ")
}

fn configuration_fingerprint(configuration: &str) -> String {
    let digest = Sha256::digest(configuration.as_bytes());
    hex::encode(digest)
}

// injective escaping : '%' goes first, so escaped separators never collide
// with literal ones, and "%00" stays unreachable from any non-empty input
fn path_safe(segment: &str) -> String {
    if segment.is_empty() {
        return "%00".to_string();
    }

    segment.replace('%', "%25").replace('/', "%2F").replace('\\', "%5C")
}

#[cfg(test)]
mod tests {
    use crate::core::keys::{CacheKey, canonical_configuration};
    use crate::core::models::{Identifier, ScannerDetails};
    use assertor::EqualityAssertion;

    fn scanner(version: &str, configuration: &str) -> ScannerDetails {
        ScannerDetails::new("scancode", version, configuration)
    }

    #[test]
    fn should_derive_identical_keys_for_identical_inputs() {
        let identifier = Identifier::new("npm", "", "leftpad", "1.0.0");

        let first = CacheKey::derive(&identifier, &scanner("32.4.1", "--license"));
        let second = CacheKey::derive(&identifier, &scanner("32.4.1", "--license"));

        assertor::assert_that!(first).is_equal_to(second);
    }

    #[test]
    fn should_derive_distinct_keys_for_distinct_tool_versions() {
        let identifier = Identifier::new("npm", "", "leftpad", "1.0.0");

        let first = CacheKey::derive(&identifier, &scanner("32.4.1", "--license"));
        let second = CacheKey::derive(&identifier, &scanner("32.5.0", "--license"));

        assertor::assert_that!(first).is_not_equal_to(second);
    }

    #[test]
    fn should_derive_distinct_keys_for_distinct_identifiers() {
        let leftpad = Identifier::new("npm", "", "leftpad", "1.0.0");
        let rightpad = Identifier::new("npm", "", "rightpad", "1.0.0");

        let first = CacheKey::derive(&leftpad, &scanner("32.4.1", "--license"));
        let second = CacheKey::derive(&rightpad, &scanner("32.4.1", "--license"));

        assertor::assert_that!(first).is_not_equal_to(second);
    }

    #[test]
    fn should_derive_distinct_keys_for_empty_and_placeholder_namespaces() {
        let plain = Identifier::new("npm", "", "leftpad", "1.0.0");
        let underscored = Identifier::new("npm", "_", "leftpad", "1.0.0");

        let first = CacheKey::derive(&plain, &scanner("32.4.1", "--license"));
        let second = CacheKey::derive(&underscored, &scanner("32.4.1", "--license"));

        assertor::assert_that!(first).is_not_equal_to(second);
    }

    #[test]
    fn should_derive_distinct_keys_for_slashed_and_escaped_namespaces() {
        let slashed = Identifier::new("golang", "github.com/gorilla", "mux", "1.8.1");
        let flattened = Identifier::new("golang", "github.com_gorilla", "mux", "1.8.1");

        let first = CacheKey::derive(&slashed, &scanner("32.4.1", "--license"));
        let second = CacheKey::derive(&flattened, &scanner("32.4.1", "--license"));

        assertor::assert_that!(first).is_not_equal_to(second);
    }

    #[test]
    fn should_collapse_equivalent_option_orderings() {
        let ordered = canonical_configuration(&[("copyright", "true"), ("license", "true")]);
        let shuffled = canonical_configuration(&[("license", "true"), ("copyright", "true")]);

        assertor::assert_that!(ordered).is_equal_to(shuffled);
    }
}
