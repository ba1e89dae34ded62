// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::models::{RawScanOutcome, ScanSummary};
use chrono::{DateTime, Utc};

// Canonical ordering : findings by (license, location), issues by message.
// Identical raw outcomes must normalize to byte-identical summaries, since
// summaries address a durable cache and feed reproducible reports.
// Unresolved issues are preserved verbatim; filtering known issues belongs
// to the downstream resolution step, never here.
pub fn normalize(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    outcome: RawScanOutcome,
) -> ScanSummary {
    let mut license_findings = outcome.findings;
    license_findings.sort();
    license_findings.dedup();

    let mut issues = outcome.issues;
    issues.sort_by(|first, second| first.message.cmp(&second.message));

    ScanSummary {
        start_time,
        end_time,
        file_count: outcome.file_count,
        license_findings,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use crate::core::models::{Issue, LicenseFinding, RawScanOutcome, Severity};
    use crate::core::normalizing::normalize;
    use assertor::EqualityAssertion;
    use chrono::Utc;

    fn unordered_outcome() -> RawScanOutcome {
        RawScanOutcome {
            file_count: 4,
            findings: vec![
                LicenseFinding::new("MIT", "src/lib.rs"),
                LicenseFinding::new("Apache-2.0", "LICENSE"),
                LicenseFinding::new("MIT", "README.md"),
                LicenseFinding::new("MIT", "src/lib.rs"),
            ],
            issues: vec![
                Issue::new("scancode", "timeout after 120s on src/big.js", Some(Severity::Error)),
                Issue::new("scancode", "cannot decode src/blob.bin", Some(Severity::Warning)),
            ],
        }
    }

    #[test]
    fn should_order_findings_and_issues_deterministically() {
        let started = Utc::now();
        let finished = Utc::now();

        let summary = normalize(started, finished, unordered_outcome());

        let expected_findings = vec![
            LicenseFinding::new("Apache-2.0", "LICENSE"),
            LicenseFinding::new("MIT", "README.md"),
            LicenseFinding::new("MIT", "src/lib.rs"),
        ];

        assertor::assert_that!(summary.license_findings).is_equal_to(expected_findings);
        assertor::assert_that!(summary.issues[0].message).is_equal_to("cannot decode src/blob.bin".to_string());
    }

    #[test]
    fn should_normalize_identical_raw_outcomes_to_identical_summaries() {
        let started = Utc::now();
        let finished = Utc::now();

        let first = normalize(started, finished, unordered_outcome());
        let second = normalize(started, finished, unordered_outcome());

        let first_bytes = serde_json::to_vec(&first).expect("cannot serialize summary");
        let second_bytes = serde_json::to_vec(&second).expect("cannot serialize summary");

        assertor::assert_that!(first_bytes).is_equal_to(second_bytes);
    }
}
