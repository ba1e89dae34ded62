// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::models::{BatchScanResults, CleanupScope, Identifier, ScanResult, StorageStats};
use comfy_table::Table;
use console::{StyledObject, style};

#[derive(Default)]
pub struct ConsoleReporter {
    use_colors: bool,
}

impl ConsoleReporter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn report_scan_started(&self) {
        println!();
        println!("Scanning packages for license findings. This operation may take some time ...");
    }

    pub fn report_batch_outcomes(&self, results: &BatchScanResults, storage: StorageStats) {
        let total = results.outcomes.len();
        let with_issues = results
            .outcomes
            .iter()
            .filter(|(_, scans)| scans.iter().any(|scan| !scan.succeeded()))
            .count();

        println!();
        println!("Statistics : ");
        println!();
        println!("• total packages processed : {}", self.cyan(total));
        println!("• packages with scan issues : {}", self.cyan(with_issues));
        println!("• result store reads / writes : {}", self.cyan(format!("{} / {}", storage.reads, storage.writes)));
        println!();
        println!("License findings : ");
        println!();

        let mut table = Table::new();
        table.set_header(vec!["Package", "Detected licenses", "Files", "Issues"]);

        results.outcomes.iter().for_each(|(package, scans)| {
            for scan in scans {
                let licenses = scan
                    .summary
                    .license_findings
                    .iter()
                    .map(|finding| finding.license.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");

                let row = vec![
                    package.id.to_string(),
                    licenses,
                    scan.summary.file_count.to_string(),
                    scan.summary.issues.len().to_string(),
                ];

                table.add_row(row);
            }
        });

        println!("{table}");
        println!();

        results
            .outcomes
            .iter()
            .flat_map(|(package, scans)| scans.iter().map(move |scan| (package, scan)))
            .filter(|(_, scan)| !scan.succeeded())
            .for_each(|(package, scan)| {
                for issue in &scan.summary.issues {
                    println!("• {} : {}", package.id, self.red(&issue.message));
                }
            });
    }

    pub fn report_path_outcome(&self, identifier: &Identifier, scan_result: &ScanResult) {
        println!();
        println!("Scanned : {}", self.cyan(identifier));
        println!();
        println!("• files scanned : {}", self.cyan(scan_result.summary.file_count));

        if scan_result.summary.license_findings.is_empty() {
            println!("• detected licenses : {}", self.cyan("none"));
        }

        for finding in &scan_result.summary.license_findings {
            println!("• {} at {}", self.cyan(&finding.license), &finding.location);
        }

        for issue in &scan_result.summary.issues {
            println!("• issue : {}", self.red(&issue.message));
        }

        println!();
    }

    pub fn report_cleaning_finished(&self, scope: &CleanupScope) {
        let output = match scope {
            CleanupScope::Everything => "All caches removed with success!",
            CleanupScope::Results => "Stored scan results removed with success!",
            CleanupScope::Sources => "Downloaded package sources removed with success!",
            CleanupScope::Tools => "Provisioned scanner tools removed with success!",
        };

        println!();
        println!("{}", self.cyan(output));
        println!();
    }

    fn cyan<T>(&self, what: T) -> StyledObject<T> {
        match self.use_colors {
            true => style(what).cyan(),
            false => style(what),
        }
    }

    fn red<T>(&self, what: T) -> StyledObject<T> {
        match self.use_colors {
            true => style(what).red(),
            false => style(what),
        }
    }
}
