// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use std::path::Path;
use std::process::Command;

pub mod scancode;

// probes an executable for its reported version; a non-runnable candidate
// is simply not a match
pub fn installed_version(executable: &Path, version_argument: &str, version_prefix: &str) -> Option<String> {
    let probed = Command::new(executable).arg(version_argument).output().ok()?;

    if !probed.status.success() {
        return None;
    }

    let stdout = String::from_utf8(probed.stdout).ok()?;

    stdout
        .lines()
        .find(|line| line.trim_start().starts_with(version_prefix))
        .and_then(|line| line.split_whitespace().last())
        .map(|version| version.to_string())
}
