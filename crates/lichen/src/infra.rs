// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub mod caching;
pub mod cli;
pub mod downloading;
pub mod engines;
pub mod networking;
pub mod reporting;
