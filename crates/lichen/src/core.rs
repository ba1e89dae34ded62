// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub mod collaborators;
pub mod interfaces;
pub mod keys;
pub mod models;
pub mod normalizing;
pub mod pipeline;
