// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use env_logger::Env;

// log verbosity is driven by LICHEN_LOG (error unless overridden); the
// console reporter owns the user-facing output
pub fn setup_troubleshooting() {
    better_panic::install();
    human_panic::setup_panic!();

    env_logger::Builder::from_env(Env::new().filter_or("LICHEN_LOG", "error"))
        .format_timestamp(None)
        .format_module_path(false)
        .format_level(false)
        .format_file(false)
        .format_target(false)
        .init();
}
