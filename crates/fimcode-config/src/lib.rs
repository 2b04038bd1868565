// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod env;
mod loader;
mod schema;

pub use env::{apply_env_overrides, apply_env_overrides_from, env_warnings};
pub use loader::{load, load_from};
pub use schema::*;
