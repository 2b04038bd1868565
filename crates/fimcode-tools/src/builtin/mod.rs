// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
pub mod edit_file;
pub mod load_skill;
pub mod read_file;
pub mod shell;
pub mod todo_write;
pub mod write_file;
