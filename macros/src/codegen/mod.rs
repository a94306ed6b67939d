// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Code generation utilities for Rust→Lean 4 translation.

pub mod types;

pub use types::rust_type_to_lean;
