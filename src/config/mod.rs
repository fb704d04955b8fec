// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide configuration

pub mod settings;

pub use settings::{Settings, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MODEL_PATH};
