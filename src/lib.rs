// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod codec;
pub mod commands;
pub mod db;
pub mod dedup;
pub mod fiscal;
pub mod import;
pub mod models;
pub mod plan;
pub mod store;
pub mod utils;
pub mod workbook;
