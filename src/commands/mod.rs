// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod events;
pub mod exercices;
pub mod exporter;
pub mod importer;
pub mod members;
pub mod transactions;
