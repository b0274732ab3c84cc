// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod categories;
pub mod config;
pub mod doctor;
pub mod importer;
pub mod reports;
pub mod transactions;
