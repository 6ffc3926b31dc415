// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod users;
pub mod transactions;
pub mod dashboard;
pub mod balances;
pub mod analytics;
pub mod bills;
pub mod exporter;
pub mod settings;
pub mod doctor;
