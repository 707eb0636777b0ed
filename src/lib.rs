// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod store;
pub mod models;
pub mod utils;
pub mod pricing;
pub mod analysis;
pub mod orders;
pub mod titles;
pub mod commands;
