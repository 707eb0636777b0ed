// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod price;
pub mod costs;
pub mod analyze;
pub mod title;
pub mod config;
pub mod doctor;
