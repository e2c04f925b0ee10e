// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod appliances;
pub mod bills;
pub mod chat;
pub mod data;
pub mod doctor;
pub mod serve;
pub mod session;
pub mod settings;
pub mod tips;
