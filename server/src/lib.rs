//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Menagerie companion simulation server
//!
//! The server keeps the single authoritative copy of every companion,
//! advances their behavior in fixed ticks, accepts owner commands and
//! replicates changes to connected owners.

pub mod config;
pub mod ecs;
pub mod persistence;
pub mod profile;
pub mod session;
