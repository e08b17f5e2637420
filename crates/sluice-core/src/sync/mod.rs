// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Low-level synchronisation primitives shared by the event pipeline.
//!
//! - [`atomic`]: word and pointer sized read-modify-write operations with
//!   fixed memory orderings.
//! - [`SpinLock`]: a busy-waiting lock with a scoped guard.

pub mod atomic;
mod spin;

pub use self::atomic::{AtomicPointer, AtomicWord};
pub use self::spin::{SpinLock, SpinLockGuard};
