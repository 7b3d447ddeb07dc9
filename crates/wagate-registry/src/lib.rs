// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instance registry for the Wagate gateway.
//!
//! Holds the set of live sessions, keyed by instance id. Entries are created
//! and removed by the authentication path; the dispatch path only reads.

pub mod registry;

pub use registry::{InstanceRegistry, InstanceStatus, LookupError, SessionHandle};
