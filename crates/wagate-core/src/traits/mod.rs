// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Wagate gateway.
//!
//! All adapters use `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod session;
pub mod store;

pub use adapter::PluginAdapter;
pub use session::InstanceSession;
pub use store::MessageStore;
