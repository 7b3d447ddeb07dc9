// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API transport.
//!
//! [`CloudApiSession`] implements `InstanceSession` for one business phone
//! number by posting to the Graph API `/{phone_number_id}/messages` endpoint.

pub mod session;
pub mod types;

pub use session::{CloudApiSession, CloudApiSessionConfig};
