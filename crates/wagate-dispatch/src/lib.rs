// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch pipeline for outbound text messages.
//!
//! One call walks a request through validation, recipient resolution,
//! session lookup, the network send, and persistence of the resulting
//! record. Every step fails closed: no later step runs after a failure,
//! and nothing is retried inside the pipeline.

pub mod error;
pub mod pipeline;

pub use error::{DispatchError, DispatchStage};
pub use pipeline::{DispatchPipeline, SendTextRequest, MAX_TEXT_CHARS};
