// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait that every collaborator adapter implements.

use crate::types::AdapterType;

/// Identity shared by all collaborator adapters.
///
/// The controller only uses it to label log lines, so it stays synchronous
/// and object safe.
pub trait Adapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the kind of collaborator this adapter provides.
    fn adapter_type(&self) -> AdapterType;
}
