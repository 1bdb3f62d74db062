// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pull secret propagation logic.

pub mod binding;
pub mod dispatcher;
pub mod policy;
pub mod projector;
pub mod resync;
pub mod source;

pub use binding::{ensure_bound, ensure_unbound, BindingChange};
pub use dispatcher::{AccountScope, Dispatcher, Report, Scope, Stage, Trigger};
pub use policy::Policy;
pub use projector::ensure_projected;
pub use resync::Resyncer;
pub use source::{resolve_seed, SeedPayload};
