// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod relay;
pub mod retrieval;
pub mod scheduler;

pub use relay::{render_message, Mapping, MappingFailure, MappingReport, Relay, RunReport};
pub use retrieval::{Retriever, RetrievalLimits, Source, SourceOutcome, SourceState};
pub use scheduler::{DeliveryHandle, DeliveryTask, Scheduler, SchedulerOptions};
