// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod fisp;
mod transport;

pub use config::{ConfigError, ValidationError};
pub use fisp::{EvalError, ParseError};
pub use transport::{CheckpointError, DispatchError, FetchError};
