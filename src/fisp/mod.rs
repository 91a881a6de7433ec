// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fisp, the S-expression language feed filters are written in.
//!
//! ```
//! use std::sync::Arc;
//! use feedsift::fisp::{CompiledFilter, FunctionRegistry};
//!
//! let registry = Arc::new(FunctionRegistry::with_builtins());
//! let filter = CompiledFilter::compile(
//!     "(all_of (not (is_retweet)) (contains_regex \"(?i)cats?\"))",
//!     registry,
//!     None,
//! )
//! .unwrap();
//! assert_eq!(filter.expr().to_string(), "(all_of (not (is_retweet)) (contains_regex \"(?i)cats?\"))");
//! ```

pub mod builtins;
mod context;
mod evaluator;
mod expr;
mod filter;
mod parser;
mod printer;
mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::FilterContext;
pub use evaluator::Evaluator;
pub use expr::{Atom, Expr};
pub use filter::{CompiledFilter, FilterBuilder};
pub use parser::parse;
pub use registry::{FispFunction, FunctionRegistry};
