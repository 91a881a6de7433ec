// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named Fisp functions.
//!
//! A [`FunctionRegistry`] is built once at startup, filled with the builtins
//! plus anything the caller registers, and then shared read-only (usually in
//! an `Arc`) by every evaluation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::EvalError;
use crate::fisp::context::FilterContext;
use crate::fisp::evaluator::Evaluator;
use crate::fisp::expr::Expr;

/// A function callable from Fisp.
///
/// Handlers receive their arguments unevaluated, so each one decides what to
/// evaluate, in which order, and when to stop.
pub trait FispFunction: Send + Sync {
    fn call(
        &self,
        args: &[Expr],
        evaluator: &Evaluator<'_>,
        ctx: &FilterContext<'_>,
    ) -> Result<Expr, EvalError>;
}

impl<F> FispFunction for F
where
    F: Fn(&[Expr], &Evaluator<'_>, &FilterContext<'_>) -> Result<Expr, EvalError> + Send + Sync,
{
    fn call(
        &self,
        args: &[Expr],
        evaluator: &Evaluator<'_>,
        ctx: &FilterContext<'_>,
    ) -> Result<Expr, EvalError> {
        self(args, evaluator, ctx)
    }
}

/// Name and alias lookup for [`FispFunction`]s.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn FispFunction>>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every builtin.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::fisp::builtins::register_builtins(&mut registry);
        registry
    }

    /// Registers `function` under `name` and each alias. Later registrations
    /// replace earlier ones with the same name.
    pub fn register(
        &mut self,
        name: &str,
        function: impl FispFunction + 'static,
        aliases: &[&str],
    ) {
        let function: Arc<dyn FispFunction> = Arc::new(function);
        for key in std::iter::once(name).chain(aliases.iter().copied()) {
            self.functions.insert(key.to_string(), Arc::clone(&function));
        }
    }

    pub fn get(&self, name: &str) -> Result<&Arc<dyn FispFunction>, EvalError> {
        self.functions.get(name).ok_or_else(|| EvalError::UnknownFunction {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Evaluator borrowing this registry.
    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(self)
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry")
            .field("function_count", &self.functions.len())
            .field("names", &names)
            .finish()
    }
}
