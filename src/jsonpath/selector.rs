// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

use super::Nodes;

/// Picks nodes out of a single node.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Member of an object with this key
    Name(String),
    /// Every child of an array or object, in container order
    Wildcard,
    /// Array element; negative indices count from the end
    Index(i64),
    /// Array slice, RFC 9535 section 2.3.4
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
}

impl Selector {
    pub fn name(name: impl Into<String>) -> Self {
        Selector::Name(name.into())
    }

    pub fn slice(start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Self {
        Selector::Slice { start, end, step }
    }

    pub fn select<'a>(&'a self, node: &'a Value) -> Nodes<'a> {
        match self {
            Selector::Name(name) => Box::new(node.as_object().and_then(|o| o.get(name)).into_iter()),
            Selector::Wildcard => children(node),
            Selector::Index(index) => {
                let element = node.as_array().and_then(|a| {
                    let len = a.len() as i64;
                    let normalized = if *index >= 0 { *index } else { len + index };
                    if (0..len).contains(&normalized) {
                        a.get(normalized as usize)
                    } else {
                        None
                    }
                });
                Box::new(element.into_iter())
            }
            Selector::Slice { start, end, step } => match node.as_array() {
                Some(array) => Box::new(
                    slice_indices(array.len(), *start, *end, *step).map(move |i| &array[i]),
                ),
                None => Box::new(std::iter::empty()),
            },
        }
    }
}

pub(super) fn children(node: &Value) -> Nodes<'_> {
    match node {
        Value::Array(values) => Box::new(values.iter()),
        Value::Object(map) => Box::new(map.values()),
        _ => Box::new(std::iter::empty()),
    }
}

/// Indices an RFC 9535 slice visits over a sequence of `len` elements.
///
/// ```
/// use feedsift::jsonpath::slice_indices;
///
/// assert_eq!(slice_indices(4, Some(0), Some(2), None).collect::<Vec<_>>(), vec![0, 1]);
/// assert_eq!(slice_indices(4, None, None, Some(-1)).collect::<Vec<_>>(), vec![3, 2, 1, 0]);
/// assert_eq!(slice_indices(4, Some(1), Some(3), Some(0)).count(), 0);
/// ```
pub fn slice_indices(
    len: usize,
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
) -> impl Iterator<Item = usize> {
    let len = len as i64;
    let step = step.unwrap_or(1);
    let normalize = |i: i64| if i >= 0 { i } else { len + i };

    let (first, in_bounds): (Option<i64>, Box<dyn Fn(i64) -> bool>) = if step > 0 {
        let lower = normalize(start.unwrap_or(0)).clamp(0, len);
        let upper = normalize(end.unwrap_or(len)).clamp(0, len);
        (Some(lower), Box::new(move |i| i < upper))
    } else if step < 0 {
        let upper = normalize(start.unwrap_or(len - 1)).clamp(-1, len - 1);
        let lower = normalize(end.unwrap_or(-len - 1)).clamp(-1, len - 1);
        (Some(upper), Box::new(move |i| lower < i))
    } else {
        (None, Box::new(|_| false))
    };

    // stops rather than wrapping when a huge step runs past i64
    std::iter::successors(first, move |i| i.checked_add(step))
        .take_while(move |i| in_bounds(*i))
        .map(|i| i as usize)
}
