//! Shared fixtures and behaviour tests for `heddle_core`.

pub(crate) mod support;
