//! Unit, property and behaviour tests for the reference refactorings.

mod support;

mod documents_tests;
mod properties;
mod reorder_tests;
