//! Unit tests for `heddle_status` types.
