//! Cross-crate integration tests for pwvault. See `tests/`.
