//! Cross-crate integration tests live in `tests/`. This library is
//! intentionally empty.
