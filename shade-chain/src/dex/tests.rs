//! Tests for batched swap data structures.

mod vectors;
