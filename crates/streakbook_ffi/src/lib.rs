//! Flutter bridge for Streakbook.

pub mod api;
