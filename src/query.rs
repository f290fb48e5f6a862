//! Structured proximity queries.
//!
//! Only span queries are provided: they are the queries whose matches carry
//! token positions, which is what annotation and span counting consume.

pub mod span;
