//! Core types for navigable drill-down diagrams.
//!
//! This crate holds the plain data model shared by the registry, the tree
//! factory and the layout pipeline. It performs no I/O and has no async code.

pub mod diagram;
pub mod dimension;
pub mod geometry;
pub mod options;
