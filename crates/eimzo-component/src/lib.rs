//! # eimzo-component
//!
//! The fixed set of named operations a host process dispatches into.
//!
//! This crate provides:
//! - `EimzoComponent` with one blocking method per operation
//! - The `OPERATIONS` table and `Dispatcher` trait for name + argument-list calls
//! - `Fault` for mapping errors to stable codes at the host boundary

pub mod component;
pub mod dispatch;

pub use component::{AUTHOR, EimzoComponent};
pub use dispatch::{Dispatcher, Fault, OPERATIONS, OperationDef, find_operation};
