//! # Repository Implementations
//!
//! One repository per aggregate. Plain reads go through the instance
//! methods backed by the pool; every write (and any read that must see a
//! transaction's uncommitted state) is an associated function taking an
//! executor, so services can pass their own transaction.

pub mod cash;
pub mod product;
pub mod sale;
pub mod stock;
