//! Backend interfacing.
//!
//! Backends implement the traits found here to plug a graphics API into the types of this crate.
//! Everything in here is `unsafe`: the safe API lives in [`crate::shader`] and upholds the
//! invariants these functions rely on.

pub mod shader;
