#![forbid(unsafe_code)]

//! Resource-creation screens built on the `formkit-core` engine.
//!
//! Each screen module declares its form as a [`formkit_core::FormGroup`]
//! literal, seeds select options from a [`catalog::CatalogSnapshot`], and
//! assembles the create-request payload from a valid form. The screens own no
//! validation logic of their own; everything flows through the engine's rules
//! and walker.

pub mod catalog;
pub mod cluster;
pub mod load_balancer;
pub mod object_storage;
