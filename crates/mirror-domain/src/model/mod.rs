//! Domain Models - The vocabulary of gitmirror
//!
//! Every name here should match how we talk about mirrors.

pub mod changeset;
pub mod cleanup;
pub mod mirror;
pub mod remote_url;
pub mod stamp;
pub mod validation;
