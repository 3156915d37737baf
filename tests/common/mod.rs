// Not every test binary uses every fixture.
#![allow(dead_code)]

pub mod fixtures;
pub mod routines;

pub use fixtures::*;
pub use routines::*;
