//! Declaring collections: macros for sort enumerations and records

pub mod macros;
