mod serde;
pub use serde::*;

mod polling;
pub use polling::*;

mod token;
pub use token::*;

#[cfg(test)]
pub mod mocks;
