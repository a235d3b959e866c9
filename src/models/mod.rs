//! Data model of the distribution pipeline.

mod asset;
pub use asset::*;

mod error;
pub use error::*;

mod instruction;
pub use instruction::*;

mod networks;
pub use networks::*;

mod outcome;
pub use outcome::*;

mod progress;
pub use progress::*;

mod recipient;
pub use recipient::*;
