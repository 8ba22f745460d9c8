mod cell;
mod row;
mod variant;

pub mod rules;

pub use cell::*;
pub use row::*;
pub use variant::*;
