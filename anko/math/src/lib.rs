mod dec;
mod error;
mod int;

pub use {dec::*, error::*, int::*};
