mod result;
mod setup;
mod suite;

pub use {result::*, setup::*, suite::*};
