mod account;
pub mod lending;
mod oracle;
mod time;

pub use {account::*, oracle::*, time::*};
