pub mod fixture;
pub mod rizin;

pub use fixture::{FixtureFunction, FixtureHost};
pub use rizin::RizinHost;
