pub mod application;
pub mod payment;
pub mod tier;

pub use application::*;
pub use payment::*;
pub use tier::*;
