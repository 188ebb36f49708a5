pub mod models;
pub mod bank;
pub mod session;
pub mod errors;

pub use models::*;
pub use bank::*;
pub use session::*;
pub use errors::*;
