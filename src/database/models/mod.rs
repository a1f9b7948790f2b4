pub mod event;
pub mod user;

pub use event::*;
pub use user::*;
