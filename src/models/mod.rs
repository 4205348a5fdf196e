mod survey;
mod user;
mod webhook_event;

pub use survey::*;
pub use user::*;
pub use webhook_event::*;
