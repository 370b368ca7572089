//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod command;

pub use user::{Role, UserId};
pub use message::{IncomingMessage, ParseMode};
pub use command::{strip_mention, Builtin, CommandEntry, CommandInvocation, Tier};
