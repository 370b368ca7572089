//! Message handling - Command parsing and dispatching

pub mod dispatcher;
pub mod parser;


pub use dispatcher::{Dispatch, Dispatcher, Reply};
pub use parser::MessageParser;
