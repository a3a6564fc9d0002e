pub mod dispatcher;
pub mod validator;

pub use dispatcher::OrderDispatcher;
