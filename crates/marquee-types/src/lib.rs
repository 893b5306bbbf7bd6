pub mod config;
pub mod runtime;
pub mod validator;

pub use runtime::Runtime;
pub use validator::{ValidationErrors, Validator};
