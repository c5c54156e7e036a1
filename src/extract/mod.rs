//! Reading the redirect-back target on the login side.
mod query;

pub use query::{is_local_path, return_to, return_to_or};
