pub mod scope;
pub mod username;
