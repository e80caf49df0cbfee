pub mod guard;
pub mod password;
pub mod token;
