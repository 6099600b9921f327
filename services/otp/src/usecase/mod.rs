pub mod issue;
pub mod purge;
pub mod verify;
