pub mod document;
pub mod registry;
pub mod verify;
