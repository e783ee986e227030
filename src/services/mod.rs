pub mod actions;
pub mod backend;
pub mod conversation;
pub mod extraction;
pub mod intent;
pub mod validators;
