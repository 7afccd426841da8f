pub mod child;
pub mod command;
pub mod log;
pub mod slug;
pub mod which;
