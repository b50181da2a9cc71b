pub mod comment;
pub mod notification;
pub mod task;
pub mod user;
