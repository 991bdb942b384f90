pub mod context;
pub mod entry;
pub mod event;
pub mod person;
pub mod session;
pub mod status;
