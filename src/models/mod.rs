pub mod event;
pub mod order;
pub mod partner;
