pub mod batch;
pub mod caller;
pub mod catalog;
pub mod errors;
pub mod lifecycle;
pub mod order;
pub mod ports;
