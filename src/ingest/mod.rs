pub mod poller;
pub mod processor;
