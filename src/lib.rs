pub mod command;
pub mod config;
pub mod flow;
pub mod gateway;
pub mod ledger;
pub mod logger;
pub mod message;
pub mod model;
pub mod reply;
pub mod report;
pub mod responders;
pub mod router;
pub mod store;
pub mod webhook;
