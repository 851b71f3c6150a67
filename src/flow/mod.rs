pub mod affiliation;
pub mod session;
pub mod state;
