pub mod candidate;
pub mod client;
pub mod job;
pub mod report;
pub mod user;
