pub mod health;
pub mod report;
pub mod visibility;
