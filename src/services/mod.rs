pub mod attribution;
pub mod export_service;
pub mod hierarchy;
pub mod report_service;
pub mod snapshot_service;
pub mod timestamp_resolver;
pub mod visibility;
