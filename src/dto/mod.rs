pub mod report_dto;
