pub mod attendance_service;
pub mod dto;
pub mod stats_service;
