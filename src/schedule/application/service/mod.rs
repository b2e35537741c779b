pub mod maintenance_service;
pub mod power_service;
pub mod resize_service;
pub mod retry;
pub mod tagging_service;
