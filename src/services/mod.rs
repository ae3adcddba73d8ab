pub mod chart_service;
pub mod request_service;
pub mod series_service;
pub mod symbol_service;
