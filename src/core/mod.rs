pub mod member_id;
pub mod models;
pub mod ports;
pub mod services;
