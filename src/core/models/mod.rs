pub mod institution;
pub mod member;
pub mod profile;
pub mod request;
