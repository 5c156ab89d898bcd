pub mod course;
pub mod request;
pub mod thesis;
pub mod user;
