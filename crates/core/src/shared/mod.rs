pub mod config;
pub mod constants;
pub mod face_box;
pub mod file_uri;
pub mod frame;
