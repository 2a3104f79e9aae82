pub mod autocrop_module;
pub mod bridge_error;
pub mod media_scanner;
pub mod promise;
pub mod response;
