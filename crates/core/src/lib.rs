pub mod bridge;
pub mod detection;
pub mod imaging;
pub mod library;
pub mod pipeline;
pub mod shared;
