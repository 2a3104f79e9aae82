pub mod face_processor;
pub mod processor_error;
