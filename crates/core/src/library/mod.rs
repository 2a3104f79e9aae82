pub mod gallery_exporter;
pub mod library_error;
pub mod saved_faces;
