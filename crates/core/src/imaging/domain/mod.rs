pub mod canvas;
pub mod crop;
pub mod image_reader;
pub mod image_writer;
