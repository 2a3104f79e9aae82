pub mod jpeg_image_writer;
pub mod oriented_image_reader;
pub mod processed_image_store;
