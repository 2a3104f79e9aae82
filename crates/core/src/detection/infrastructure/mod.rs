pub mod model_resolver;
pub mod onnx_blazeface_detector;
pub mod timed_face_detector;
