pub const APP_DIR_NAME: &str = "AutoCrop";

pub const BLAZEFACE_MODEL_NAME: &str = "blazeface_short_range.onnx";

pub const PROCESSED_FACES_DIR: &str = "ProcessedFaces";
pub const SAVED_FACES_DIR: &str = "SavedFaces";
pub const MEDIA_INDEX_FILE: &str = "media_index.json";

/// Fraction of the face box added on every side before cropping.
pub const DEFAULT_FACE_PADDING: f64 = 0.2;

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

pub const DEFAULT_DETECTION_TIMEOUT_MS: u64 = 5000;

/// Share of each dimension kept by the no-face centre crop.
pub const DEFAULT_FALLBACK_CROP_FACTOR: f64 = 0.7;

pub const DEFAULT_BOX_STROKE_WIDTH: u32 = 5;
pub const DEFAULT_CONTOUR_DOT_RADIUS: f32 = 3.0;

pub const BOX_COLOR: [u8; 3] = [0, 255, 0];
pub const CONTOUR_COLOR: [u8; 3] = [255, 0, 0];
