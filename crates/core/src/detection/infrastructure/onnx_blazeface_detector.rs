/// BlazeFace face detector using ONNX Runtime via `ort`.
///
/// Decodes bounding boxes and the two eye keypoints from the short-range
/// model, and derives eye contours from those keypoints.
use std::path::Path;

use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_landmarks::EyeLandmarks;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// Default confidence threshold.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

/// Values per anchor in the regressor output: box (4) + 6 keypoints (12).
const REGRESSOR_STRIDE: usize = 16;

/// Regressor offsets of the subject's right and left eye keypoints.
const RIGHT_EYE_OFFSET: usize = 4;
const LEFT_EYE_OFFSET: usize = 6;

/// BlazeFace face detector backed by an ONNX Runtime session.
pub struct OnnxBlazefaceDetector {
    session: ort::session::Session,
    confidence: f64,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceDetector {
    /// Load a BlazeFace ONNX model.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        log::debug!("Loaded BlazeFace model from {}", model_path.display());
        Ok(Self {
            session,
            confidence,
            anchors: generate_anchors(),
        })
    }
}

impl FaceDetector for OnnxBlazefaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        let input_tensor = preprocess(frame, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // regressors: [1, 896, 16], classificators: [1, 896, 1]
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }

        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        let mut raw_dets = decode(
            reg_data,
            score_data,
            &self.anchors,
            self.confidence as f32,
            frame.width(),
            frame.height(),
        );
        let kept = nms(&mut raw_dets, NMS_IOU_THRESH);
        log::debug!("BlazeFace kept {} of {} candidates", kept.len(), raw_dets.len());

        Ok(kept
            .iter()
            .map(|d| to_detected_face(d, frame.width(), frame.height()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize frame to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Anchor generation (BlazeFace short-range)
// ---------------------------------------------------------------------------

/// Two feature maps: 16×16 with 2 anchors per cell, 8×8 with 6.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }

    anchors
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDet {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    score: f64,
    left_eye: (f64, f64),
    right_eye: (f64, f64),
}

/// Turns raw model outputs into frame-space candidates above `min_score`.
fn decode(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    min_score: f32,
    fw: u32,
    fh: u32,
) -> Vec<RawDet> {
    let (fw, fh) = (fw as f32, fh as f32);
    let scale = INPUT_SIZE as f32;
    let num_anchors = anchors.len().min(NUM_ANCHORS);
    let mut dets = Vec::new();

    for (i, &raw_score) in score_data.iter().enumerate().take(num_anchors) {
        let score = sigmoid(raw_score);
        if score < min_score {
            continue;
        }

        let offset = i * REGRESSOR_STRIDE;
        if offset + REGRESSOR_STRIDE > reg_data.len() {
            break;
        }
        let reg = &reg_data[offset..offset + REGRESSOR_STRIDE];
        let anchor = anchors[i];

        let cx = anchor[0] + reg[0] / scale;
        let cy = anchor[1] + reg[1] / scale;
        let w = reg[2] / scale;
        let h = reg[3] / scale;

        let keypoint = |k: usize| -> (f64, f64) {
            (
                ((anchor[0] + reg[k] / scale) * fw) as f64,
                ((anchor[1] + reg[k + 1] / scale) * fh) as f64,
            )
        };

        dets.push(RawDet {
            x1: ((cx - w / 2.0) * fw).max(0.0) as f64,
            y1: ((cy - h / 2.0) * fh).max(0.0) as f64,
            x2: ((cx + w / 2.0) * fw).min(fw) as f64,
            y2: ((cy + h / 2.0) * fh).min(fh) as f64,
            score: score as f64,
            left_eye: keypoint(LEFT_EYE_OFFSET),
            right_eye: keypoint(RIGHT_EYE_OFFSET),
        });
    }

    dets
}

fn to_detected_face(d: &RawDet, fw: u32, fh: u32) -> DetectedFace {
    // x1/y1 are already clamped to >= 0 during decoding
    let x = d.x1 as i32;
    let y = d.y1 as i32;
    let width = ((d.x2 - d.x1) as i32).min(fw as i32 - x);
    let height = ((d.y2 - d.y1) as i32).min(fh as i32 - y);

    let landmarks = EyeLandmarks::new(d.left_eye, d.right_eye);
    let (left, right) = landmarks.contours(width as f64);

    DetectedFace::new(FaceBox::new(x, y, width, height), d.score).with_eye_contours(left, right)
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

/// Greedy NMS; the result is ordered by descending score.
fn nms(dets: &mut [RawDet], iou_thresh: f64) -> Vec<RawDet> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if !suppressed[j] && bbox_iou(&dets[i], &dets[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn bbox_iou(a: &RawDet, b: &RawDet) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
