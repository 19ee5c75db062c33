//! sentio-hw — Hardware abstraction for camera capture.
//!
//! Provides V4L2-based color frame acquisition for the analysis pipeline.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, DeviceInfo};
