//! Capture flow for one upload attempt
//!
//! Idle -> (FilePicked | CameraOpen -> FrameCaptured) -> Submitting -> (Success | Failed)
//!
//! A failed submission keeps its payload (and the captured frame), so the
//! operator can send it again from Failed. Nothing is resent on its own.
//!
//! Starting a new attempt (picking a file, opening the camera) or calling
//! [`CaptureFlow::reset`] returns to Idle first. The camera stream is released
//! as soon as a frame is captured, on reset, and when the flow is dropped.

use image::DynamicImage;
use log::debug;
use placaview_types::{CameraError, Error, Result, UploadPayload};

use crate::camera::{Camera, MediaStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    FilePicked,
    CameraOpen,
    FrameCaptured,
    Submitting,
    Success,
    Failed,
}

pub struct CaptureFlow {
    camera: Box<dyn Camera>,
    stream: Option<Box<dyn MediaStream>>,
    state: CaptureState,
    payload: Option<UploadPayload>,
    captured: Option<DynamicImage>,
}

impl CaptureFlow {
    pub fn new(camera: Box<dyn Camera>) -> Self {
        Self {
            camera,
            stream: None,
            state: CaptureState::Idle,
            payload: None,
            captured: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_stream_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Frame taken from the camera, kept for preview until the attempt ends
    pub fn captured_frame(&self) -> Option<&DynamicImage> {
        self.captured.as_ref()
    }

    /// Payload waiting to be submitted
    pub fn pending_payload(&self) -> Option<&UploadPayload> {
        self.payload.as_ref()
    }

    /// Start an attempt with an image file
    pub fn pick_file(&mut self, payload: UploadPayload) -> Result<()> {
        self.ensure_not_submitting()?;
        self.reset();
        self.payload = Some(payload);
        self.state = CaptureState::FilePicked;
        Ok(())
    }

    /// Start an attempt with the camera
    pub fn open_camera(&mut self) -> Result<()> {
        self.ensure_not_submitting()?;
        self.reset();
        let stream = self.camera.open()?;
        self.stream = Some(stream);
        self.state = CaptureState::CameraOpen;
        debug!("camera stream opened");
        Ok(())
    }

    /// Live frame for preview; leaves the state untouched
    pub fn preview_frame(&mut self) -> Result<DynamicImage> {
        match self.stream.as_mut() {
            Some(stream) if self.state == CaptureState::CameraOpen => stream.grab_frame(),
            _ => Err(CameraError::NotOpen.into()),
        }
    }

    /// Take one frame, release the stream, and encode the frame for upload.
    ///
    /// The stream is released even when grabbing fails; the flow then falls
    /// back to Idle.
    pub fn capture(&mut self) -> Result<()> {
        if self.state != CaptureState::CameraOpen {
            return Err(CameraError::NotOpen.into());
        }
        let Some(mut stream) = self.stream.take() else {
            return Err(CameraError::NotOpen.into());
        };

        let grabbed = stream.grab_frame();
        stream.stop();
        debug!("camera stream released after capture");

        let encoded = grabbed.and_then(|frame| {
            let payload = UploadPayload::from_frame(&frame)?;
            Ok((frame, payload))
        });
        match encoded {
            Ok((frame, payload)) => {
                self.captured = Some(frame);
                self.payload = Some(payload);
                self.state = CaptureState::FrameCaptured;
                Ok(())
            }
            Err(e) => {
                self.state = CaptureState::Idle;
                Err(e)
            }
        }
    }

    /// Whether a payload is waiting to be (re)submitted
    pub fn is_ready(&self) -> bool {
        self.payload.is_some()
            && matches!(
                self.state,
                CaptureState::FilePicked | CaptureState::FrameCaptured | CaptureState::Failed
            )
    }

    /// Move to Submitting and hand out the payload; None when nothing is ready
    pub fn begin_submit(&mut self) -> Option<UploadPayload> {
        if !self.is_ready() {
            return None;
        }
        let payload = self.payload.clone()?;
        self.state = CaptureState::Submitting;
        Some(payload)
    }

    /// Record the outcome of the submission that `begin_submit` started
    pub fn finish_submit(&mut self, succeeded: bool) {
        if self.state != CaptureState::Submitting {
            return;
        }
        if succeeded {
            self.payload = None;
            self.captured = None;
            self.state = CaptureState::Success;
        } else {
            self.state = CaptureState::Failed;
        }
    }

    /// Drop everything from the current attempt and release the camera
    pub fn reset(&mut self) {
        self.release_stream();
        self.payload = None;
        self.captured = None;
        self.state = CaptureState::Idle;
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("camera stream released");
        }
    }

    fn ensure_not_submitting(&self) -> Result<()> {
        if self.state == CaptureState::Submitting {
            return Err(Error::InvalidInput("an upload is already in progress".to_string()));
        }
        Ok(())
    }
}

impl Drop for CaptureFlow {
    fn drop(&mut self) {
        self.release_stream();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCamera;

    fn file_payload() -> UploadPayload {
        UploadPayload::File {
            filename: "carro.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_capture_releases_stream() {
        let camera = FakeCamera::new();
        let active = camera.active_streams();
        let mut flow = CaptureFlow::new(Box::new(camera));

        flow.open_camera().unwrap();
        assert_eq!(flow.state(), CaptureState::CameraOpen);
        assert_eq!(active.get(), 1);

        flow.preview_frame().unwrap();
        assert_eq!(flow.state(), CaptureState::CameraOpen);

        flow.capture().unwrap();
        assert_eq!(flow.state(), CaptureState::FrameCaptured);
        assert!(!flow.is_stream_active());
        assert_eq!(active.get(), 0);
        assert!(flow.captured_frame().is_some());
        assert!(flow.pending_payload().unwrap().is_frame());
    }

    #[test]
    fn test_reset_releases_stream() {
        let camera = FakeCamera::new();
        let active = camera.active_streams();
        let mut flow = CaptureFlow::new(Box::new(camera));

        flow.open_camera().unwrap();
        flow.reset();
        assert_eq!(flow.state(), CaptureState::Idle);
        assert_eq!(active.get(), 0);
    }

    #[test]
    fn test_drop_releases_stream() {
        let camera = FakeCamera::new();
        let active = camera.active_streams();
        {
            let mut flow = CaptureFlow::new(Box::new(camera));
            flow.open_camera().unwrap();
            assert_eq!(active.get(), 1);
        }
        assert_eq!(active.get(), 0);
    }

    #[test]
    fn test_failed_grab_still_releases_stream() {
        let camera = FakeCamera::failing_grab();
        let active = camera.active_streams();
        let mut flow = CaptureFlow::new(Box::new(camera));

        flow.open_camera().unwrap();
        assert!(flow.capture().is_err());
        assert_eq!(flow.state(), CaptureState::Idle);
        assert_eq!(active.get(), 0);
        assert!(flow.begin_submit().is_none());
    }

    #[test]
    fn test_picking_file_closes_open_camera() {
        let camera = FakeCamera::new();
        let active = camera.active_streams();
        let mut flow = CaptureFlow::new(Box::new(camera));

        flow.open_camera().unwrap();
        flow.pick_file(file_payload()).unwrap();
        assert_eq!(flow.state(), CaptureState::FilePicked);
        assert_eq!(active.get(), 0);
    }

    #[test]
    fn test_submit_sequence() {
        let mut flow = CaptureFlow::new(Box::new(FakeCamera::new()));
        assert!(flow.begin_submit().is_none());

        flow.pick_file(file_payload()).unwrap();
        let payload = flow.begin_submit().unwrap();
        assert_eq!(payload, file_payload());
        assert_eq!(flow.state(), CaptureState::Submitting);

        // Busy: nothing else can start
        assert!(flow.begin_submit().is_none());
        assert!(flow.pick_file(file_payload()).is_err());
        assert!(flow.open_camera().is_err());

        flow.finish_submit(true);
        assert_eq!(flow.state(), CaptureState::Success);
        assert!(flow.pending_payload().is_none());
        assert!(flow.begin_submit().is_none());

        flow.reset();
        assert_eq!(flow.state(), CaptureState::Idle);
    }

    #[test]
    fn test_failed_frame_can_be_sent_again() {
        let mut flow = CaptureFlow::new(Box::new(FakeCamera::new()));
        flow.open_camera().unwrap();
        flow.capture().unwrap();

        let first = flow.begin_submit().unwrap();
        flow.finish_submit(false);
        assert_eq!(flow.state(), CaptureState::Failed);
        assert!(flow.captured_frame().is_some());
        assert!(flow.is_ready());

        // Only when asked again, with the same frame
        let second = flow.begin_submit().unwrap();
        assert_eq!(second, first);
        assert_eq!(flow.state(), CaptureState::Submitting);

        flow.finish_submit(true);
        assert!(flow.captured_frame().is_none());
        assert!(!flow.is_ready());
    }

    #[test]
    fn test_capture_requires_open_camera() {
        let mut flow = CaptureFlow::new(Box::new(FakeCamera::new()));
        assert!(flow.capture().is_err());
        assert!(flow.preview_frame().is_err());
    }
}
