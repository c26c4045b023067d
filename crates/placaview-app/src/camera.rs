//! Camera access
//!
//! A [`Camera`] hands out a [`MediaStream`]; the stream is a scoped resource
//! that must be stopped once the frame has been taken.

use image::DynamicImage;
use placaview_types::{CameraError, Result};

/// An open capture stream
pub trait MediaStream {
    /// Grab the current frame
    fn grab_frame(&mut self) -> Result<DynamicImage>;

    /// Release the device. Calling it twice is harmless.
    fn stop(&mut self);
}

/// Source of media streams
pub trait Camera {
    fn open(&mut self) -> Result<Box<dyn MediaStream>>;
}

/// Camera used when no capture backend is compiled in
#[derive(Debug, Default)]
pub struct UnavailableCamera;

impl Camera for UnavailableCamera {
    fn open(&mut self) -> Result<Box<dyn MediaStream>> {
        Err(CameraError::Unavailable.into())
    }
}

/// Best camera backend available in this build
pub fn default_camera(device: usize) -> Box<dyn Camera> {
    #[cfg(all(feature = "v4l", target_os = "linux"))]
    {
        Box::new(v4l_backend::V4lCamera::new(device))
    }

    #[cfg(not(all(feature = "v4l", target_os = "linux")))]
    {
        log::debug!("no camera backend compiled in (device {} ignored)", device);
        Box::new(UnavailableCamera)
    }
}

#[cfg(all(feature = "v4l", target_os = "linux"))]
pub mod v4l_backend {
    //! Video4Linux2 capture backend (MJPEG frames)

    use super::{Camera, MediaStream};
    use image::DynamicImage;
    use log::debug;
    use placaview_types::{CameraError, Result};
    use v4l::buffer::Type;
    use v4l::io::traits::CaptureStream;
    use v4l::prelude::*;
    use v4l::video::Capture;
    use v4l::FourCC;

    pub struct V4lCamera {
        index: usize,
    }

    impl V4lCamera {
        pub fn new(index: usize) -> Self {
            Self { index }
        }
    }

    impl Camera for V4lCamera {
        fn open(&mut self) -> Result<Box<dyn MediaStream>> {
            let device = Device::new(self.index)
                .map_err(|e| CameraError::Open(format!("/dev/video{}: {}", self.index, e)))?;

            let mut fmt = device
                .format()
                .map_err(|e| CameraError::Open(e.to_string()))?;
            fmt.fourcc = FourCC::new(b"MJPG");
            let fmt = device
                .set_format(&fmt)
                .map_err(|e| CameraError::Open(e.to_string()))?;
            if fmt.fourcc != FourCC::new(b"MJPG") {
                return Err(CameraError::Open(format!("MJPEG not supported (got {})", fmt.fourcc)).into());
            }

            let stream = MmapStream::with_buffers(&device, Type::VideoCapture, 4)
                .map_err(|e| CameraError::Open(e.to_string()))?;
            debug!("opened /dev/video{} at {}x{}", self.index, fmt.width, fmt.height);

            Ok(Box::new(V4lStream {
                stream: Some(stream),
                _device: device,
            }))
        }
    }

    struct V4lStream {
        stream: Option<MmapStream<'static>>,
        _device: Device,
    }

    impl MediaStream for V4lStream {
        fn grab_frame(&mut self) -> Result<DynamicImage> {
            let stream = self.stream.as_mut().ok_or(CameraError::NotOpen)?;
            let (data, _meta) = stream
                .next()
                .map_err(|e| CameraError::Capture(e.to_string()))?;
            Ok(image::load_from_memory(data)?)
        }

        fn stop(&mut self) {
            // Dropping the mmap stream turns streaming off
            self.stream = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placaview_types::Error;

    #[test]
    fn test_unavailable_camera_refuses_to_open() {
        let mut camera = UnavailableCamera;
        assert!(matches!(
            camera.open(),
            Err(Error::Camera(CameraError::Unavailable))
        ));
    }
}
