use super::{
    capture_backend::CaptureBackend,
    synthetic_capture::{Permission, SyntheticCapture},
};
use crate::config::Config;

/// Which capture implementation backs `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Synthetic,
    /// OpenCV camera + cpal microphone; needs the `devices` feature.
    Devices,
}

/// `[Media]` settings that select and shape the capture backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    pub backend: BackendKind,
    pub permission: Permission,
    /// Synthetic camera resolution; `None` simulates a machine without camera.
    pub camera: Option<(u32, u32)>,
    pub microphone: bool,
    /// Camera index for the device backend.
    pub device_id: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Synthetic,
            permission: Permission::Granted,
            camera: Some((1280, 720)),
            microphone: true,
            device_id: 0,
        }
    }
}

impl CaptureSettings {
    /// Reads `backend`, `permission`, `camera` (`WxH` or `none`), `microphone`
    /// and `device_id` from `[Media]`.
    ///
    /// # Errors
    /// Returns the first invalid value.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let d = Self::default();
        let backend = match config.get_non_empty("Media", "backend") {
            None | Some("synthetic") => BackendKind::Synthetic,
            Some("devices") => BackendKind::Devices,
            Some(other) => return Err(format!("Invalid value for [Media] backend: '{other}'")),
        };
        let permission = match config.get_non_empty("Media", "permission") {
            None | Some("granted") => Permission::Granted,
            Some("denied") => Permission::Denied,
            Some(other) => {
                return Err(format!("Invalid value for [Media] permission: '{other}'"));
            }
        };
        let camera = match config.get_non_empty("Media", "camera") {
            None => d.camera,
            Some("none") => None,
            Some(raw) => Some(
                parse_resolution(raw)
                    .ok_or_else(|| format!("Invalid value for [Media] camera: '{raw}'"))?,
            ),
        };
        Ok(Self {
            backend,
            permission,
            camera,
            microphone: config.get_bool("Media", "microphone", d.microphone)?,
            device_id: config.get_parsed("Media", "device_id", d.device_id)?,
        })
    }

    /// Instantiates the selected backend.
    ///
    /// # Errors
    /// Fails when the device backend is selected but was not compiled in.
    pub fn build_backend(&self) -> Result<Box<dyn CaptureBackend>, String> {
        match self.backend {
            BackendKind::Synthetic => Ok(Box::new(SyntheticCapture::new(
                self.permission,
                self.camera,
                self.microphone,
            ))),
            #[cfg(feature = "devices")]
            BackendKind::Devices => Ok(Box::new(super::device_capture::DeviceCapture::new(
                self.device_id,
            ))),
            #[cfg(not(feature = "devices"))]
            BackendKind::Devices => {
                Err("[Media] backend = devices requires the `devices` feature".to_owned())
            }
        }
    }
}

fn parse_resolution(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.split_once(['x', 'X'])?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::media::media_constraints::MediaConstraints;

    #[test]
    fn parses_camera_and_permission() {
        let cfg = Config::parse("[Media]\ncamera = 1920x1080\npermission = denied\n");
        let s = CaptureSettings::from_config(&cfg).unwrap();
        assert_eq!(s.camera, Some((1920, 1080)));
        assert_eq!(s.permission, Permission::Denied);
        assert_eq!(s.backend, BackendKind::Synthetic);

        let none = CaptureSettings::from_config(&Config::parse("[Media]\ncamera = none\n")).unwrap();
        assert_eq!(none.camera, None);
    }

    #[test]
    fn rejects_unknown_backend_and_bad_resolution() {
        assert!(CaptureSettings::from_config(&Config::parse("[Media]\nbackend = v4l\n")).is_err());
        assert!(CaptureSettings::from_config(&Config::parse("[Media]\ncamera = big\n")).is_err());
    }

    #[test]
    fn synthetic_backend_honours_settings() {
        let s = CaptureSettings {
            permission: Permission::Denied,
            ..CaptureSettings::default()
        };
        let mut backend = s.build_backend().unwrap();
        let err = backend.open(&MediaConstraints::default()).err().expect("denied");
        assert_eq!(err.reason(), "permission-denied");
    }
}
