use crate::config::Config;

/// Capture request: minimum video resolution and the kinds wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub min_width: u32,
    pub min_height: u32,
    pub video: bool,
    pub audio: bool,
}

impl Default for MediaConstraints {
    /// 720p minimum with audio.
    fn default() -> Self {
        Self {
            min_width: 1280,
            min_height: 720,
            video: true,
            audio: true,
        }
    }
}

impl MediaConstraints {
    /// Reads the `[Media]` section.
    ///
    /// # Errors
    /// Returns the first invalid value.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let d = Self::default();
        Ok(Self {
            min_width: config.get_parsed("Media", "min_width", d.min_width)?,
            min_height: config.get_parsed("Media", "min_height", d.min_height)?,
            video: config.get_bool("Media", "video", d.video)?,
            audio: config.get_bool("Media", "audio", d.audio)?,
        })
    }

    /// Checks a device resolution against the minimums.
    ///
    /// Returns the first violated constraint as `(name, required, actual)`.
    #[must_use]
    pub fn violation(&self, width: u32, height: u32) -> Option<(&'static str, u32, u32)> {
        if width < self.min_width {
            Some(("minWidth", self.min_width, width))
        } else if height < self.min_height {
            Some(("minHeight", self.min_height, height))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_reports_width_before_height() {
        let c = MediaConstraints::default();
        assert_eq!(c.violation(1920, 1080), None);
        assert_eq!(c.violation(1280, 720), None);
        assert_eq!(c.violation(640, 480), Some(("minWidth", 1280, 640)));
        assert_eq!(c.violation(1280, 480), Some(("minHeight", 720, 480)));
    }
}
