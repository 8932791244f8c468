use crate::{config::Config, media::TrackKind};

/// `RTCOfferOptions`: ask to receive a kind even without sending it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferOptions {
    pub offer_to_receive_audio: bool,
    pub offer_to_receive_video: bool,
}

impl Default for OfferOptions {
    fn default() -> Self {
        Self {
            offer_to_receive_audio: false,
            offer_to_receive_video: true,
        }
    }
}

impl OfferOptions {
    /// # Errors
    /// Returns the first invalid `[Call]` boolean.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let d = Self::default();
        Ok(Self {
            offer_to_receive_audio: config.get_bool(
                "Call",
                "offer_to_receive_audio",
                d.offer_to_receive_audio,
            )?,
            offer_to_receive_video: config.get_bool(
                "Call",
                "offer_to_receive_video",
                d.offer_to_receive_video,
            )?,
        })
    }

    #[must_use]
    pub const fn wants(&self, kind: TrackKind) -> bool {
        match kind {
            TrackKind::Audio => self.offer_to_receive_audio,
            TrackKind::Video => self.offer_to_receive_video,
        }
    }
}
