use super::{
    fingerprint::Fingerprint,
    media_direction::MediaDirection,
    media_section::{MediaSection, Msid},
    sdp_error::SdpError,
};
use crate::media::TrackKind;

/// The parts of a remote SDP payload that negotiation and candidate
/// validation depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdpSummary {
    pub session_id: u64,
    pub ice_ufrag: String,
    pub ice_pwd: String,
    pub fingerprint: String,
    pub setup: Option<String>,
    pub bundle: Vec<String>,
    pub sections: Vec<MediaSection>,
}

#[derive(Default)]
struct PartialSection {
    kind: Option<TrackKind>,
    mid: Option<String>,
    direction: Option<MediaDirection>,
    msid: Option<Msid>,
}

impl PartialSection {
    fn finish(self) -> Result<MediaSection, SdpError> {
        Ok(MediaSection {
            mid: self.mid.ok_or(SdpError::Missing("a=mid"))?,
            kind: self.kind.ok_or(SdpError::Invalid("m="))?,
            // RFC 4566: a section without a direction attribute is sendrecv.
            direction: self.direction.unwrap_or(MediaDirection::SendRecv),
            msid: self.msid,
        })
    }
}

/// Keeps the first value seen; a later different value is an error.
fn set_once(slot: &mut Option<String>, value: &str, what: &'static str) -> Result<(), SdpError> {
    match slot {
        Some(existing) if existing != value => Err(SdpError::Invalid(what)),
        Some(_) => Ok(()),
        None => {
            *slot = Some(value.to_owned());
            Ok(())
        }
    }
}

impl SdpSummary {
    /// Reads a payload produced by [`SdpBuilder`](super::sdp_builder::SdpBuilder)
    /// or any equivalent single-BUNDLE WebRTC description.
    ///
    /// # Errors
    /// Returns [`SdpError`] for missing mandatory lines (`v=`, `o=`, `m=`,
    /// `a=mid`, ICE credentials, fingerprint) or malformed values.
    pub fn parse(input: &str) -> Result<Self, SdpError> {
        let mut version: Option<u8> = None;
        let mut session_id: Option<u64> = None;
        let mut ufrag: Option<String> = None;
        let mut pwd: Option<String> = None;
        let mut fingerprint: Option<String> = None;
        let mut setup: Option<String> = None;
        let mut bundle: Vec<String> = Vec::new();
        let mut sections: Vec<MediaSection> = Vec::new();
        let mut current: Option<PartialSection> = None;

        for raw in input.split('\n') {
            let line = raw.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let Some((prefix, rest)) = line.split_once('=') else {
                continue;
            };
            match prefix {
                "v" => version = Some(rest.parse::<u8>()?),
                "o" => {
                    let parts: Vec<_> = rest.split_whitespace().collect();
                    if parts.len() != 6 {
                        return Err(SdpError::Invalid("o="));
                    }
                    session_id = Some(parts[1].parse::<u64>()?);
                }
                "m" => {
                    if let Some(done) = current.take() {
                        sections.push(done.finish()?);
                    }
                    let kind = rest
                        .split_whitespace()
                        .next()
                        .and_then(|k| k.parse::<TrackKind>().ok())
                        .ok_or(SdpError::Invalid("m= media kind"))?;
                    current = Some(PartialSection {
                        kind: Some(kind),
                        ..PartialSection::default()
                    });
                }
                "a" => {
                    let (key, val) = match rest.split_once(':') {
                        Some((k, v)) => (k.trim(), v.trim()),
                        None => (rest.trim(), ""),
                    };
                    match key {
                        "ice-ufrag" => set_once(&mut ufrag, val, "ice-ufrag")?,
                        "ice-pwd" => set_once(&mut pwd, val, "ice-pwd")?,
                        "fingerprint" => {
                            let Some((algo, value)) = val.split_once(' ') else {
                                return Err(SdpError::Invalid("a=fingerprint"));
                            };
                            if algo != Fingerprint::ALGORITHM || !Fingerprint::is_valid(value) {
                                return Err(SdpError::Invalid("a=fingerprint"));
                            }
                            set_once(&mut fingerprint, value, "a=fingerprint")?;
                        }
                        "setup" => setup = Some(val.to_owned()),
                        "group" => {
                            if let Some(mids) = val.strip_prefix("BUNDLE") {
                                bundle = mids.split_whitespace().map(str::to_owned).collect();
                            }
                        }
                        "mid" => {
                            if let Some(sec) = current.as_mut() {
                                if val.is_empty() {
                                    return Err(SdpError::Invalid("a=mid"));
                                }
                                sec.mid = Some(val.to_owned());
                            }
                        }
                        "msid" => {
                            if let Some(sec) = current.as_mut() {
                                let mut it = val.split_whitespace();
                                let (Some(stream_id), Some(track_id)) = (it.next(), it.next())
                                else {
                                    return Err(SdpError::Invalid("a=msid"));
                                };
                                sec.msid = Some(Msid {
                                    stream_id: stream_id.to_owned(),
                                    track_id: track_id.to_owned(),
                                });
                            }
                        }
                        other => {
                            if let (Some(sec), Ok(dir)) =
                                (current.as_mut(), other.parse::<MediaDirection>())
                            {
                                sec.direction = Some(dir);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        if let Some(done) = current.take() {
            sections.push(done.finish()?);
        }

        if version.ok_or(SdpError::Missing("v="))? != 0 {
            return Err(SdpError::Invalid("v="));
        }
        if sections.is_empty() {
            return Err(SdpError::Missing("m="));
        }
        for (i, s) in sections.iter().enumerate() {
            if sections[..i].iter().any(|o| o.mid == s.mid) {
                return Err(SdpError::Invalid("duplicate a=mid"));
            }
        }
        if bundle
            .iter()
            .any(|mid| !sections.iter().any(|s| &s.mid == mid))
        {
            return Err(SdpError::Invalid("a=group:BUNDLE"));
        }

        Ok(Self {
            session_id: session_id.ok_or(SdpError::Missing("o="))?,
            ice_ufrag: ufrag.ok_or(SdpError::Missing("a=ice-ufrag"))?,
            ice_pwd: pwd.ok_or(SdpError::Missing("a=ice-pwd"))?,
            fingerprint: fingerprint.ok_or(SdpError::Missing("a=fingerprint"))?,
            setup,
            bundle,
            sections,
        })
    }

    #[must_use]
    pub fn section_by_mid(&self, mid: &str) -> Option<&MediaSection> {
        self.sections.iter().find(|s| s.mid == mid)
    }

    #[must_use]
    pub fn section_at(&self, index: u16) -> Option<&MediaSection> {
        self.sections.get(usize::from(index))
    }

    /// Sections in which the author sends a track, i.e. the tracks the
    /// reader of this description will receive.
    pub fn sending_sections(&self) -> impl Iterator<Item = (&MediaSection, &Msid)> {
        self.sections
            .iter()
            .filter(|s| s.direction.sends())
            .filter_map(|s| s.msid.as_ref().map(|m| (s, m)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::sdp::sdp_builder::SdpBuilder;

    fn sample() -> (Fingerprint, String) {
        let fp = Fingerprint::generate();
        let sdp = SdpBuilder::new(42, "abcd1234", "p".repeat(24).as_str(), &fp, "actpass")
            .section(MediaSection {
                mid: "0".into(),
                kind: TrackKind::Video,
                direction: MediaDirection::SendRecv,
                msid: Some(Msid {
                    stream_id: "s1".into(),
                    track_id: "t1".into(),
                }),
            })
            .section(MediaSection {
                mid: "1".into(),
                kind: TrackKind::Audio,
                direction: MediaDirection::RecvOnly,
                msid: None,
            })
            .build();
        (fp, sdp)
    }

    #[test]
    fn reads_back_what_the_builder_writes() {
        let (fp, sdp) = sample();
        assert!(sdp.contains("a=group:BUNDLE 0 1\r\n"));
        assert!(sdp.contains("a=rtpmap:96 VP8/90000\r\n"));

        let summary = SdpSummary::parse(&sdp).unwrap();
        assert_eq!(summary.session_id, 42);
        assert_eq!(summary.ice_ufrag, "abcd1234");
        assert_eq!(summary.fingerprint, fp.as_str());
        assert_eq!(summary.setup.as_deref(), Some("actpass"));
        assert_eq!(summary.bundle, vec!["0", "1"]);
        assert_eq!(summary.sections.len(), 2);
        assert_eq!(summary.section_by_mid("1").unwrap().kind, TrackKind::Audio);
        assert_eq!(summary.section_at(0).unwrap().mid, "0");
        assert!(summary.section_at(2).is_none());

        let sending: Vec<_> = summary.sending_sections().collect();
        assert_eq!(sending.len(), 1);
        assert_eq!(sending[0].1.track_id, "t1");
    }

    #[test]
    fn rejects_payloads_missing_mandatory_parts() {
        assert_eq!(
            SdpSummary::parse("hello"),
            Err(SdpError::Missing("v="))
        );
        let (_, sdp) = sample();
        let no_mid = sdp.replace("a=mid:1\r\n", "");
        assert_eq!(SdpSummary::parse(&no_mid), Err(SdpError::Missing("a=mid")));
        let no_pwd: String = sdp
            .lines()
            .filter(|l| !l.starts_with("a=ice-pwd"))
            .map(|l| format!("{l}\r\n"))
            .collect();
        assert_eq!(SdpSummary::parse(&no_pwd), Err(SdpError::Missing("a=ice-pwd")));
        let sessions_only = "v=0\r\no=- 1 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n";
        assert_eq!(SdpSummary::parse(sessions_only), Err(SdpError::Missing("m=")));
    }

    #[test]
    fn rejects_inconsistent_credentials_and_bad_fingerprint() {
        let (_, sdp) = sample();
        let mut seen = false;
        let mixed: String = sdp
            .lines()
            .map(|l| {
                if l.starts_with("a=ice-ufrag") && seen {
                    "a=ice-ufrag:other\r\n".to_owned()
                } else {
                    seen |= l.starts_with("a=ice-ufrag");
                    format!("{l}\r\n")
                }
            })
            .collect();
        assert_eq!(SdpSummary::parse(&mixed), Err(SdpError::Invalid("ice-ufrag")));

        let bad_fp = sdp.replacen("a=fingerprint:sha-256 ", "a=fingerprint:sha-1 ", 1);
        assert_eq!(SdpSummary::parse(&bad_fp), Err(SdpError::Invalid("a=fingerprint")));
    }
}
