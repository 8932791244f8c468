use super::{fingerprint::Fingerprint, media_section::MediaSection};

/// Writes offer/answer payloads: one BUNDLE group, one `m=` section per
/// negotiated track slot, ICE credentials and DTLS fingerprint repeated per
/// section the way browsers emit them.
#[derive(Debug, Clone)]
pub struct SdpBuilder<'a> {
    session_id: u64,
    ufrag: &'a str,
    pwd: &'a str,
    fingerprint: &'a Fingerprint,
    setup: &'static str,
    sections: Vec<MediaSection>,
}

impl<'a> SdpBuilder<'a> {
    /// `setup` is `actpass` for offers and `active` for answers.
    #[must_use]
    pub const fn new(
        session_id: u64,
        ufrag: &'a str,
        pwd: &'a str,
        fingerprint: &'a Fingerprint,
        setup: &'static str,
    ) -> Self {
        Self {
            session_id,
            ufrag,
            pwd,
            fingerprint,
            setup,
            sections: Vec::new(),
        }
    }

    #[must_use]
    pub fn section(mut self, section: MediaSection) -> Self {
        self.sections.push(section);
        self
    }

    #[must_use]
    pub fn build(&self) -> String {
        let mut out = String::new();
        macro_rules! pushln {
            ($($arg:tt)*) => {{
                out.push_str(&format!($($arg)*));
                out.push_str("\r\n");
            }};
        }

        pushln!("v=0");
        pushln!("o=- {} 2 IN IP4 127.0.0.1", self.session_id);
        pushln!("s=-");
        pushln!("t=0 0");
        let mids: Vec<&str> = self.sections.iter().map(|s| s.mid.as_str()).collect();
        pushln!("a=group:BUNDLE {}", mids.join(" "));
        pushln!("a=msid-semantic: WMS");

        for s in &self.sections {
            let (pt, encoding) = s.codec();
            pushln!("m={} 9 UDP/TLS/RTP/SAVPF {pt}", s.kind);
            pushln!("c=IN IP4 0.0.0.0");
            pushln!("a=rtcp:9 IN IP4 0.0.0.0");
            pushln!("a=ice-ufrag:{}", self.ufrag);
            pushln!("a=ice-pwd:{}", self.pwd);
            pushln!("a=ice-options:trickle");
            pushln!("a=fingerprint:{}", self.fingerprint);
            pushln!("a=setup:{}", self.setup);
            pushln!("a=mid:{}", s.mid);
            pushln!("a={}", s.direction);
            if let Some(msid) = &s.msid {
                pushln!("a=msid:{} {}", msid.stream_id, msid.track_id);
            }
            pushln!("a=rtcp-mux");
            pushln!("a=rtpmap:{pt} {encoding}");
        }
        out
    }
}
