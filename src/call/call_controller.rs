use std::sync::Arc;
use std::time::Instant;

use super::{
    call_error::CallError, call_event::CallEvent, call_session::CallSession,
    call_status::CallStatus, control_state::ControlState, render_sink::RenderSink,
};
use crate::{
    config::CallConfig,
    ice::ConnectivityState,
    log::log_sink::LogSink,
    media::{MediaSource, MediaTrack, capture_backend::CaptureBackend},
    negotiation::{CoordinatorEvent, NegotiationCoordinator},
    peer::{PeerConnection, PeerEvent, PeerId},
    sink_error, sink_info, sink_warn,
};

/// The three user controls (`start`, `call`, `end`) over one loopback call.
///
/// The controller exclusively owns the [`MediaSource`] from `start` until
/// `end`, and the [`CallSession`] from `call` until `end`. Controls invoked
/// out of order fail with [`CallError::InvalidCallState`] and change nothing.
pub struct CallController {
    config: CallConfig,
    backend: Box<dyn CaptureBackend>,
    renderer: Arc<dyn RenderSink>,
    logger: Arc<dyn LogSink>,
    status: CallStatus,
    media: Option<MediaSource>,
    session: Option<CallSession>,
}

impl CallController {
    #[must_use]
    pub fn new(
        config: CallConfig,
        backend: Box<dyn CaptureBackend>,
        renderer: Arc<dyn RenderSink>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            config,
            backend,
            renderer,
            logger,
            status: CallStatus::Idle,
            media: None,
            session: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> CallStatus {
        self.status
    }

    #[must_use]
    pub const fn control_state(&self) -> ControlState {
        ControlState::for_status(self.status)
    }

    #[must_use]
    pub const fn media(&self) -> Option<&MediaSource> {
        self.media.as_ref()
    }

    #[must_use]
    pub const fn session(&self) -> Option<&CallSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &CallConfig {
        &self.config
    }

    /// Live local and inbound tracks.
    #[must_use]
    pub fn live_track_count(&self) -> usize {
        let local = self.media.as_ref().map_or(0, MediaSource::live_track_count);
        let inbound = self.session.as_ref().map_or(0, |s| {
            s.remote_tracks.iter().filter(|t| t.is_live()).count()
        });
        local + inbound
    }

    /// Acquires local media and previews it in `localVideo`.
    ///
    /// # Errors
    /// [`CallError::InvalidCallState`] unless idle or ended;
    /// [`CallError::Acquisition`] if capture fails, leaving the status as is.
    pub fn start_media(&mut self) -> Result<(), CallError> {
        self.require(self.control_state().start, "start")?;
        sink_info!(self.logger, "Requesting local stream");

        let source = MediaSource::acquire(
            self.backend.as_mut(),
            &self.config.constraints,
            self.logger.clone(),
        )
        .map_err(|e| {
            sink_error!(self.logger, "Media acquisition failed ({}): {}", e.reason(), e);
            CallError::Acquisition(e)
        })?;

        self.renderer
            .render(PeerId::Local.video_sink_id(), source.tracks());
        self.media = Some(source);
        self.set_status(CallStatus::MediaReady);
        Ok(())
    }

    /// Places the call at the current time.
    ///
    /// # Errors
    /// See [`place_call_at`](Self::place_call_at).
    pub fn place_call(&mut self) -> Result<(), CallError> {
        self.place_call_at(Instant::now())
    }

    /// Attaches the first video track (or, without video, the first audio
    /// track) to the local connection and starts negotiation. `now` is the
    /// start of the setup-time measurement.
    ///
    /// # Errors
    /// [`CallError::InvalidCallState`] unless media is ready;
    /// [`CallError::Negotiation`] if the offer cannot be created. The status
    /// then stays `negotiating` until `end`.
    pub fn place_call_at(&mut self, now: Instant) -> Result<(), CallError> {
        self.require(self.control_state().call, "call")?;
        let Some(media) = self.media.as_ref() else {
            return Err(CallError::InvalidCallState {
                op: "call",
                status: self.status,
            });
        };
        sink_info!(self.logger, "Starting call");

        let mut coordinator = NegotiationCoordinator::new(&self.config.ice, self.logger.clone());
        let outbound = media.first_video_track().or_else(|| media.first_audio_track());
        if let Some(track) = outbound {
            self.attach_outbound(coordinator.peer_mut(PeerId::Local), track);
        }

        let started = coordinator.start_negotiation(&self.config.offer_options);
        let mut session = CallSession::new(coordinator, now);
        self.set_status(CallStatus::Negotiating);
        let result = started.map_err(|e| {
            session.last_error = Some(e.clone());
            CallError::Negotiation(e)
        });
        self.session = Some(session);
        result
    }

    /// Advances the call at the current time.
    pub fn poll(&mut self) -> Vec<CallEvent> {
        self.poll_at(Instant::now())
    }

    /// Runs one coordinator turn at `now` and reacts to what it reports:
    /// inbound tracks are rendered into `remoteVideo`, candidate errors are
    /// traced, and the status turns `connected` once both sides are.
    pub fn poll_at(&mut self, now: Instant) -> Vec<CallEvent> {
        let mut out = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return out;
        };

        for event in session.coordinator.poll(now) {
            match event {
                CoordinatorEvent::Peer(id, PeerEvent::Track(track)) => {
                    let sink_id = id.video_sink_id();
                    sink_info!(self.logger, "{} received remote stream", id);
                    session.remote_tracks.push(track.clone());
                    self.renderer
                        .render(sink_id, std::slice::from_ref(&track));
                    out.push(CallEvent::TrackRendered {
                        sink_id,
                        track_id: track.id().to_owned(),
                    });
                }
                CoordinatorEvent::Peer(id, PeerEvent::ConnectivityChange(state)) => {
                    if state == ConnectivityState::Failed {
                        sink_warn!(self.logger, "{} ICE failed; not retrying", id);
                    }
                    out.push(CallEvent::Connectivity(id, state));
                }
                CoordinatorEvent::Peer(id, PeerEvent::CandidateRejected { error, .. })
                | CoordinatorEvent::CandidateRejected { to: id, error, .. } => {
                    sink_warn!(self.logger, "{} failed to add ICE Candidate: {}", id, error);
                    out.push(CallEvent::CandidateError { to: id, error });
                }
                CoordinatorEvent::NegotiationFailed(err) => {
                    session.last_error = Some(err.clone());
                    out.push(CallEvent::NegotiationFailed(err));
                }
                _ => {}
            }
        }

        if self.status == CallStatus::Negotiating && session.coordinator.both_connected() {
            session.connected_at = Some(now);
            let setup_time = now.saturating_duration_since(session.started_at);
            sink_info!(
                self.logger,
                "Setup time: {:.3}ms",
                setup_time.as_secs_f64() * 1000.0
            );
            self.set_status(CallStatus::Connected);
            out.push(CallEvent::StatusChanged(CallStatus::Connected));
            out.push(CallEvent::Connected { setup_time });
        }
        out
    }

    /// Closes both connections, stops and releases capture, clears both
    /// video sinks.
    ///
    /// # Errors
    /// [`CallError::InvalidCallState`] unless a call is in progress.
    pub fn end_call(&mut self) -> Result<(), CallError> {
        self.require(self.control_state().end, "end")?;
        sink_info!(self.logger, "Ending call");

        if let Some(mut session) = self.session.take() {
            session.coordinator.close();
        }
        if let Some(mut media) = self.media.take() {
            media.stop();
        }
        self.renderer.render(PeerId::Remote.video_sink_id(), &[]);
        self.renderer.render(PeerId::Local.video_sink_id(), &[]);
        self.set_status(CallStatus::Ended);
        Ok(())
    }

    fn require(&self, enabled: bool, op: &'static str) -> Result<(), CallError> {
        if enabled {
            return Ok(());
        }
        sink_warn!(self.logger, "'{}' ignored while {}", op, self.status);
        Err(CallError::InvalidCallState {
            op,
            status: self.status,
        })
    }

    /// A refused track is traced; `createOffer` then reports the missing
    /// outbound track as the negotiation error.
    fn attach_outbound(&self, peer: &mut PeerConnection, track: &MediaTrack) -> bool {
        sink_info!(self.logger, "Using {} device: {}", track.kind(), track.label());
        match peer.add_track(track.clone()) {
            Ok(()) => true,
            Err(e) => {
                sink_warn!(self.logger, "Could not attach {} track {}: {}", track.kind(), track.id(), e);
                false
            }
        }
    }

    fn set_status(&mut self, next: CallStatus) {
        if self.status != next {
            sink_info!(self.logger, "Call status: {} -> {}", self.status, next);
            self.status = next;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use std::time::Duration;

    use super::*;
    use crate::{
        call::render_sink::MemoryRenderSink,
        ice::{IceApplicationError, IceCandidate, ice_settings::IceSettings},
        log::{MemoryLogSink, NoopLogSink, log_level::LogLevel},
        media::{
            TrackKind,
            synthetic_capture::{CaptureActivity, Permission, SyntheticCapture},
        },
        peer::CandidateDisposition,
    };

    struct Harness {
        ctl: CallController,
        render: Arc<MemoryRenderSink>,
        log: Arc<MemoryLogSink>,
        activity: CaptureActivity,
    }

    fn harness(backend: SyntheticCapture) -> Harness {
        let render = Arc::new(MemoryRenderSink::new());
        let log = Arc::new(MemoryLogSink::new());
        let activity = backend.activity();
        let ctl = CallController::new(
            CallConfig::default(),
            Box::new(backend),
            render.clone(),
            log.clone(),
        );
        Harness {
            ctl,
            render,
            log,
            activity,
        }
    }

    fn drive_until_connected(ctl: &mut CallController, t0: Instant) -> Vec<CallEvent> {
        let mut events = Vec::new();
        for i in 0..400 {
            events.extend(ctl.poll_at(t0 + Duration::from_millis(i * 5)));
            if ctl.status() == CallStatus::Connected {
                break;
            }
        }
        events
    }

    #[test]
    fn controls_out_of_order_are_rejected_without_side_effects() {
        let mut h = harness(SyntheticCapture::default());
        assert_eq!(
            h.ctl.place_call(),
            Err(CallError::InvalidCallState {
                op: "call",
                status: CallStatus::Idle
            })
        );
        assert!(matches!(
            h.ctl.end_call(),
            Err(CallError::InvalidCallState { op: "end", .. })
        ));
        assert_eq!(h.ctl.status(), CallStatus::Idle);
        assert!(h.ctl.session().is_none());

        h.ctl.start_media().unwrap();
        assert!(matches!(
            h.ctl.start_media(),
            Err(CallError::InvalidCallState { op: "start", .. })
        ));
        assert_eq!(h.activity.active_devices(), 1);
    }

    #[test]
    fn denied_permission_keeps_call_disabled() {
        let mut h = harness(SyntheticCapture::new(Permission::Denied, Some((1280, 720)), true));
        let err = h.ctl.start_media().unwrap_err();
        match err {
            CallError::Acquisition(e) => assert_eq!(e.reason(), "permission-denied"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(h.ctl.status(), CallStatus::Idle);
        assert!(!h.ctl.control_state().call);
        assert!(h.ctl.control_state().start);
        assert!(h.log.contains(LogLevel::Error, "permission-denied"));
    }

    #[test]
    fn start_previews_local_media() {
        let mut h = harness(SyntheticCapture::default());
        h.ctl.start_media().unwrap();
        assert_eq!(h.ctl.status(), CallStatus::MediaReady);
        assert_eq!(h.render.showing("localVideo").len(), 2);
        assert!(h.ctl.control_state().call);
    }

    #[test]
    fn call_connects_renders_remote_and_end_releases_everything() {
        let mut h = harness(SyntheticCapture::default());
        h.ctl.start_media().unwrap();
        let local_tracks: Vec<_> = h.ctl.media().unwrap().tracks().to_vec();

        let t0 = Instant::now();
        h.ctl.place_call_at(t0).unwrap();
        assert_eq!(h.ctl.status(), CallStatus::Negotiating);
        assert!(h.ctl.control_state().end);

        let events = drive_until_connected(&mut h.ctl, t0);
        assert_eq!(h.ctl.status(), CallStatus::Connected);
        assert!(events
            .iter()
            .any(|e| matches!(e, CallEvent::Connected { .. })));
        assert!(h.ctl.session().unwrap().setup_time().is_some());
        assert!(h.log.contains(LogLevel::Info, "Setup time:"));

        let remote = h.render.showing("remoteVideo");
        assert_eq!(remote.len(), 1);
        let video = h.ctl.media().unwrap().first_video_track().unwrap();
        assert_eq!(remote[0].id(), video.id());
        let inbound = h.ctl.session().unwrap().remote_tracks().to_vec();
        assert_eq!(h.ctl.live_track_count(), 3);

        h.ctl.end_call().unwrap();
        assert_eq!(h.ctl.status(), CallStatus::Ended);
        assert_eq!(h.ctl.live_track_count(), 0);
        assert!(local_tracks.iter().chain(&inbound).all(|t| !t.is_live()));
        assert_eq!(h.activity.active_devices(), 0);
        assert!(h.render.showing("localVideo").is_empty());
        assert!(h.render.showing("remoteVideo").is_empty());
        assert!(h.ctl.control_state().start);
        assert!(h.ctl.poll().is_empty());
    }

    #[test]
    fn end_mid_negotiation_is_safe() {
        let mut h = harness(SyntheticCapture::default());
        h.ctl.start_media().unwrap();
        let t0 = Instant::now();
        h.ctl.place_call_at(t0).unwrap();
        h.ctl.poll_at(t0);
        h.ctl.end_call().unwrap();
        assert_eq!(h.ctl.status(), CallStatus::Ended);
        assert_eq!(h.activity.active_devices(), 0);
        assert!(h.ctl.poll_at(t0 + Duration::from_millis(5)).is_empty());
    }

    #[test]
    fn malformed_candidate_mid_call_is_reported_and_call_still_connects() {
        let mut h = harness(SyntheticCapture::default());
        h.ctl.start_media().unwrap();
        let t0 = Instant::now();
        h.ctl.place_call_at(t0).unwrap();

        let garbage = IceCandidate {
            origin: PeerId::Remote,
            candidate: "candidate:not a candidate".to_owned(),
            sdp_mid: Some("0".to_owned()),
            sdp_mline_index: Some(0),
            username_fragment: None,
        };
        let session = h.ctl.session.as_mut().unwrap();
        assert_eq!(
            session.coordinator.relay_candidate(garbage),
            Ok(CandidateDisposition::Buffered)
        );

        let events = drive_until_connected(&mut h.ctl, t0);
        assert!(events.iter().any(|e| matches!(
            e,
            CallEvent::CandidateError {
                to: PeerId::Local,
                error: IceApplicationError::Malformed(_)
            }
        )));
        assert_eq!(h.ctl.status(), CallStatus::Connected);
        assert!(h.log.contains(LogLevel::Warn, "failed to add ICE Candidate"));
    }

    #[test]
    fn refused_outbound_track_is_traced() {
        let h = harness(SyntheticCapture::default());
        let mut coordinator =
            NegotiationCoordinator::new(&IceSettings::default(), Arc::new(NoopLogSink));
        coordinator.close();
        let track = MediaTrack::new(TrackKind::Video, "cam");
        assert!(!h.ctl.attach_outbound(coordinator.peer_mut(PeerId::Local), &track));
        assert!(h.log.contains(LogLevel::Warn, "Could not attach video track"));
    }

    /// A device that opens fine but yields no track.
    struct SilentBackend;

    struct SilentDevice;

    impl crate::media::capture_backend::CaptureDevice for SilentDevice {
        fn tracks(&self) -> Vec<crate::media::capture_backend::TrackDescriptor> {
            Vec::new()
        }
        fn release(&mut self) {}
    }

    impl CaptureBackend for SilentBackend {
        fn open(
            &mut self,
            _: &crate::media::media_constraints::MediaConstraints,
        ) -> Result<Box<dyn crate::media::capture_backend::CaptureDevice>, crate::media::AcquisitionError>
        {
            Ok(Box::new(SilentDevice))
        }
    }

    #[test]
    fn negotiation_failure_leaves_status_negotiating_until_end() {
        let log = Arc::new(MemoryLogSink::new());
        let mut ctl = CallController::new(
            CallConfig::default(),
            Box::new(SilentBackend),
            Arc::new(MemoryRenderSink::new()),
            log.clone(),
        );
        ctl.start_media().unwrap();
        let CallError::Negotiation(err) = ctl.place_call_at(Instant::now()).unwrap_err() else {
            panic!("expected a negotiation error");
        };
        assert_eq!(err.step, crate::negotiation::NegotiationStep::CreateOffer);
        assert_eq!(err.side, PeerId::Local);
        assert_eq!(ctl.status(), CallStatus::Negotiating);
        assert_eq!(ctl.session().unwrap().last_error(), Some(&err));
        assert!(log.contains(LogLevel::Error, "createOffer failed on local"));
        assert!(ctl.poll().iter().all(|e| !matches!(e, CallEvent::Connected { .. })));
        assert_eq!(ctl.status(), CallStatus::Negotiating);

        ctl.end_call().unwrap();
        assert_eq!(ctl.status(), CallStatus::Ended);
    }
}
