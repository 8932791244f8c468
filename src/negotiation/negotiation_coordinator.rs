use std::sync::{
    Arc,
    mpsc::{self, Receiver},
};
use std::time::Instant;

use super::{
    coordinator_event::CoordinatorEvent, negotiation_error::NegotiationError,
    negotiation_step::NegotiationStep, offer_options::OfferOptions,
};
use crate::{
    ice::{IceApplicationError, IceCandidate, ice_settings::IceSettings},
    log::log_sink::LogSink,
    peer::{CandidateDisposition, PeerConnection, PeerEvent, PeerId, SignalingError},
    sdp::SessionDescription,
    sink_debug, sink_error, sink_info, sink_warn,
};

/// Pipeline progress, carrying the description the next step consumes.
#[derive(Debug)]
enum Stage {
    SetLocalOffer(SessionDescription),
    SetRemoteOffer(SessionDescription),
    CreateAnswer,
    SetLocalAnswer(SessionDescription),
    SetRemoteAnswer(SessionDescription),
}

impl Stage {
    const fn step(&self) -> NegotiationStep {
        match self {
            Stage::SetLocalOffer(_) => NegotiationStep::SetLocalOffer,
            Stage::SetRemoteOffer(_) => NegotiationStep::SetRemoteOffer,
            Stage::CreateAnswer => NegotiationStep::CreateAnswer,
            Stage::SetLocalAnswer(_) => NegotiationStep::SetLocalAnswer,
            Stage::SetRemoteAnswer(_) => NegotiationStep::SetRemoteAnswer,
        }
    }
}

/// Owns both connections and relays between them in-process.
///
/// `start_negotiation` creates the offer right away; every later step
/// runs on a subsequent [`poll`](Self::poll), interleaved with candidate
/// gathering and relay, the way continuations interleave in a browser. The
/// coordinator never waits for ordering: connections buffer early
/// candidates themselves.
pub struct NegotiationCoordinator {
    local: PeerConnection,
    remote: PeerConnection,
    events_rx: Receiver<(PeerId, PeerEvent)>,
    stage: Option<Stage>,
    logger: Arc<dyn LogSink>,
}

impl NegotiationCoordinator {
    #[must_use]
    pub fn new(settings: &IceSettings, logger: Arc<dyn LogSink>) -> Self {
        let (tx, events_rx) = mpsc::channel();
        Self {
            local: PeerConnection::new(PeerId::Local, settings.clone(), tx.clone(), logger.clone()),
            remote: PeerConnection::new(PeerId::Remote, settings.clone(), tx, logger.clone()),
            events_rx,
            stage: None,
            logger,
        }
    }

    #[must_use]
    pub const fn peer(&self, id: PeerId) -> &PeerConnection {
        match id {
            PeerId::Local => &self.local,
            PeerId::Remote => &self.remote,
        }
    }

    pub fn peer_mut(&mut self, id: PeerId) -> &mut PeerConnection {
        match id {
            PeerId::Local => &mut self.local,
            PeerId::Remote => &mut self.remote,
        }
    }

    /// Step the pipeline will run on the next poll, if negotiating.
    #[must_use]
    pub fn pending_step(&self) -> Option<NegotiationStep> {
        self.stage.as_ref().map(Stage::step)
    }

    #[must_use]
    pub fn both_connected(&self) -> bool {
        use crate::ice::ConnectivityState::Connected;
        self.local.connectivity_state() == Connected && self.remote.connectivity_state() == Connected
    }

    /// Creates the offer on the local connection and schedules the rest of
    /// the pipeline.
    ///
    /// # Errors
    /// A `createOffer` failure, as a [`NegotiationError`] on the local side.
    pub fn start_negotiation(&mut self, options: &OfferOptions) -> Result<(), NegotiationError> {
        let step = NegotiationStep::CreateOffer;
        let offer = self.local.create_offer(options).map_err(|cause| {
            let err = NegotiationError::new(step, cause);
            sink_error!(self.logger, "Negotiation failed: {}", err);
            err
        })?;
        sink_info!(self.logger, "{} on {} succeeded", step, step.side());
        self.stage = Some(Stage::SetLocalOffer(offer));
        Ok(())
    }

    /// Hands a candidate to the connection it was not gathered by.
    ///
    /// # Errors
    /// The receiving connection's [`IceApplicationError`]. The call goes on.
    pub fn relay_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<CandidateDisposition, IceApplicationError> {
        let to = candidate.origin.other();
        sink_debug!(self.logger, "Relaying candidate {} -> {}", candidate.origin, to);
        self.peer_mut(to).add_ice_candidate(candidate)
    }

    /// One scheduler turn at `now`: at most one pipeline step, one tick per
    /// connection, then relay and report everything they published.
    pub fn poll(&mut self, now: Instant) -> Vec<CoordinatorEvent> {
        let mut out = Vec::new();
        self.advance_pipeline(&mut out);
        self.local.tick(now);
        self.remote.tick(now);
        self.drain(&mut out, true);
        out
    }

    /// Closes both sides: the local connection first, then the remote one
    /// after observing the loss of its counterpart.
    pub fn close(&mut self) -> Vec<CoordinatorEvent> {
        let mut out = Vec::new();
        if let Some(stage) = self.stage.take() {
            sink_info!(self.logger, "Negotiation abandoned before {}", stage.step());
            out.push(CoordinatorEvent::PipelineAbandoned(stage.step()));
        }
        self.local.close();
        self.remote.mark_disconnected();
        self.remote.close();
        self.drain(&mut out, false);
        out
    }

    fn advance_pipeline(&mut self, out: &mut Vec<CoordinatorEvent>) {
        let Some(stage) = self.stage.take() else {
            return;
        };
        let step = stage.step();
        if self.local.is_closed() || self.remote.is_closed() {
            sink_debug!(self.logger, "Connection closed; dropping {}", step);
            out.push(CoordinatorEvent::PipelineAbandoned(step));
            return;
        }

        let result: Result<Option<Stage>, SignalingError> = match stage {
            Stage::SetLocalOffer(offer) => self
                .local
                .set_local_description(&offer)
                .map(|()| Some(Stage::SetRemoteOffer(offer))),
            Stage::SetRemoteOffer(offer) => self
                .remote
                .set_remote_description(&offer)
                .map(|()| Some(Stage::CreateAnswer)),
            Stage::CreateAnswer => self
                .remote
                .create_answer()
                .map(|answer| Some(Stage::SetLocalAnswer(answer))),
            Stage::SetLocalAnswer(answer) => self
                .remote
                .set_local_description(&answer)
                .map(|()| Some(Stage::SetRemoteAnswer(answer))),
            Stage::SetRemoteAnswer(answer) => {
                self.local.set_remote_description(&answer).map(|()| None)
            }
        };

        match result {
            Ok(next) => {
                sink_info!(self.logger, "{} on {} succeeded", step, step.side());
                out.push(CoordinatorEvent::StepCompleted(step));
                if next.is_none() {
                    sink_info!(self.logger, "Offer/answer exchange complete");
                    out.push(CoordinatorEvent::NegotiationComplete);
                }
                self.stage = next;
            }
            Err(cause) => {
                let err = NegotiationError::new(step, cause);
                sink_error!(self.logger, "Negotiation failed: {}", err);
                out.push(CoordinatorEvent::NegotiationFailed(err));
            }
        }
    }

    fn drain(&mut self, out: &mut Vec<CoordinatorEvent>, relay: bool) {
        while let Ok((from, event)) = self.events_rx.try_recv() {
            if relay {
                match &event {
                    PeerEvent::IceCandidate(candidate) => {
                        if let Err(error) = self.relay_candidate(candidate.clone()) {
                            let to = from.other();
                            sink_warn!(self.logger, "Candidate from {} rejected by {}: {}", from, to, error);
                            out.push(CoordinatorEvent::CandidateRejected {
                                to,
                                candidate: candidate.clone(),
                                error,
                            });
                        }
                    }
                    PeerEvent::EndOfCandidates => {
                        self.peer_mut(from.other()).add_end_of_candidates();
                    }
                    _ => {}
                }
            }
            out.push(CoordinatorEvent::Peer(from, event));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use std::time::Duration;

    use super::*;
    use crate::{
        ice::ConnectivityState,
        log::{MemoryLogSink, log_level::LogLevel},
        media::{MediaTrack, TrackKind},
        peer::SignalingState,
    };

    fn coordinator() -> (NegotiationCoordinator, Arc<MemoryLogSink>) {
        let sink = Arc::new(MemoryLogSink::new());
        let settings = IceSettings {
            host_candidates: 2,
            check_delay: Duration::from_millis(20),
            check_timeout: Duration::from_millis(1000),
        };
        (NegotiationCoordinator::new(&settings, sink.clone()), sink)
    }

    fn with_camera(c: &mut NegotiationCoordinator) -> MediaTrack {
        let cam = MediaTrack::new(TrackKind::Video, "cam");
        c.peer_mut(PeerId::Local).add_track(cam.clone()).unwrap();
        cam
    }

    fn poll_for(c: &mut NegotiationCoordinator, t0: Instant, ms: u64) -> Vec<CoordinatorEvent> {
        let mut all = Vec::new();
        for i in 0..=ms / 5 {
            all.extend(c.poll(t0 + Duration::from_millis(i * 5)));
        }
        all
    }

    #[test]
    fn runs_one_step_per_poll_and_ends_stable() {
        let (mut c, _) = coordinator();
        with_camera(&mut c);
        c.start_negotiation(&OfferOptions::default()).unwrap();
        assert_eq!(c.pending_step(), Some(NegotiationStep::SetLocalOffer));

        let t0 = Instant::now();
        let mut completed = Vec::new();
        for i in 0..5 {
            for ev in c.poll(t0 + Duration::from_millis(i)) {
                if let CoordinatorEvent::StepCompleted(step) = ev {
                    completed.push(step);
                }
            }
        }
        assert_eq!(
            completed,
            vec![
                NegotiationStep::SetLocalOffer,
                NegotiationStep::SetRemoteOffer,
                NegotiationStep::CreateAnswer,
                NegotiationStep::SetLocalAnswer,
                NegotiationStep::SetRemoteAnswer,
            ]
        );
        assert_eq!(c.pending_step(), None);
        assert_eq!(c.peer(PeerId::Local).signaling_state(), SignalingState::Stable);
        assert_eq!(c.peer(PeerId::Remote).signaling_state(), SignalingState::Stable);
    }

    #[test]
    fn early_candidates_are_buffered_by_the_answerer() {
        let (mut c, _) = coordinator();
        with_camera(&mut c);
        c.start_negotiation(&OfferOptions::default()).unwrap();
        let t0 = Instant::now();
        // setLocal(offer) + first gathered candidate relayed before the remote
        // side has any description.
        c.poll(t0);
        assert_eq!(c.peer(PeerId::Remote).buffered_candidate_count(), 1);
        assert_eq!(c.peer(PeerId::Remote).signaling_state(), SignalingState::New);

        poll_for(&mut c, t0, 100);
        assert_eq!(c.peer(PeerId::Remote).buffered_candidate_count(), 0);
        assert_eq!(c.peer(PeerId::Remote).applied_remote_candidates().len(), 2);
        assert!(c.both_connected());
    }

    #[test]
    fn create_offer_failure_names_step_and_side() {
        let (mut c, sink) = coordinator();
        let err = c.start_negotiation(&OfferOptions::default()).unwrap_err();
        assert_eq!(err.step, NegotiationStep::CreateOffer);
        assert_eq!(err.side, PeerId::Local);
        assert_eq!(err.cause, SignalingError::NoOutboundTrack);
        assert!(c.pending_step().is_none());
        assert!(sink.contains(LogLevel::Error, "createOffer failed on local"));
    }

    #[test]
    fn later_failure_short_circuits_the_pipeline() {
        let (mut c, _) = coordinator();
        with_camera(&mut c);
        c.start_negotiation(&OfferOptions::default()).unwrap();
        // The answerer already has an unrelated local offer in flight.
        let own = MediaTrack::new(TrackKind::Audio, "mic");
        c.peer_mut(PeerId::Remote).add_track(own).unwrap();
        let offer = c
            .peer_mut(PeerId::Remote)
            .create_offer(&OfferOptions::default())
            .unwrap();
        c.peer_mut(PeerId::Remote).set_local_description(&offer).unwrap();

        let events = poll_for(&mut c, Instant::now(), 50);
        let failures: Vec<&NegotiationError> = events
            .iter()
            .filter_map(|e| match e {
                CoordinatorEvent::NegotiationFailed(err) => Some(err),
                _ => None,
            })
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].step, NegotiationStep::SetRemoteOffer);
        assert_eq!(failures[0].side, PeerId::Remote);
        assert!(!events.iter().any(|e| matches!(e, CoordinatorEvent::NegotiationComplete)));
        assert!(c.pending_step().is_none());
    }

    #[test]
    fn malformed_candidate_is_reported_and_call_still_connects() {
        let (mut c, _) = coordinator();
        with_camera(&mut c);
        c.start_negotiation(&OfferOptions::default()).unwrap();
        let t0 = Instant::now();
        poll_for(&mut c, t0, 20);

        let garbage = IceCandidate {
            origin: PeerId::Local,
            candidate: "candidate:0 1 udp nope 127.0.0.1 1 typ host".into(),
            sdp_mid: Some("0".into()),
            sdp_mline_index: Some(0),
            username_fragment: None,
        };
        assert!(matches!(
            c.relay_candidate(garbage),
            Err(IceApplicationError::Malformed(_))
        ));
        poll_for(&mut c, t0 + Duration::from_millis(25), 100);
        assert!(c.both_connected());
    }

    #[test]
    fn close_mid_negotiation_abandons_the_pipeline() {
        let (mut c, _) = coordinator();
        let cam = with_camera(&mut c);
        c.start_negotiation(&OfferOptions::default()).unwrap();
        c.poll(Instant::now());

        let events = c.close();
        assert!(events
            .iter()
            .any(|e| matches!(e, CoordinatorEvent::PipelineAbandoned(NegotiationStep::SetRemoteOffer))));
        assert!(c.peer(PeerId::Local).is_closed());
        assert!(c.peer(PeerId::Remote).is_closed());
        assert_eq!(
            c.peer(PeerId::Remote).connectivity_state(),
            ConnectivityState::Closed
        );
        assert!(cam.is_live());

        // Late polls are harmless.
        assert!(c
            .poll(Instant::now())
            .iter()
            .all(|e| !matches!(e, CoordinatorEvent::StepCompleted(_))));
        assert!(c.close().is_empty());
    }
}
