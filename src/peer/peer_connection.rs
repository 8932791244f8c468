//! The per-side connection state machine.
//!
//! A [`PeerConnection`] is driven from a single thread. Offer/answer calls
//! return their result directly; everything that happens "later" in a real
//! stack (candidate gathering, connectivity checks, inbound tracks) advances
//! on [`PeerConnection::tick`] and is published as a [`PeerEvent`] on the
//! shared event channel.

use std::collections::HashSet;
use std::sync::{Arc, mpsc::Sender};
use std::time::Instant;

use super::{
    peer_event::PeerEvent, peer_id::PeerId, signaling_error::SignalingError,
    signaling_state::SignalingState,
};
use crate::{
    ice::{
        ConnectivityState, GatheringState, IceApplicationError, IceCandidate,
        candidate_info::CandidateInfo,
        candidate_pair::CandidatePair,
        connectivity_checker::ConnectivityChecker,
        ice_credentials::IceCredentials,
        ice_gatherer::{GatherEvent, IceGatherer},
        ice_settings::IceSettings,
    },
    log::log_sink::LogSink,
    media::{MediaTrack, TrackKind},
    negotiation::offer_options::OfferOptions,
    sdp::{
        SdpError, SdpType, SessionDescription,
        fingerprint::Fingerprint,
        media_direction::MediaDirection,
        media_section::{MediaSection, Msid},
        sdp_builder::SdpBuilder,
        sdp_summary::SdpSummary,
    },
    sink_debug, sink_info, sink_warn, utils,
};

/// What `add_ice_candidate` did with a remote candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateDisposition {
    /// Validated and handed to the connectivity checks.
    Applied,
    /// Held until both descriptions are applied.
    Buffered,
    /// The connection is closed; the candidate was ignored.
    Dropped,
}

pub struct PeerConnection {
    id: PeerId,
    state: SignalingState,
    logger: Arc<dyn LogSink>,
    events: Sender<(PeerId, PeerEvent)>,
    settings: IceSettings,

    credentials: IceCredentials,
    fingerprint: Fingerprint,
    session_id: u64,
    stream_id: String,

    outbound: Vec<MediaTrack>,
    inbound: Vec<MediaTrack>,
    /// Remote tracks announced by the remote description, surfaced once
    /// connectivity is established.
    announced_inbound: Vec<MediaTrack>,

    pending_local: Option<SessionDescription>,
    local_description: Option<SessionDescription>,
    local_sections: Vec<MediaSection>,
    remote_description: Option<SessionDescription>,
    remote_summary: Option<SdpSummary>,

    buffered: Vec<IceCandidate>,
    applied_remote: HashSet<String>,
    remote_end_of_candidates: bool,

    gatherer: IceGatherer,
    checker: ConnectivityChecker,
}

impl PeerConnection {
    #[must_use]
    pub fn new(
        id: PeerId,
        settings: IceSettings,
        events: Sender<(PeerId, PeerEvent)>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        let checker = ConnectivityChecker::new(false, &settings);
        Self {
            id,
            state: SignalingState::New,
            logger,
            events,
            settings,
            credentials: IceCredentials::generate(),
            fingerprint: Fingerprint::generate(),
            session_id: utils::random_session_id(),
            stream_id: utils::random_token(12),
            outbound: Vec::new(),
            inbound: Vec::new(),
            announced_inbound: Vec::new(),
            pending_local: None,
            local_description: None,
            local_sections: Vec::new(),
            remote_description: None,
            remote_summary: None,
            buffered: Vec::new(),
            applied_remote: HashSet::new(),
            remote_end_of_candidates: false,
            gatherer: IceGatherer::new(),
            checker,
        }
    }

    // ---------------------------------------------------------------------
    // Tracks
    // ---------------------------------------------------------------------

    /// Attaches a shared track for sending. The connection never stops it.
    ///
    /// # Errors
    /// Only valid before any description exists.
    pub fn add_track(&mut self, track: MediaTrack) -> Result<(), SignalingError> {
        if self.state == SignalingState::Closed {
            return Err(SignalingError::Closed);
        }
        if self.state != SignalingState::New || self.pending_local.is_some() {
            return Err(SignalingError::InvalidState {
                op: "addTrack",
                state: self.state,
            });
        }
        if self.outbound.iter().any(|t| t.same_track(&track)) {
            return Ok(());
        }
        sink_debug!(self.logger, "[{}] Attached {} track {}", self.id, track.kind(), track.id());
        self.outbound.push(track);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Offer / answer
    // ---------------------------------------------------------------------

    /// Builds an offer with one `sendrecv` section per outbound track, plus a
    /// `recvonly` section for each kind `options` asks to receive but no
    /// track sends.
    ///
    /// # Errors
    /// [`SignalingError::NoOutboundTrack`], [`SignalingError::OfferInFlight`]
    /// or [`SignalingError::InvalidState`] outside `new`.
    pub fn create_offer(
        &mut self,
        options: &OfferOptions,
    ) -> Result<SessionDescription, SignalingError> {
        match self.state {
            SignalingState::Closed => return Err(SignalingError::Closed),
            SignalingState::New if self.pending_local.is_some() => {
                return Err(SignalingError::OfferInFlight);
            }
            SignalingState::New => {}
            SignalingState::HaveLocalOffer => return Err(SignalingError::OfferInFlight),
            state => {
                return Err(SignalingError::InvalidState {
                    op: "createOffer",
                    state,
                });
            }
        }
        if self.outbound.is_empty() {
            return Err(SignalingError::NoOutboundTrack);
        }

        let sections: Vec<MediaSection> = self
            .outbound
            .iter()
            .map(|t| (t.kind(), MediaDirection::SendRecv, Some(self.msid_for(t))))
            .chain(
                [TrackKind::Audio, TrackKind::Video]
                    .into_iter()
                    .filter(|k| options.wants(*k) && !self.outbound.iter().any(|t| t.kind() == *k))
                    .map(|k| (k, MediaDirection::RecvOnly, None)),
            )
            .enumerate()
            .map(|(i, (kind, direction, msid))| MediaSection {
                mid: i.to_string(),
                kind,
                direction,
                msid,
            })
            .collect();

        let desc = SessionDescription::new(SdpType::Offer, self.build_sdp(&sections, "actpass"));
        sink_info!(
            self.logger,
            "[{}] Created offer with {} media section(s)",
            self.id,
            sections.len()
        );
        self.local_sections = sections;
        self.checker.set_controlling(true);
        self.pending_local = Some(desc.clone());
        Ok(desc)
    }

    /// Answers the applied remote offer section by section.
    ///
    /// # Errors
    /// [`SignalingError::NoRemoteOffer`] in `new`, otherwise
    /// [`SignalingError::InvalidState`] outside `have-remote-offer`.
    pub fn create_answer(&mut self) -> Result<SessionDescription, SignalingError> {
        match self.state {
            SignalingState::Closed => return Err(SignalingError::Closed),
            SignalingState::New => return Err(SignalingError::NoRemoteOffer),
            SignalingState::HaveRemoteOffer => {}
            state => {
                return Err(SignalingError::InvalidState {
                    op: "createAnswer",
                    state,
                });
            }
        }
        let offered = self
            .remote_summary
            .as_ref()
            .map(|s| s.sections.clone())
            .ok_or(SignalingError::NoRemoteOffer)?;

        let mut used: Vec<&MediaTrack> = Vec::new();
        let mut sections = Vec::with_capacity(offered.len());
        for offer in &offered {
            let track = self
                .outbound
                .iter()
                .find(|t| t.kind() == offer.kind && !used.iter().any(|u| u.same_track(t)));
            let direction = offer.direction.answer(track.is_some());
            let msid = match track {
                Some(t) if direction.sends() => {
                    used.push(t);
                    Some(self.msid_for(t))
                }
                _ => None,
            };
            sections.push(MediaSection {
                mid: offer.mid.clone(),
                kind: offer.kind,
                direction,
                msid,
            });
        }

        let desc = SessionDescription::new(SdpType::Answer, self.build_sdp(&sections, "active"));
        sink_info!(
            self.logger,
            "[{}] Created answer with {} media section(s)",
            self.id,
            sections.len()
        );
        self.local_sections = sections;
        self.checker.set_controlling(false);
        self.pending_local = Some(desc.clone());
        Ok(desc)
    }

    /// Applies a description this connection created.
    ///
    /// Applying the same description again is a no-op. A closed connection
    /// ignores the call.
    ///
    /// # Errors
    /// [`SignalingError::ForeignDescription`],
    /// [`SignalingError::DescriptionTypeMismatch`] or
    /// [`SignalingError::InvalidState`].
    pub fn set_local_description(&mut self, desc: &SessionDescription) -> Result<(), SignalingError> {
        if self.state == SignalingState::Closed {
            sink_debug!(self.logger, "[{}] Closed; ignoring setLocalDescription", self.id);
            return Ok(());
        }
        if let Some(applied) = &self.local_description {
            if applied == desc {
                return Ok(());
            }
            if applied.sdp_type() != desc.sdp_type() {
                return Err(SignalingError::DescriptionTypeMismatch {
                    applied: applied.sdp_type(),
                    given: desc.sdp_type(),
                });
            }
        }
        if self.pending_local.as_ref() != Some(desc) {
            return Err(SignalingError::ForeignDescription);
        }

        match (desc.sdp_type(), self.state) {
            (SdpType::Offer, SignalingState::New) => {
                self.set_state(SignalingState::HaveLocalOffer);
            }
            (SdpType::Answer, SignalingState::HaveRemoteOffer) => {
                self.set_state(SignalingState::HaveLocalAnswer);
                self.set_state(SignalingState::Stable);
            }
            (_, state) => {
                return Err(SignalingError::InvalidState {
                    op: "setLocalDescription",
                    state,
                });
            }
        }

        self.pending_local = None;
        self.local_description = Some(desc.clone());
        sink_info!(self.logger, "[{}] Local {} applied", self.id, desc.sdp_type());
        self.emit(PeerEvent::LocalDescriptionApplied(desc.sdp_type()));

        if self.gatherer.start(self.settings.host_candidates) {
            self.emit(PeerEvent::IceGatheringStateChange(GatheringState::Gathering));
        }
        self.flush_buffered();
        Ok(())
    }

    /// Applies the counterpart's description.
    ///
    /// Applying the same description again is a no-op. A closed connection
    /// ignores the call.
    ///
    /// # Errors
    /// [`SignalingError::InvalidDescription`] for unreadable payloads or an
    /// answer whose sections do not match the offer,
    /// [`SignalingError::DescriptionTypeMismatch`] or
    /// [`SignalingError::InvalidState`].
    pub fn set_remote_description(&mut self, desc: &SessionDescription) -> Result<(), SignalingError> {
        if self.state == SignalingState::Closed {
            sink_debug!(self.logger, "[{}] Closed; ignoring setRemoteDescription", self.id);
            return Ok(());
        }
        if let Some(applied) = &self.remote_description {
            if applied == desc {
                return Ok(());
            }
            if applied.sdp_type() != desc.sdp_type() {
                return Err(SignalingError::DescriptionTypeMismatch {
                    applied: applied.sdp_type(),
                    given: desc.sdp_type(),
                });
            }
            return Err(SignalingError::InvalidState {
                op: "setRemoteDescription",
                state: self.state,
            });
        }

        let valid_from = match desc.sdp_type() {
            SdpType::Offer => SignalingState::New,
            SdpType::Answer => SignalingState::HaveLocalOffer,
        };
        if self.state != valid_from {
            return Err(SignalingError::InvalidState {
                op: "setRemoteDescription",
                state: self.state,
            });
        }

        let summary = SdpSummary::parse(desc.sdp())?;
        if desc.sdp_type() == SdpType::Answer {
            let matches = summary.sections.len() == self.local_sections.len()
                && summary
                    .sections
                    .iter()
                    .zip(&self.local_sections)
                    .all(|(a, o)| a.mid == o.mid && a.kind == o.kind);
            if !matches {
                return Err(SignalingError::InvalidDescription(SdpError::Invalid(
                    "answer sections do not match the offer",
                )));
            }
            self.set_state(SignalingState::HaveRemoteAnswer);
            self.set_state(SignalingState::Stable);
        } else {
            self.set_state(SignalingState::HaveRemoteOffer);
        }

        self.announce_inbound(&summary);
        self.remote_summary = Some(summary);
        self.remote_description = Some(desc.clone());
        sink_info!(self.logger, "[{}] Remote {} applied", self.id, desc.sdp_type());
        self.emit(PeerEvent::RemoteDescriptionApplied(desc.sdp_type()));
        self.flush_buffered();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Trickle ICE
    // ---------------------------------------------------------------------

    /// Takes a candidate relayed from the other connection.
    ///
    /// It is validated and applied if both descriptions are in place;
    /// otherwise it is buffered and applied, in arrival order, as soon as
    /// they are. The signaling state never changes.
    ///
    /// # Errors
    /// [`IceApplicationError`] for a candidate that cannot be applied now.
    /// Failures of buffered candidates surface later as
    /// [`PeerEvent::CandidateRejected`].
    pub fn add_ice_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<CandidateDisposition, IceApplicationError> {
        if self.state == SignalingState::Closed {
            return Ok(CandidateDisposition::Dropped);
        }
        if candidate.origin == self.id {
            return Err(IceApplicationError::WrongOrigin(self.id));
        }
        if !self.has_both_descriptions() {
            sink_debug!(
                self.logger,
                "[{}] Buffering remote candidate ({} waiting)",
                self.id,
                self.buffered.len() + 1
            );
            self.buffered.push(candidate);
            return Ok(CandidateDisposition::Buffered);
        }
        self.apply_candidate(&candidate)?;
        Ok(CandidateDisposition::Applied)
    }

    /// The other side finished gathering.
    pub fn add_end_of_candidates(&mut self) {
        if self.state == SignalingState::Closed || self.remote_end_of_candidates {
            return;
        }
        self.remote_end_of_candidates = true;
        sink_debug!(self.logger, "[{}] Remote end-of-candidates", self.id);
    }

    fn apply_candidate(&mut self, candidate: &IceCandidate) -> Result<(), IceApplicationError> {
        let info = candidate.parse()?;
        let Some(summary) = self.remote_summary.as_ref() else {
            return Err(IceApplicationError::UnknownMid {
                mid: candidate.sdp_mid.clone(),
                mline_index: candidate.sdp_mline_index,
            });
        };

        let section = match (&candidate.sdp_mid, candidate.sdp_mline_index) {
            (Some(mid), _) => summary.section_by_mid(mid),
            (None, Some(index)) => summary.section_at(index),
            (None, None) => None,
        };
        if section.is_none() {
            return Err(IceApplicationError::UnknownMid {
                mid: candidate.sdp_mid.clone(),
                mline_index: candidate.sdp_mline_index,
            });
        }
        if let Some(ufrag) = &candidate.username_fragment {
            if *ufrag != summary.ice_ufrag {
                return Err(IceApplicationError::UfragMismatch {
                    expected: summary.ice_ufrag.clone(),
                    got: ufrag.clone(),
                });
            }
        }

        if self.applied_remote.insert(candidate.candidate.clone()) {
            sink_debug!(self.logger, "[{}] Applied remote {}", self.id, info);
            self.checker.add_remote(info);
        }
        Ok(())
    }

    fn flush_buffered(&mut self) {
        if !self.has_both_descriptions() || self.buffered.is_empty() {
            return;
        }
        let queued = std::mem::take(&mut self.buffered);
        sink_debug!(self.logger, "[{}] Flushing {} buffered candidate(s)", self.id, queued.len());
        for candidate in queued {
            if let Err(error) = self.apply_candidate(&candidate) {
                sink_warn!(self.logger, "[{}] Dropping buffered candidate: {}", self.id, error);
                self.emit(PeerEvent::CandidateRejected { candidate, error });
            }
        }
    }

    // ---------------------------------------------------------------------
    // Scheduler step
    // ---------------------------------------------------------------------

    /// Advances gathering by one candidate and the connectivity checks to
    /// `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.state == SignalingState::Closed {
            return;
        }

        match self.gatherer.next_event() {
            Some(GatherEvent::Candidate(info)) => {
                self.checker.add_local(info.clone());
                let mid = self.local_sections.first().map_or("0", |s| s.mid.as_str());
                let candidate = IceCandidate::new(self.id, &info, mid, 0, &self.credentials.ufrag);
                sink_debug!(self.logger, "[{}] Gathered {}", self.id, info);
                self.emit(PeerEvent::IceCandidate(candidate));
            }
            Some(GatherEvent::Complete) => {
                sink_debug!(self.logger, "[{}] Gathering complete", self.id);
                self.emit(PeerEvent::EndOfCandidates);
                self.emit(PeerEvent::IceGatheringStateChange(GatheringState::Complete));
            }
            None => {}
        }

        if self.has_both_descriptions() {
            if let Some(state) = self.checker.start_checks(now) {
                self.connectivity_changed(state);
            }
        }
        if let Some(state) = self.checker.poll(now) {
            self.connectivity_changed(state);
        }
    }

    fn connectivity_changed(&mut self, state: ConnectivityState) {
        match state {
            ConnectivityState::Connected => {
                if let Some(pair) = self.checker.nominated() {
                    sink_info!(
                        self.logger,
                        "[{}] Nominated pair {} <-> {}",
                        self.id,
                        pair.local.address,
                        pair.remote.address
                    );
                }
            }
            ConnectivityState::Failed => {
                sink_warn!(self.logger, "[{}] Connectivity checks failed", self.id);
            }
            _ => {}
        }
        sink_info!(self.logger, "[{}] ICE connection state: {}", self.id, state);
        self.emit(PeerEvent::ConnectivityChange(state));
        if state == ConnectivityState::Connected {
            self.surface_inbound();
        }
    }

    fn announce_inbound(&mut self, summary: &SdpSummary) {
        for (section, msid) in summary.sending_sections() {
            let known = self
                .announced_inbound
                .iter()
                .chain(&self.inbound)
                .any(|t| t.id() == msid.track_id);
            if known {
                continue;
            }
            let label = format!("{} {} from {}", section.kind, msid.stream_id, self.id.other());
            self.announced_inbound
                .push(MediaTrack::with_id(msid.track_id.clone(), section.kind, label));
        }
    }

    fn surface_inbound(&mut self) {
        for track in std::mem::take(&mut self.announced_inbound) {
            if self.inbound.iter().any(|t| t.id() == track.id()) {
                continue;
            }
            sink_info!(self.logger, "[{}] Remote {} track {} attached", self.id, track.kind(), track.id());
            self.inbound.push(track.clone());
            self.emit(PeerEvent::Track(track));
        }
    }

    // ---------------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------------

    /// Terminal close. Outbound tracks are detached but left running (the
    /// media source owns them); inbound tracks end. Returns `false` if the
    /// connection was already closed.
    pub fn close(&mut self) -> bool {
        if self.state == SignalingState::Closed {
            return false;
        }
        self.gatherer.stop();
        self.buffered.clear();
        self.pending_local = None;
        self.outbound.clear();
        for track in self.inbound.drain(..) {
            track.stop();
        }
        self.announced_inbound.clear();

        if let Some(state) = self.checker.close() {
            sink_info!(self.logger, "[{}] ICE connection state: {}", self.id, state);
            self.emit(PeerEvent::ConnectivityChange(state));
        }
        self.set_state(SignalingState::Closed);
        true
    }

    /// Reports the other side as gone (`disconnected`), if still reachable.
    pub fn mark_disconnected(&mut self) {
        if self.state == SignalingState::Closed {
            return;
        }
        if let Some(state) = self.checker.disconnect() {
            sink_info!(self.logger, "[{}] ICE connection state: {}", self.id, state);
            self.emit(PeerEvent::ConnectivityChange(state));
        }
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn has_both_descriptions(&self) -> bool {
        self.local_description.is_some() && self.remote_summary.is_some()
    }

    fn msid_for(&self, track: &MediaTrack) -> Msid {
        Msid {
            stream_id: self.stream_id.clone(),
            track_id: track.id().to_owned(),
        }
    }

    fn build_sdp(&self, sections: &[MediaSection], setup: &'static str) -> String {
        sections
            .iter()
            .cloned()
            .fold(
                SdpBuilder::new(
                    self.session_id,
                    &self.credentials.ufrag,
                    &self.credentials.pwd,
                    &self.fingerprint,
                    setup,
                ),
                SdpBuilder::section,
            )
            .build()
    }

    fn set_state(&mut self, next: SignalingState) {
        if self.state == next {
            return;
        }
        sink_info!(self.logger, "[{}] Signaling state: {} -> {}", self.id, self.state, next);
        self.state = next;
        self.emit(PeerEvent::SignalingStateChange(next));
    }

    fn emit(&self, event: PeerEvent) {
        // The receiver only disappears while the coordinator is dropped.
        let _ = self.events.send((self.id, event));
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[must_use]
    pub const fn id(&self) -> PeerId {
        self.id
    }

    #[must_use]
    pub const fn signaling_state(&self) -> SignalingState {
        self.state
    }

    #[must_use]
    pub const fn connectivity_state(&self) -> ConnectivityState {
        self.checker.state()
    }

    #[must_use]
    pub const fn gathering_state(&self) -> GatheringState {
        self.gatherer.state()
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, SignalingState::Closed)
    }

    #[must_use]
    pub const fn local_description(&self) -> Option<&SessionDescription> {
        self.local_description.as_ref()
    }

    #[must_use]
    pub const fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote_description.as_ref()
    }

    #[must_use]
    pub fn local_ufrag(&self) -> &str {
        &self.credentials.ufrag
    }

    #[must_use]
    pub fn outbound_tracks(&self) -> &[MediaTrack] {
        &self.outbound
    }

    #[must_use]
    pub fn inbound_tracks(&self) -> &[MediaTrack] {
        &self.inbound
    }

    #[must_use]
    pub fn buffered_candidate_count(&self) -> usize {
        self.buffered.len()
    }

    #[must_use]
    pub fn applied_remote_candidates(&self) -> &[CandidateInfo] {
        self.checker.remote_candidates()
    }

    #[must_use]
    pub const fn remote_end_of_candidates(&self) -> bool {
        self.remote_end_of_candidates
    }

    #[must_use]
    pub const fn nominated_pair(&self) -> Option<&CandidatePair> {
        self.checker.nominated()
    }
}
