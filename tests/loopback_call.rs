#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use looprtc::{
    call::{CallController, CallError, CallStatus, MemoryRenderSink},
    config::CallConfig,
    ice::{
        ConnectivityState, IceApplicationError, IceCandidate, candidate_info::CandidateInfo,
        ice_settings::IceSettings,
    },
    log::{MemoryLogSink, NoopLogSink, log_level::LogLevel, log_sink::LogSink},
    media::{
        MediaTrack, TrackKind,
        synthetic_capture::{Permission, SyntheticCapture},
    },
    negotiation::{NegotiationCoordinator, NegotiationError, NegotiationStep, OfferOptions},
    peer::{
        CandidateDisposition, PeerConnection, PeerEvent, PeerId, SignalingError, SignalingState,
    },
};

fn settings() -> IceSettings {
    IceSettings {
        host_candidates: 2,
        check_delay: Duration::from_millis(20),
        check_timeout: Duration::from_millis(1000),
    }
}

fn pair() -> (PeerConnection, PeerConnection, mpsc::Receiver<(PeerId, PeerEvent)>) {
    let (tx, rx) = mpsc::channel();
    let log: Arc<dyn LogSink> = Arc::new(NoopLogSink);
    let local = PeerConnection::new(PeerId::Local, settings(), tx.clone(), log.clone());
    let remote = PeerConnection::new(PeerId::Remote, settings(), tx, log);
    (local, remote, rx)
}

fn host_candidate(origin: PeerId, port: u16, ufrag: &str) -> IceCandidate {
    let info = CandidateInfo::host(([127, 0, 0, 1], port).into(), 1, 65535);
    IceCandidate::new(origin, &info, "0", 0, ufrag)
}

#[test]
fn denied_permission_never_enables_call() {
    let backend = SyntheticCapture::new(Permission::Denied, Some((1280, 720)), true);
    let log = Arc::new(MemoryLogSink::new());
    let mut ctl = CallController::new(
        CallConfig::default(),
        Box::new(backend),
        Arc::new(MemoryRenderSink::new()),
        log.clone(),
    );

    assert!(matches!(ctl.start_media(), Err(CallError::Acquisition(_))));
    assert_eq!(ctl.status(), CallStatus::Idle);
    assert!(!ctl.control_state().call);
    assert!(log.contains(LogLevel::Error, "permission-denied"));
}

#[test]
fn full_call_connects_and_end_releases_every_track() {
    let backend = SyntheticCapture::default();
    let activity = backend.activity();
    let render = Arc::new(MemoryRenderSink::new());
    let mut ctl = CallController::new(
        CallConfig::default(),
        Box::new(backend),
        render.clone(),
        Arc::new(NoopLogSink),
    );

    ctl.start_media().unwrap();
    let t0 = Instant::now();
    ctl.place_call_at(t0).unwrap();
    for i in 0..400 {
        ctl.poll_at(t0 + Duration::from_millis(i * 5));
        if ctl.status() == CallStatus::Connected {
            break;
        }
    }
    assert_eq!(ctl.status(), CallStatus::Connected);
    assert_eq!(render.showing("remoteVideo").len(), 1);
    assert!(ctl.live_track_count() > 0);

    ctl.end_call().unwrap();
    assert_eq!(ctl.status(), CallStatus::Ended);
    assert_eq!(ctl.live_track_count(), 0);
    assert_eq!(activity.active_devices(), 0);
    assert!(render.showing("localVideo").is_empty());
    assert!(render.showing("remoteVideo").is_empty());
}

#[test]
fn malformed_candidate_is_reported_and_call_still_connects() {
    let log = Arc::new(MemoryLogSink::new());
    let mut c = NegotiationCoordinator::new(&settings(), log.clone());
    c.peer_mut(PeerId::Local)
        .add_track(MediaTrack::new(TrackKind::Video, "cam"))
        .unwrap();
    c.start_negotiation(&OfferOptions::default()).unwrap();

    let t0 = Instant::now();
    let mut step = 0;
    while c.pending_step().is_some() && step < 20 {
        c.poll(t0);
        step += 1;
    }
    assert!(c.pending_step().is_none());

    let mut garbage = host_candidate(PeerId::Remote, 9, "x");
    garbage.candidate = "candidate:not a candidate".to_owned();
    assert!(matches!(
        c.relay_candidate(garbage),
        Err(IceApplicationError::Malformed(_))
    ));

    for i in 0..200 {
        c.poll(t0 + Duration::from_millis(i * 5));
        if c.both_connected() {
            break;
        }
    }
    assert!(c.both_connected());
    assert_eq!(
        c.peer(PeerId::Remote).connectivity_state(),
        ConnectivityState::Connected
    );
}

#[test]
fn offer_answer_round_trip_reaches_stable() {
    let (mut local, mut remote, _rx) = pair();
    local
        .add_track(MediaTrack::new(TrackKind::Video, "cam"))
        .unwrap();

    let offer = local.create_offer(&OfferOptions::default()).unwrap();
    local.set_local_description(&offer).unwrap();
    assert_eq!(local.signaling_state(), SignalingState::HaveLocalOffer);
    // Re-applying the same offer changes nothing.
    local.set_local_description(&offer).unwrap();

    remote.set_remote_description(&offer).unwrap();
    assert_eq!(remote.signaling_state(), SignalingState::HaveRemoteOffer);
    let answer = remote.create_answer().unwrap();
    remote.set_local_description(&answer).unwrap();
    local.set_remote_description(&answer).unwrap();

    assert_eq!(local.signaling_state(), SignalingState::Stable);
    assert_eq!(remote.signaling_state(), SignalingState::Stable);
}

#[test]
fn create_answer_without_remote_offer_fails() {
    let (_local, mut remote, _rx) = pair();
    let cause = remote.create_answer().unwrap_err();
    assert_eq!(cause, SignalingError::NoRemoteOffer);
    assert_eq!(remote.signaling_state(), SignalingState::New);

    let err = NegotiationError::new(NegotiationStep::CreateAnswer, cause);
    assert_eq!(err.side, PeerId::Remote);
    assert!(err.to_string().starts_with("createAnswer failed on remote"));
}

#[test]
fn early_candidates_are_buffered_until_both_descriptions() {
    let (mut local, mut remote, _rx) = pair();
    local
        .add_track(MediaTrack::new(TrackKind::Video, "cam"))
        .unwrap();
    let offer = local.create_offer(&OfferOptions::default()).unwrap();
    local.set_local_description(&offer).unwrap();

    let early = host_candidate(PeerId::Local, 50_000, local.local_ufrag());
    assert_eq!(
        remote.add_ice_candidate(early.clone()),
        Ok(CandidateDisposition::Buffered)
    );
    remote.set_remote_description(&offer).unwrap();
    assert_eq!(remote.buffered_candidate_count(), 1);

    let answer = remote.create_answer().unwrap();
    remote.set_local_description(&answer).unwrap();
    assert_eq!(remote.buffered_candidate_count(), 0);
    assert_eq!(remote.applied_remote_candidates().len(), 1);
    assert_eq!(remote.signaling_state(), SignalingState::Stable);

    // A duplicate is accepted but not applied twice.
    assert_eq!(
        remote.add_ice_candidate(early),
        Ok(CandidateDisposition::Applied)
    );
    assert_eq!(remote.applied_remote_candidates().len(), 1);
}

#[test]
fn closing_twice_is_harmless() {
    let (mut local, _remote, _rx) = pair();
    assert!(local.close());
    assert!(!local.close());
    assert_eq!(local.signaling_state(), SignalingState::Closed);
    assert_eq!(
        local.add_ice_candidate(host_candidate(PeerId::Remote, 50_001, "abcd")),
        Ok(CandidateDisposition::Dropped)
    );
    assert_eq!(
        local.create_offer(&OfferOptions::default()),
        Err(SignalingError::Closed)
    );
}
