//! Exercises the crate's exported surface the way an external consumer
//! would: the client-side audio codec, the speaker-selection policy, and
//! the token signer, all reached through the library target rather than
//! crate-internal paths.

use voice_room_backend::agents::{Persona, RandomSelection, SelectionPolicy};
use voice_room_backend::audio::encode_samples;
use voice_room_backend::config::TokenConfig;
use voice_room_backend::error::AppError;
use voice_room_backend::token::TokenSigner;

#[test]
fn codec_is_usable_from_outside_the_crate() {
    let payload = encode_samples(&[0.0, 0.5, -0.5, 1.0, -1.0]).unwrap();
    assert!(!payload.is_empty());
    assert!(payload.is_ascii());

    // Failure mode is part of the exported contract too
    assert!(matches!(
        encode_samples(&[f32::NAN]),
        Err(AppError::Encoding(_))
    ));
}

#[test]
fn signer_is_usable_from_outside_the_crate() {
    let signer = TokenSigner::new("APItest123".to_string(), "shared-secret".to_string());
    let token_config = TokenConfig {
        ttl_secs: 21600,
        clock_skew_secs: 60,
    };

    let token = signer
        .issue("room-42", "alice@example.com", &token_config)
        .unwrap();
    assert_eq!(token.split('.').count(), 3);
}

#[test]
fn selection_policy_is_injectable_from_outside_the_crate() {
    let roster = vec![Persona {
        id: "host".to_string(),
        name: "The Host".to_string(),
        voice: "alloy".to_string(),
        system_prompt: "You keep the discussion on track.".to_string(),
    }];

    let policy: Box<dyn SelectionPolicy> = Box::new(RandomSelection);
    assert_eq!(policy.next_speaker(&roster).unwrap().id, "host");
}
