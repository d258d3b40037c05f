use crate::{
    circuits::CircuitId,
    model::{NullifierArtifact, ProofResponse},
};
use num_bigint::BigInt;
use std::str::FromStr;
use thiserror::Error;

// Public signals of credentialAtomicQueryV3-beta.0 start with
// userID, circuitQueryHash, issuerState, linkID, nullifier, ...
// and end with verifierID, nullifierSessionID.
const V3_NULLIFIER_INDEX: usize = 4;
const V3_MIN_SIGNALS: usize = V3_NULLIFIER_INDEX + 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("scope {scope_id}: expected at least {expected} public signals, got {got}")]
    MissingSignals {
        scope_id: u32,
        expected: usize,
        got: usize,
    },
    #[error("scope {scope_id}: invalid {name} public signal {value:?}")]
    InvalidSignal {
        scope_id: u32,
        name: &'static str,
        value: String,
    },
}

/// Nullifier data carried by a V3 proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AtomicQueryV3PubSignals {
    pub(crate) nullifier: BigInt,
    pub(crate) nullifier_session_id: BigInt,
}

impl AtomicQueryV3PubSignals {
    pub(crate) fn decode(scope_id: u32, signals: &[String]) -> Result<Self, SignalError> {
        if signals.len() < V3_MIN_SIGNALS {
            return Err(SignalError::MissingSignals {
                scope_id,
                expected: V3_MIN_SIGNALS,
                got: signals.len(),
            });
        }

        Ok(Self {
            nullifier: decimal(scope_id, "nullifier", &signals[V3_NULLIFIER_INDEX])?,
            nullifier_session_id: decimal(
                scope_id,
                "nullifierSessionID",
                &signals[signals.len() - 1],
            )?,
        })
    }
}

/// Collects nullifier artifacts from verified scopes. Scopes of circuits
/// that expose no nullifier contribute nothing.
pub(crate) fn verification_artifacts(
    scopes: &[ProofResponse],
) -> Result<Vec<NullifierArtifact>, SignalError> {
    scopes
        .iter()
        .filter(|scope| {
            CircuitId::parse(&scope.circuit_id).is_some_and(|circuit| circuit.carries_nullifier())
        })
        .map(|scope| {
            let signals = AtomicQueryV3PubSignals::decode(scope.id, &scope.pub_signals)?;

            // Reported even when zero, i.e. when no nullifier was requested
            Ok(NullifierArtifact {
                scope_id: scope.id,
                nullifier_session_id: Some(signals.nullifier_session_id.to_string()),
                nullifier: Some(signals.nullifier.to_string()),
            })
        })
        .collect()
}

fn decimal(scope_id: u32, name: &'static str, value: &str) -> Result<BigInt, SignalError> {
    let invalid = || SignalError::InvalidSignal {
        scope_id,
        name,
        value: value.to_owned(),
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    BigInt::from_str(value).map_err(|_| invalid())
}
