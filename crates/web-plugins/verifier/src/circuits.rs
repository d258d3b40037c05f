use std::fmt;

/// Zero-knowledge circuits a scope may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitId {
    AtomicQuerySigV2,
    AtomicQueryMtpV2,
    AtomicQueryV3,
    AtomicQuerySigV2OnChain,
    AtomicQueryMtpV2OnChain,
    AtomicQueryV3OnChain,
}

impl CircuitId {
    pub const OFF_CHAIN: [CircuitId; 3] = [
        CircuitId::AtomicQuerySigV2,
        CircuitId::AtomicQueryMtpV2,
        CircuitId::AtomicQueryV3,
    ];

    pub const ON_CHAIN: [CircuitId; 3] = [
        CircuitId::AtomicQuerySigV2OnChain,
        CircuitId::AtomicQueryMtpV2OnChain,
        CircuitId::AtomicQueryV3OnChain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitId::AtomicQuerySigV2 => "credentialAtomicQuerySigV2",
            CircuitId::AtomicQueryMtpV2 => "credentialAtomicQueryMTPV2",
            CircuitId::AtomicQueryV3 => "credentialAtomicQueryV3-beta.0",
            CircuitId::AtomicQuerySigV2OnChain => "credentialAtomicQuerySigV2OnChain",
            CircuitId::AtomicQueryMtpV2OnChain => "credentialAtomicQueryMTPV2OnChain",
            CircuitId::AtomicQueryV3OnChain => "credentialAtomicQueryV3OnChain-beta.0",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::OFF_CHAIN
            .into_iter()
            .chain(Self::ON_CHAIN)
            .find(|circuit| circuit.as_str() == value)
    }

    pub fn is_on_chain(&self) -> bool {
        Self::ON_CHAIN.contains(self)
    }

    /// Whether the public signals of this circuit expose a nullifier.
    ///
    /// On-chain V3 proofs are settled by the target contract and never
    /// reach the callback endpoint, so only the off-chain circuit counts.
    pub fn carries_nullifier(&self) -> bool {
        matches!(self, CircuitId::AtomicQueryV3)
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders a set of circuits as `a or b or c`.
pub(crate) fn describe(circuits: &[CircuitId]) -> String {
    circuits
        .iter()
        .map(CircuitId::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}
