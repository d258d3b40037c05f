#[cfg(test)]
pub(crate) mod tests {
    use crate::{
        builder::{RequestBuilder, SenderRegistry},
        identity::{GenesisIdentity, IdentityNetwork},
        lifecycle::{Collaborators, SessionController},
        model::{
            AuthorizationResponse, AuthorizationResponseBody, ProofRequestSpec, ProofResponse,
            RequestMessage, SessionState,
        },
        store::{QrCodeStore, SessionStore},
        validator::{RequestMode, ValidationRules},
        verification::{ProofVerifier, VerificationError},
    };
    use async_trait::async_trait;
    use cache::InMemoryCache;
    use mockall::mock;
    use serde_json::json;
    use std::{collections::HashMap, sync::Arc, time::Duration};
    use uuid::Uuid;

    pub(crate) const HOST: &str = "https://verifier.example.com";

    pub(crate) const MUMBAI_SENDER_DID: &str =
        "did:polygonid:polygon:mumbai:2qH7TstpRRJHXNN4o49Fu9H2Qismku8hQeUxDVrjqT";
    pub(crate) const MAIN_SENDER_DID: &str =
        "did:polygonid:polygon:main:2q4Q7F7tM1xpwUTthh5oZPCHhSbqn3LdtSVrMxy9eu";
    pub(crate) const USER_DID: &str =
        "did:polygonid:polygon:mumbai:2qFXWZVHYvXpdkL6dcNyeS3gxaAgsGjDVHbbmS6zqy";

    mock! {
        pub Verifier {}
        #[async_trait]
        impl ProofVerifier for Verifier {
            async fn full_verify(
                &self,
                token: &str,
                request: &RequestMessage,
                accepted_state_transition_delay: Duration,
            ) -> Result<AuthorizationResponse, VerificationError>;
        }
    }

    pub(crate) fn rules() -> ValidationRules {
        ValidationRules {
            supported_chain_ids: vec!["137".to_owned(), "80001".to_owned()],
            require_credential_subject: false,
        }
    }

    pub(crate) fn senders() -> SenderRegistry {
        SenderRegistry::new(HashMap::from([
            ("80001".to_owned(), MUMBAI_SENDER_DID.to_owned()),
            ("137".to_owned(), MAIN_SENDER_DID.to_owned()),
        ]))
    }

    pub(crate) fn contracts() -> GenesisIdentity {
        GenesisIdentity::new(HashMap::from([
            (
                80001,
                IdentityNetwork {
                    blockchain: "polygon".to_owned(),
                    network: "mumbai".to_owned(),
                    network_flag: 0b0001_0010,
                },
            ),
            (
                137,
                IdentityNetwork {
                    blockchain: "polygon".to_owned(),
                    network: "main".to_owned(),
                    network_flag: 0b0001_0001,
                },
            ),
        ]))
    }

    pub(crate) fn off_chain_spec() -> ProofRequestSpec {
        serde_json::from_value(json!({
            "chainID": "80001",
            "scope": [{
                "id": 1,
                "circuitId": "credentialAtomicQuerySigV2",
                "query": {
                    "allowedIssuers": ["*"],
                    "context": "https://raw.githubusercontent.com/iden3/claim-schema-vocab/main/schemas/json-ld/kyc-v3.json-ld",
                    "type": "KYCAgeCredential",
                    "credentialSubject": {
                        "birthday": { "$lt": 20000101 }
                    }
                }
            }]
        }))
        .unwrap()
    }

    pub(crate) fn on_chain_spec() -> ProofRequestSpec {
        serde_json::from_value(json!({
            "reason": "airdrop participation",
            "scope": [{
                "id": 1,
                "circuitId": "credentialAtomicQuerySigV2OnChain",
                "query": {
                    "allowedIssuers": ["*"],
                    "context": "https://raw.githubusercontent.com/iden3/claim-schema-vocab/main/schemas/json-ld/kyc-v3.json-ld",
                    "type": "KYCCountryOfResidenceCredential",
                    "credentialSubject": {
                        "countryCode": { "$nin": [840, 120, 340, 509] }
                    }
                }
            }],
            "transactionData": {
                "contractAddress": "0x2C1DdDc4C8b6BdAaE831eF04bF4FfDfA575d8bA7",
                "methodID": "b68967e2",
                "chainID": 80001,
                "network": "polygon-mumbai"
            }
        }))
        .unwrap()
    }

    pub(crate) fn request_message() -> RequestMessage {
        let (senders, contracts) = (senders(), contracts());

        RequestBuilder::new(HOST, &senders, &contracts)
            .build(&off_chain_spec(), RequestMode::OffChain, &Uuid::new_v4())
            .unwrap()
    }

    /// Public signals of a V3 proof carrying the given nullifier values.
    pub(crate) fn v3_signals(nullifier: &str, nullifier_session_id: &str) -> Vec<String> {
        let mut signals: Vec<String> = [
            "23148936466334350744548790012294489365207440754509988986684797708370051073",
            "8953223006223102025290993097017399604713299937087346226405698108245620458",
            "7608718875295494883209574426025916016225779017040217745285036853225154108",
            "0",
        ]
        .iter()
        .map(|signal| signal.to_string())
        .collect();

        signals.push(nullifier.to_owned());
        signals.extend(["0", "0", "1", "1", "0", "1", "1642074362"].map(str::to_owned));
        signals.push("21929109382993718606847853573861987353620810345503358891473103689157378049".to_owned());
        signals.push(nullifier_session_id.to_owned());

        signals
    }

    pub(crate) fn proof_response(id: u32, circuit_id: &str, pub_signals: Vec<String>) -> ProofResponse {
        ProofResponse {
            id,
            circuit_id: circuit_id.to_owned(),
            pub_signals,
            proof: json!({ "pi_a": [], "pi_b": [], "pi_c": [], "protocol": "groth16" }),
        }
    }

    pub(crate) fn authorization_response(scope: Vec<ProofResponse>) -> AuthorizationResponse {
        let id = Uuid::new_v4().to_string();

        AuthorizationResponse {
            thid: id.clone(),
            id,
            typ: "application/iden3comm-plain-json".to_owned(),
            type_: "https://iden3-communication.io/authorization/1.0/response".to_owned(),
            from: USER_DID.to_owned(),
            to: Some(MUMBAI_SENDER_DID.to_owned()),
            body: AuthorizationResponseBody {
                message: None,
                scope,
            },
        }
    }

    pub(crate) fn controller(verifier: MockVerifier) -> SessionController {
        controller_with_caches(verifier).0
    }

    pub(crate) fn controller_with_caches(
        verifier: MockVerifier,
    ) -> (
        SessionController,
        Arc<InMemoryCache<SessionState>>,
        Arc<InMemoryCache<RequestMessage>>,
    ) {
        let sessions = Arc::new(InMemoryCache::<SessionState>::new());
        let qr_codes = Arc::new(InMemoryCache::<RequestMessage>::new());

        let controller = SessionController::new(
            HOST,
            rules(),
            Collaborators {
                senders: Arc::new(senders()),
                contracts: Arc::new(contracts()),
                verifier: Arc::new(verifier),
            },
            SessionStore::new(sessions.clone(), Duration::from_secs(60 * 60)),
            QrCodeStore::new(qr_codes.clone()),
        );

        (controller, sessions, qr_codes)
    }
}
