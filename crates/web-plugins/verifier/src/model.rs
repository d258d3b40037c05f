use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// region: --- Sign-in request

// A proof request as submitted by a relying party, e.g.:
// ```
// {
//     "chainID": "80001",
//     "reason": "age verification",
//     "scope": [
//         {
//             "id": 1,
//             "circuitId": "credentialAtomicQuerySigV2",
//             "query": {
//                 "context": "https://raw.githubusercontent.com/iden3/claim-schema-vocab/main/schemas/json-ld/kyc-v3.json-ld",
//                 "allowedIssuers": ["*"],
//                 "type": "KYCAgeCredential",
//                 "credentialSubject": { "birthday": { "$lt": 20000101 } }
//             }
//         }
//     ]
// }
// ```
//
// Fields are optional at the serde level so that omissions surface as
// validation messages instead of deserialization failures.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProofRequestSpec {
    #[serde(
        rename = "chainID",
        alias = "chainId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub chain_id: Option<String>,

    #[serde(default)]
    pub scope: Vec<ScopeRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    #[serde(
        rename = "transactionData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_data: Option<TransactionDataRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeRequest {
    #[serde(default)]
    pub id: i64,

    #[serde(rename = "circuitId", default)]
    pub circuit_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionDataRequest {
    #[serde(rename = "contractAddress", default)]
    pub contract_address: String,

    #[serde(rename = "methodID", alias = "methodId", default)]
    pub method_id: String,

    #[serde(rename = "chainID", alias = "chainId", default)]
    pub chain_id: i64,

    #[serde(default)]
    pub network: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInResponse {
    #[serde(rename = "qrCode")]
    pub qr_code: String,

    #[serde(rename = "sessionID")]
    pub session_id: Uuid,
}

// endregion: --- Sign-in request

// region: --- iden3comm messages

/// Request message issued to the prover, either an authorization request
/// (answered through the callback URL) or a contract invoke request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub id: String,

    pub typ: String,

    #[serde(rename = "type")]
    pub type_: String,

    pub thid: String,

    pub body: RequestBody,

    pub from: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(
        rename = "callbackUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub callback_url: Option<String>,

    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_data: Option<TransactionData>,

    pub scope: Vec<ProofRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofRequest {
    pub id: u32,

    #[serde(rename = "circuitId")]
    pub circuit_id: String,

    pub query: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    pub contract_address: String,
    pub method_id: String,
    pub chain_id: i64,
    pub network: String,
}

/// Authorization response as returned by the verifier once the signed token
/// has been checked against the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub typ: String,

    #[serde(rename = "type", default)]
    pub type_: String,

    #[serde(default)]
    pub thid: String,

    pub from: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    #[serde(default)]
    pub body: AuthorizationResponseBody,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub scope: Vec<ProofResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofResponse {
    pub id: u32,

    #[serde(rename = "circuitId")]
    pub circuit_id: String,

    #[serde(default)]
    pub pub_signals: Vec<String>,

    #[serde(default)]
    pub proof: Value,
}

// endregion: --- iden3comm messages

// region: --- Sessions

/// Lifecycle value of a session. `Error` and `Verified` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Pending(RequestMessage),
    Error(String),
    Verified(VerificationResult),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Pending(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    /// Signed response token exactly as posted by the prover
    pub jwz: String,
    pub user_did: String,
    pub scopes: Vec<NullifierArtifact>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullifierArtifact {
    pub scope_id: u32,
    pub nullifier_session_id: Option<String>,
    pub nullifier: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: SessionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwz: Option<String>,

    #[serde(
        rename = "jwzMetadata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub jwz_metadata: Option<JwzMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwzMetadata {
    #[serde(rename = "userDID")]
    pub user_did: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullifiers: Option<Vec<JwzProof>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwzProof {
    #[serde(rename = "scopeID")]
    pub scope_id: u32,

    #[serde(
        rename = "nullifierSessionID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub nullifier_session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullifier: Option<String>,
}

impl From<&SessionState> for StatusResponse {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::Pending(_) => StatusResponse {
                status: SessionStatus::Pending,
                message: None,
                jwz: None,
                jwz_metadata: None,
            },
            SessionState::Error(cause) => StatusResponse {
                status: SessionStatus::Error,
                message: Some(cause.clone()),
                jwz: None,
                jwz_metadata: None,
            },
            SessionState::Verified(result) => {
                let nullifiers = (!result.scopes.is_empty()).then(|| {
                    result
                        .scopes
                        .iter()
                        .map(|scope| JwzProof {
                            scope_id: scope.scope_id,
                            nullifier_session_id: scope.nullifier_session_id.clone(),
                            nullifier: scope.nullifier.clone(),
                        })
                        .collect()
                });

                StatusResponse {
                    status: SessionStatus::Success,
                    message: None,
                    jwz: Some(result.jwz.clone()),
                    jwz_metadata: Some(JwzMetadata {
                        user_did: result.user_did.clone(),
                        nullifiers,
                    }),
                }
            }
        }
    }
}

// endregion: --- Sessions

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_sign_in_request() {
        let spec: ProofRequestSpec = serde_json::from_value(json!({
            "chainID": "80001",
            "scope": [{
                "id": 1,
                "circuitId": "credentialAtomicQuerySigV2",
                "query": {
                    "context": "https://example.com/kyc-v3.json-ld",
                    "allowedIssuers": ["*"],
                    "type": "KYCAgeCredential"
                },
                "params": { "nullifierSessionID": "12345" }
            }],
            "transactionData": {
                "contractAddress": "0x2C1DdDc4C8b6BdAaE831eF04bF4FfDfA575d8bA7",
                "methodId": "b68967e2",
                "chainId": 80001,
                "network": "polygon-mumbai"
            }
        }))
        .unwrap();

        assert_eq!(spec.chain_id.as_deref(), Some("80001"));
        assert_eq!(spec.scope[0].circuit_id, "credentialAtomicQuerySigV2");
        assert!(spec.scope[0].params.is_some());

        let transaction_data = spec.transaction_data.unwrap();
        assert_eq!(transaction_data.method_id, "b68967e2");
        assert_eq!(transaction_data.chain_id, 80001);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let spec: ProofRequestSpec = serde_json::from_value(json!({
            "scope": [{ "query": {} }]
        }))
        .unwrap();

        assert_eq!(spec.scope[0].id, 0);
        assert!(spec.scope[0].circuit_id.is_empty());
        assert!(spec.chain_id.is_none());
    }

    #[test]
    fn test_serialize_contract_invoke_request() {
        let message = RequestMessage {
            id: "7f38a193-0918-4a48-9fac-36adfdb8b542".to_owned(),
            typ: "application/iden3comm-plain-json".to_owned(),
            type_: "https://iden3-communication.io/proofs/1.0/contract-invoke-request".to_owned(),
            thid: "7f38a193-0918-4a48-9fac-36adfdb8b542".to_owned(),
            body: RequestBody {
                callback_url: None,
                reason: "airdrop participation".to_owned(),
                transaction_data: Some(TransactionData {
                    contract_address: "0x2C1DdDc4C8b6BdAaE831eF04bF4FfDfA575d8bA7".to_owned(),
                    method_id: "b68967e2".to_owned(),
                    chain_id: 80001,
                    network: "polygon-mumbai".to_owned(),
                }),
                scope: vec![],
            },
            from: "did:polygonid:polygon:mumbai:2qH7TstpRRJHXNN4o49Fu9H2Qismku8hQeUxDVrjqT"
                .to_owned(),
            to: None,
        };

        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], message.type_);
        assert_eq!(value["body"]["transaction_data"]["method_id"], "b68967e2");
        assert!(value["body"].get("callbackUrl").is_none());
        assert!(value.get("to").is_none());
    }

    #[test]
    fn test_status_of_verified_session() {
        let state = SessionState::Verified(VerificationResult {
            jwz: "eyJhbGciOiJncm90aDE2In0.e30.e30".to_owned(),
            user_did: "did:polygonid:polygon:mumbai:2qFXWZVHYvXpdkL6dcNyeS3gxaAgsGjDVHbbmS6zqy"
                .to_owned(),
            scopes: vec![NullifierArtifact {
                scope_id: 1,
                nullifier_session_id: Some("12345".to_owned()),
                nullifier: Some("678".to_owned()),
            }],
        });

        let value = serde_json::to_value(StatusResponse::from(&state)).unwrap();

        assert_eq!(
            value,
            json!({
                "status": "success",
                "jwz": "eyJhbGciOiJncm90aDE2In0.e30.e30",
                "jwzMetadata": {
                    "userDID": "did:polygonid:polygon:mumbai:2qFXWZVHYvXpdkL6dcNyeS3gxaAgsGjDVHbbmS6zqy",
                    "nullifiers": [
                        { "scopeID": 1, "nullifierSessionID": "12345", "nullifier": "678" }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_status_of_pending_and_failed_sessions() {
        let failed = SessionState::Error("proof is not valid".to_owned());
        let value = serde_json::to_value(StatusResponse::from(&failed)).unwrap();
        assert_eq!(value, json!({ "status": "error", "message": "proof is not valid" }));
        assert!(failed.is_terminal());
    }
}
