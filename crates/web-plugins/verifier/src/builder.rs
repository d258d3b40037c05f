use crate::{
    constants::{
        AUTHORIZATION_REQUEST_MESSAGE_TYPE, CALLBACK_PATH, CONTRACT_INVOKE_REQUEST_MESSAGE_TYPE,
        DEFAULT_REASON, MEDIA_TYPE_PLAIN_MESSAGE, NULLIFIER_SESSION_ID_FIELD,
    },
    identity::{ContractIdentity, IdentityError},
    model::{ProofRequest, ProofRequestSpec, RequestBody, RequestMessage, TransactionData},
    validator::{self, RequestMode, ValidationError},
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("sender not found for chain {0}")]
    SenderNotFound(String),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Looks up the DID requests are issued from on a given chain.
pub trait SenderResolver: Send + Sync {
    fn sender_did(&self, chain_id: &str) -> Result<String, BuildError>;
}

/// Static chain id to sender DID mapping.
#[derive(Debug, Clone, Default)]
pub struct SenderRegistry {
    senders: HashMap<String, String>,
}

impl SenderRegistry {
    pub fn new(senders: HashMap<String, String>) -> Self {
        Self { senders }
    }
}

impl SenderResolver for SenderRegistry {
    fn sender_did(&self, chain_id: &str) -> Result<String, BuildError> {
        self.senders
            .get(chain_id)
            .cloned()
            .ok_or_else(|| BuildError::SenderNotFound(chain_id.to_owned()))
    }
}

/// Turns validated proof requests into request messages.
pub struct RequestBuilder<'a> {
    host: &'a str,
    senders: &'a dyn SenderResolver,
    contracts: &'a dyn ContractIdentity,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(
        host: &'a str,
        senders: &'a dyn SenderResolver,
        contracts: &'a dyn ContractIdentity,
    ) -> Self {
        Self {
            host,
            senders,
            contracts,
        }
    }

    pub fn build(
        &self,
        spec: &ProofRequestSpec,
        mode: RequestMode,
        session_id: &Uuid,
    ) -> Result<RequestMessage, BuildError> {
        match mode {
            RequestMode::OffChain => self.authorization_request(spec, session_id),
            RequestMode::OnChain => self.contract_invoke_request(spec),
        }
    }

    /// Builds a request answered by posting the signed response to the
    /// callback URL of the session.
    pub fn authorization_request(
        &self,
        spec: &ProofRequestSpec,
        session_id: &Uuid,
    ) -> Result<RequestMessage, BuildError> {
        let chain_id = spec
            .chain_id
            .as_deref()
            .ok_or_else(|| ValidationError::MissingChainId {
                expected: String::new(),
            })?;

        let id = Uuid::new_v4().to_string();
        Ok(RequestMessage {
            thid: id.clone(),
            id,
            typ: MEDIA_TYPE_PLAIN_MESSAGE.to_owned(),
            type_: AUTHORIZATION_REQUEST_MESSAGE_TYPE.to_owned(),
            body: RequestBody {
                callback_url: Some(self.callback_url(session_id)),
                reason: reason(spec),
                transaction_data: None,
                scope: proof_requests(spec)?,
            },
            from: self.senders.sender_did(chain_id)?,
            to: spec.to.clone(),
        })
    }

    /// Builds a request whose response is submitted to a contract; the
    /// contract is addressed as the recipient.
    pub fn contract_invoke_request(
        &self,
        spec: &ProofRequestSpec,
    ) -> Result<RequestMessage, BuildError> {
        let data = spec
            .transaction_data
            .as_ref()
            .ok_or(ValidationError::EmptyTransactionData)?;

        let transaction_data = TransactionData {
            contract_address: data.contract_address.clone(),
            method_id: data.method_id.clone(),
            chain_id: data.chain_id,
            network: data.network.clone(),
        };

        let from = self.senders.sender_did(&data.chain_id.to_string())?;
        let to = self
            .contracts
            .contract_did(&data.contract_address, data.chain_id)?;

        let id = Uuid::new_v4().to_string();
        Ok(RequestMessage {
            thid: id.clone(),
            id,
            typ: MEDIA_TYPE_PLAIN_MESSAGE.to_owned(),
            type_: CONTRACT_INVOKE_REQUEST_MESSAGE_TYPE.to_owned(),
            body: RequestBody {
                callback_url: None,
                reason: reason(spec),
                transaction_data: Some(transaction_data),
                scope: proof_requests(spec)?,
            },
            from,
            to: Some(to),
        })
    }

    fn callback_url(&self, session_id: &Uuid) -> String {
        format!("{}{CALLBACK_PATH}?sessionID={session_id}", self.host)
    }
}

fn reason(spec: &ProofRequestSpec) -> String {
    spec.reason
        .clone()
        .unwrap_or_else(|| DEFAULT_REASON.to_owned())
}

fn proof_requests(spec: &ProofRequestSpec) -> Result<Vec<ProofRequest>, BuildError> {
    spec.scope
        .iter()
        .map(|scope| -> Result<ProofRequest, BuildError> {
            let id = u32::try_from(scope.id)
                .ok()
                .filter(|id| *id > 0)
                .ok_or(ValidationError::EmptyScopeId)?;

            let params = scope.params.as_ref().map(normalize_params).transpose()?;

            Ok(ProofRequest {
                id,
                circuit_id: scope.circuit_id.clone(),
                query: scope.query.clone().unwrap_or_default(),
                params,
            })
        })
        .collect()
}

fn normalize_params(params: &Map<String, Value>) -> Result<Map<String, Value>, BuildError> {
    let nullifier_session_id = validator::parse_nullifier_session_id(params)?;

    let mut normalized = Map::new();
    normalized.insert(
        NULLIFIER_SESSION_ID_FIELD.to_owned(),
        Value::String(nullifier_session_id.to_string()),
    );

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tests::{
        contracts, off_chain_spec, on_chain_spec, senders, HOST, MAIN_SENDER_DID,
        MUMBAI_SENDER_DID,
    };
    use serde_json::json;

    #[test]
    fn test_authorization_request() {
        let (senders, contracts) = (senders(), contracts());
        let builder = RequestBuilder::new(HOST, &senders, &contracts);
        let session_id = Uuid::new_v4();
        let spec = off_chain_spec();

        let message = builder
            .build(&spec, RequestMode::OffChain, &session_id)
            .unwrap();

        assert_eq!(message.id, message.thid);
        assert!(Uuid::parse_str(&message.id).is_ok());
        assert_eq!(message.typ, "application/iden3comm-plain-json");
        assert_eq!(
            message.type_,
            "https://iden3-communication.io/authorization/1.0/request"
        );
        assert_eq!(message.from, MUMBAI_SENDER_DID);
        assert_eq!(message.to, None);
        assert_eq!(message.body.reason, "for testing purposes");
        assert_eq!(
            message.body.callback_url,
            Some(format!("{HOST}/callback?sessionID={session_id}"))
        );
        assert!(message.body.transaction_data.is_none());

        assert_eq!(message.body.scope.len(), 1);
        assert_eq!(message.body.scope[0].id, 1);
        assert_eq!(message.body.scope[0].circuit_id, spec.scope[0].circuit_id);
        assert_eq!(Some(&message.body.scope[0].query), spec.scope[0].query.as_ref());
    }

    #[test]
    fn test_authorization_request_with_reason_recipient_and_params() {
        let (senders, contracts) = (senders(), contracts());
        let builder = RequestBuilder::new(HOST, &senders, &contracts);

        let mut spec = off_chain_spec();
        spec.chain_id = Some("137".to_owned());
        spec.reason = Some("age verification".to_owned());
        spec.to = Some("did:polygonid:polygon:main:2qEATqfECVbCBzq9EhJpPSiv1xtJRpbMBKDaNM68Ci".to_owned());
        spec.scope[0].params = serde_json::from_value(json!({ "nullifierSessionID": "0042" })).unwrap();

        let message = builder.authorization_request(&spec, &Uuid::new_v4()).unwrap();

        assert_eq!(message.from, MAIN_SENDER_DID);
        assert_eq!(message.to, spec.to);
        assert_eq!(message.body.reason, "age verification");
        assert_eq!(
            serde_json::to_value(&message.body.scope[0].params).unwrap(),
            json!({ "nullifierSessionId": "42" })
        );
    }

    #[test]
    fn test_unique_message_ids() {
        let (senders, contracts) = (senders(), contracts());
        let builder = RequestBuilder::new(HOST, &senders, &contracts);
        let spec = off_chain_spec();

        let first = builder.authorization_request(&spec, &Uuid::new_v4()).unwrap();
        let second = builder.authorization_request(&spec, &Uuid::new_v4()).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_contract_invoke_request() {
        let (senders, contracts) = (senders(), contracts());
        let builder = RequestBuilder::new(HOST, &senders, &contracts);
        let spec = on_chain_spec();

        let message = builder
            .build(&spec, RequestMode::OnChain, &Uuid::new_v4())
            .unwrap();

        assert_eq!(message.id, message.thid);
        assert_eq!(
            message.type_,
            "https://iden3-communication.io/proofs/1.0/contract-invoke-request"
        );
        assert_eq!(message.from, MUMBAI_SENDER_DID);
        assert_eq!(
            message.to,
            Some(
                contracts
                    .contract_did("0x2C1DdDc4C8b6BdAaE831eF04bF4FfDfA575d8bA7", 80001)
                    .unwrap()
            )
        );
        assert!(message.body.callback_url.is_none());

        let data = message.body.transaction_data.unwrap();
        assert_eq!(data.method_id, "b68967e2");
        assert_eq!(data.chain_id, 80001);
        assert_eq!(data.network, "polygon-mumbai");
    }

    #[test]
    fn test_sender_not_found() {
        let (senders, contracts) = (senders(), contracts());
        let builder = RequestBuilder::new(HOST, &senders, &contracts);

        let mut spec = on_chain_spec();
        if let Some(data) = spec.transaction_data.as_mut() {
            data.chain_id = 5;
        }

        let err = builder.contract_invoke_request(&spec).unwrap_err();
        assert_eq!(err.to_string(), "sender not found for chain 5");
    }
}
