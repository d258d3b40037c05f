use crate::{
    circuits::{self, CircuitId},
    constants::NULLIFIER_SESSION_ID_PARAM,
    model::{ProofRequestSpec, ScopeRequest, TransactionDataRequest},
};
use num_bigint::BigInt;
use serde_json::{Map, Value};
use std::{collections::HashSet, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field scope is empty")]
    EmptyScope,
    #[error("field scope id must be unique, got {0} multiple times")]
    DuplicateScopeId(i64),
    #[error("field scope id is empty")]
    EmptyScopeId,
    #[error("field scope id {0} is out of range")]
    ScopeIdOutOfRange(i64),
    #[error("field circuitId is empty")]
    EmptyCircuitId,
    #[error("field circuitId value is wrong, got {got}, expected {expected}")]
    UnsupportedCircuitId { got: String, expected: String },
    #[error("field query is empty")]
    EmptyQuery,
    #[error("context cannot be empty")]
    EmptyContext,
    #[error("type cannot be empty")]
    EmptyType,
    #[error("allowedIssuers cannot be empty")]
    MissingAllowedIssuers,
    #[error("credentialSubject cannot be empty")]
    MissingCredentialSubject,
    #[error("field chainId is empty expected {expected}")]
    MissingChainId { expected: String },
    #[error("field chainId value is wrong, got {got}, expected {expected}")]
    UnsupportedChainId { got: String, expected: String },
    #[error("field transactionData is empty")]
    EmptyTransactionData,
    #[error("field chainId is empty")]
    EmptyTransactionChainId,
    #[error("field contractAddress is empty")]
    EmptyContractAddress,
    #[error("field methodId is empty")]
    EmptyMethodId,
    #[error("field network is empty")]
    EmptyNetwork,
    #[error("nullifierSessionID is empty")]
    EmptyNullifierSessionId,
    #[error("nullifierSessionID is not a valid big integer")]
    InvalidNullifierSessionId,
}

/// Whether a request is answered through the HTTP callback or settled by an
/// on-chain contract invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    OffChain,
    OnChain,
}

impl RequestMode {
    /// Infers the mode from the circuit of the first scope. Unknown circuits
    /// fall back to off-chain so that validation reports them.
    pub fn of(spec: &ProofRequestSpec) -> Self {
        match spec
            .scope
            .first()
            .and_then(|scope| CircuitId::parse(&scope.circuit_id))
        {
            Some(circuit) if circuit.is_on_chain() => RequestMode::OnChain,
            _ => RequestMode::OffChain,
        }
    }

    fn circuits(&self) -> &'static [CircuitId] {
        match self {
            RequestMode::OffChain => &CircuitId::OFF_CHAIN,
            RequestMode::OnChain => &CircuitId::ON_CHAIN,
        }
    }
}

/// Deployment-dependent validation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRules {
    /// Chain ids accepted for off-chain requests, in reporting order
    pub supported_chain_ids: Vec<String>,
    pub require_credential_subject: bool,
}

impl ValidationRules {
    fn expected_chain_ids(&self) -> String {
        self.supported_chain_ids.join(" or ")
    }
}

/// Validates a proof request. The first failing rule wins.
pub fn validate(
    spec: &ProofRequestSpec,
    mode: RequestMode,
    rules: &ValidationRules,
) -> Result<(), ValidationError> {
    if spec.scope.is_empty() {
        return Err(ValidationError::EmptyScope);
    }

    validate_unique_ids(&spec.scope)?;

    for scope in &spec.scope {
        validate_scope_id(scope.id)?;
    }

    for scope in &spec.scope {
        validate_circuit(&scope.circuit_id, mode)?;
    }

    for scope in &spec.scope {
        validate_query(scope.query.as_ref(), rules)?;
    }

    match mode {
        RequestMode::OffChain => validate_chain_id(spec.chain_id.as_deref(), rules)?,
        RequestMode::OnChain => validate_transaction_data(spec.transaction_data.as_ref())?,
    }

    for params in spec.scope.iter().filter_map(|scope| scope.params.as_ref()) {
        parse_nullifier_session_id(params)?;
    }

    Ok(())
}

fn validate_unique_ids(scopes: &[ScopeRequest]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(scopes.len());

    match scopes.iter().find(|scope| !seen.insert(scope.id)) {
        Some(duplicate) => Err(ValidationError::DuplicateScopeId(duplicate.id)),
        None => Ok(()),
    }
}

fn validate_scope_id(id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::EmptyScopeId);
    }

    u32::try_from(id)
        .map(|_| ())
        .map_err(|_| ValidationError::ScopeIdOutOfRange(id))
}

fn validate_circuit(circuit_id: &str, mode: RequestMode) -> Result<(), ValidationError> {
    if circuit_id.is_empty() {
        return Err(ValidationError::EmptyCircuitId);
    }

    let allowed = mode.circuits();
    match CircuitId::parse(circuit_id) {
        Some(circuit) if allowed.contains(&circuit) => Ok(()),
        _ => Err(ValidationError::UnsupportedCircuitId {
            got: circuit_id.to_owned(),
            expected: circuits::describe(allowed),
        }),
    }
}

fn validate_query(
    query: Option<&Map<String, Value>>,
    rules: &ValidationRules,
) -> Result<(), ValidationError> {
    let query = query.ok_or(ValidationError::EmptyQuery)?;

    if is_blank(query.get("context")) {
        return Err(ValidationError::EmptyContext);
    }

    if is_blank(query.get("type")) {
        return Err(ValidationError::EmptyType);
    }

    if is_absent(query.get("allowedIssuers")) {
        return Err(ValidationError::MissingAllowedIssuers);
    }

    if rules.require_credential_subject && is_absent(query.get("credentialSubject")) {
        return Err(ValidationError::MissingCredentialSubject);
    }

    Ok(())
}

fn validate_chain_id(
    chain_id: Option<&str>,
    rules: &ValidationRules,
) -> Result<(), ValidationError> {
    let expected = rules.expected_chain_ids();

    let chain_id = chain_id.ok_or_else(|| ValidationError::MissingChainId {
        expected: expected.clone(),
    })?;

    if !rules.supported_chain_ids.iter().any(|id| id == chain_id) {
        return Err(ValidationError::UnsupportedChainId {
            got: chain_id.to_owned(),
            expected,
        });
    }

    Ok(())
}

fn validate_transaction_data(
    transaction_data: Option<&TransactionDataRequest>,
) -> Result<(), ValidationError> {
    let data = transaction_data.ok_or(ValidationError::EmptyTransactionData)?;

    if data.chain_id <= 0 {
        return Err(ValidationError::EmptyTransactionChainId);
    }
    if data.contract_address.is_empty() {
        return Err(ValidationError::EmptyContractAddress);
    }
    if data.method_id.is_empty() {
        return Err(ValidationError::EmptyMethodId);
    }
    if data.network.is_empty() {
        return Err(ValidationError::EmptyNetwork);
    }

    Ok(())
}

/// Extracts the nullifier session id from scope params as a base 10 integer.
pub fn parse_nullifier_session_id(params: &Map<String, Value>) -> Result<BigInt, ValidationError> {
    let value = params
        .get(NULLIFIER_SESSION_ID_PARAM)
        .ok_or(ValidationError::EmptyNullifierSessionId)?;

    let Value::String(value) = value else {
        return Err(ValidationError::InvalidNullifierSessionId);
    };

    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidNullifierSessionId);
    }

    BigInt::from_str(value).map_err(|_| ValidationError::InvalidNullifierSessionId)
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
