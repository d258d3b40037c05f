use multibase::Base;
use std::collections::HashMap;
use thiserror::Error;

const DID_METHOD_POLYGON_ID: &str = "polygonid";
const DID_METHOD_BYTE_POLYGON_ID: u8 = 0b0000_0010;

const ADDRESS_LENGTH: usize = 20;
const GENESIS_LENGTH: usize = 27;
const ID_LENGTH: usize = 2 + GENESIS_LENGTH + 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid contract address {0}")]
    InvalidContractAddress(String),
    #[error("no identity network registered for chain {0}")]
    UnknownChain(i64),
}

/// Derives the identity a contract acts under on a given chain.
pub trait ContractIdentity: Send + Sync {
    fn contract_did(&self, contract_address: &str, chain_id: i64) -> Result<String, IdentityError>;
}

/// Blockchain/network pair a chain id maps to, with the flag byte used in
/// identity types for that network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityNetwork {
    pub blockchain: String,
    pub network: String,
    pub network_flag: u8,
}

/// Ethereum-controlled identities: the contract address is embedded in the
/// genesis state of a Polygon ID identifier.
#[derive(Debug, Clone, Default)]
pub struct GenesisIdentity {
    networks: HashMap<i64, IdentityNetwork>,
}

impl GenesisIdentity {
    pub fn new(networks: HashMap<i64, IdentityNetwork>) -> Self {
        Self { networks }
    }
}

impl ContractIdentity for GenesisIdentity {
    fn contract_did(&self, contract_address: &str, chain_id: i64) -> Result<String, IdentityError> {
        let network = self
            .networks
            .get(&chain_id)
            .ok_or(IdentityError::UnknownChain(chain_id))?;

        let address = parse_address(contract_address)?;
        let id = genesis_id(network.network_flag, &address);

        Ok(format!(
            "did:{DID_METHOD_POLYGON_ID}:{}:{}:{}",
            network.blockchain,
            network.network,
            Base::Base58Btc.encode(id)
        ))
    }
}

fn parse_address(contract_address: &str) -> Result<[u8; ADDRESS_LENGTH], IdentityError> {
    let invalid = || IdentityError::InvalidContractAddress(contract_address.to_owned());

    let hex_digits = contract_address
        .strip_prefix("0x")
        .or_else(|| contract_address.strip_prefix("0X"))
        .unwrap_or(contract_address);

    let bytes = hex::decode(hex_digits).map_err(|_| invalid())?;
    bytes.try_into().map_err(|_| invalid())
}

// Layout: type (method byte, network flag) | genesis (7 zero bytes, address) | checksum (u16 LE)
fn genesis_id(network_flag: u8, address: &[u8; ADDRESS_LENGTH]) -> [u8; ID_LENGTH] {
    let mut id = [0u8; ID_LENGTH];
    id[0] = DID_METHOD_BYTE_POLYGON_ID;
    id[1] = network_flag;
    id[2 + GENESIS_LENGTH - ADDRESS_LENGTH..2 + GENESIS_LENGTH].copy_from_slice(address);

    let checksum = id[..2 + GENESIS_LENGTH]
        .iter()
        .fold(0u16, |sum, byte| sum.wrapping_add(u16::from(*byte)));
    id[2 + GENESIS_LENGTH..].copy_from_slice(&checksum.to_le_bytes());

    id
}
