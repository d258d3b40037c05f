#![cfg_attr(rustfmt, rustfmt_skip)]

use std::time::Duration;

pub const AUTHORIZATION_REQUEST_MESSAGE_TYPE: &str = "https://iden3-communication.io/authorization/1.0/request";
pub const CONTRACT_INVOKE_REQUEST_MESSAGE_TYPE: &str = "https://iden3-communication.io/proofs/1.0/contract-invoke-request";
pub const MEDIA_TYPE_PLAIN_MESSAGE: &str = "application/iden3comm-plain-json";
pub const IDEN3COMM_SCHEME: &str = "iden3comm";

pub const SIGN_IN_PATH: &str = "/sign-in";
pub const QR_STORE_PATH: &str = "/qr-store";
pub const CALLBACK_PATH: &str = "/callback";
pub const STATUS_PATH: &str = "/status";

pub const DEFAULT_REASON: &str = "for testing purposes";
pub const NULLIFIER_SESSION_ID_PARAM: &str = "nullifierSessionID";
pub const NULLIFIER_SESSION_ID_FIELD: &str = "nullifierSessionId";

pub const QR_CODE_KEY_PREFIX: &str = "qr-code-";
pub const QR_CODE_TTL: Duration = Duration::from_secs(60 * 60);
pub const STATE_TRANSITION_DELAY: Duration = Duration::from_secs(5 * 60);
