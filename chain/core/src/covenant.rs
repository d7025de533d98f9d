use serde::{Deserialize, Serialize};

use crate::errors::ChainError;

/// Covenant action attached to a transaction output. The discriminants match
/// the integers the full node serializes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum CovenantType {
    None = 0,
    Claim = 1,
    Open = 2,
    Bid = 3,
    Reveal = 4,
    Redeem = 5,
    Register = 6,
    Update = 7,
    Renew = 8,
    Transfer = 9,
    Finalize = 10,
    Revoke = 11,
}

impl CovenantType {
    pub fn from_u8(value: u8) -> Result<Self, ChainError> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Claim),
            2 => Ok(Self::Open),
            3 => Ok(Self::Bid),
            4 => Ok(Self::Reveal),
            5 => Ok(Self::Redeem),
            6 => Ok(Self::Register),
            7 => Ok(Self::Update),
            8 => Ok(Self::Renew),
            9 => Ok(Self::Transfer),
            10 => Ok(Self::Finalize),
            11 => Ok(Self::Revoke),
            other => Err(ChainError::UnknownCovenant(other)),
        }
    }

    /// Uppercase wire name, e.g. `OPEN`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Claim => "CLAIM",
            Self::Open => "OPEN",
            Self::Bid => "BID",
            Self::Reveal => "REVEAL",
            Self::Redeem => "REDEEM",
            Self::Register => "REGISTER",
            Self::Update => "UPDATE",
            Self::Renew => "RENEW",
            Self::Transfer => "TRANSFER",
            Self::Finalize => "FINALIZE",
            Self::Revoke => "REVOKE",
        }
    }

    /// Past-tense label used in name history listings.
    pub fn action_label(&self) -> &'static str {
        match self {
            Self::None => "Transfer",
            Self::Claim => "Claimed",
            Self::Open => "Opened",
            Self::Bid => "Bid",
            Self::Reveal => "Reveal",
            Self::Redeem => "Redeem",
            Self::Register => "Register",
            Self::Update => "Update",
            Self::Renew => "Renew",
            Self::Transfer => "Transferring",
            Self::Finalize => "Finalized",
            Self::Revoke => "Revoked",
        }
    }

    /// Every covenant except NONE references a name.
    pub fn is_name(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl TryFrom<u8> for CovenantType {
    type Error = ChainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}

impl From<CovenantType> for u8 {
    fn from(value: CovenantType) -> u8 {
        value as u8
    }
}

/// Covenant payload: an action plus hex-encoded items. Item layout depends on
/// the action; for every name covenant `items[0]` is the name hash, and for
/// CLAIM/OPEN `items[2]` is the raw ASCII name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Covenant {
    #[serde(rename = "type")]
    pub covenant_type: CovenantType,
    pub items: Vec<String>,
}

impl Covenant {
    pub fn new(covenant_type: CovenantType, items: Vec<String>) -> Self {
        Self {
            covenant_type,
            items,
        }
    }

    pub fn none() -> Self {
        Self::new(CovenantType::None, Vec::new())
    }

    pub fn is_name(&self) -> bool {
        self.covenant_type.is_name()
    }

    /// Name hash carried by a name covenant, lowercase hex.
    pub fn name_hash(&self) -> Option<&str> {
        if self.is_name() {
            self.items.first().map(String::as_str)
        } else {
            None
        }
    }

    /// ASCII name carried by CLAIM, OPEN and BID covenants.
    pub fn name(&self) -> Option<String> {
        if !matches!(
            self.covenant_type,
            CovenantType::Claim | CovenantType::Open | CovenantType::Bid
        ) {
            return None;
        }
        let raw = hex::decode(self.items.get(2)?).ok()?;
        String::from_utf8(raw).ok()
    }

    /// Reveal nonce carried by REVEAL covenants, hex.
    pub fn nonce(&self) -> Option<&str> {
        if self.covenant_type == CovenantType::Reveal {
            self.items.get(2).map(String::as_str)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_round_trip() {
        for value in 0u8..=11 {
            let ty = CovenantType::from_u8(value).unwrap();
            assert_eq!(u8::from(ty), value);
        }
        assert!(CovenantType::from_u8(12).is_err());
    }

    #[test]
    fn open_covenant_decodes_name() {
        let cov = Covenant::new(
            CovenantType::Open,
            vec![
                "aa".repeat(32),
                "00000000".to_string(),
                hex::encode("alice"),
            ],
        );
        assert_eq!(cov.name().as_deref(), Some("alice"));
        assert_eq!(cov.name_hash(), Some("aa".repeat(32).as_str()));
    }

    #[test]
    fn reveal_covenant_carries_nonce_not_name() {
        let cov = Covenant::new(
            CovenantType::Reveal,
            vec!["bb".repeat(32), "00000000".to_string(), "cc".repeat(32)],
        );
        assert_eq!(cov.name(), None);
        assert_eq!(cov.nonce(), Some("cc".repeat(32).as_str()));
        assert!(cov.is_name());
    }

    #[test]
    fn none_covenant_has_no_name_hash() {
        assert_eq!(Covenant::none().name_hash(), None);
    }
}
