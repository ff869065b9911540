use crate::core::account::NanoAccount;
use crate::core::block::{hash_fields, parse_decimal_balance, BlockType, BALANCE_LEN};
use crate::core::bytes::{BlockHash, Link, PrivateKey, PublicKey, Signature, WorkRoot};
use crate::core::work::WorkSolution;
use crate::error::{NanoError, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Fixed first 32 bytes of every hashed state block
pub const STATE_BLOCK_PREAMBLE: [u8; 32] = {
    let mut preamble = [0u8; 32];
    preamble[31] = 6;
    preamble
};

/// What a state block does. Metadata only: it is not part of the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateBlockSubtype {
    Send,
    Receive,
    Open,
    Change,
    Epoch,
}

impl StateBlockSubtype {
    /// The subtype a legacy block of `block_type` corresponds to
    pub fn from_legacy(block_type: BlockType) -> Option<StateBlockSubtype> {
        match block_type {
            BlockType::Send => Some(StateBlockSubtype::Send),
            BlockType::Receive | BlockType::Open => Some(StateBlockSubtype::Receive),
            BlockType::Change => Some(StateBlockSubtype::Change),
            BlockType::State => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StateBlockSubtype::Send => "send",
            StateBlockSubtype::Receive => "receive",
            StateBlockSubtype::Open => "open",
            StateBlockSubtype::Change => "change",
            StateBlockSubtype::Epoch => "epoch",
        }
    }
}

impl fmt::Display for StateBlockSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn layout<'a>(
    account: &'a PublicKey,
    previous: &'a BlockHash,
    representative: &'a PublicKey,
    balance: &'a [u8; BALANCE_LEN],
    link: &'a Link,
) -> [&'a [u8]; 6] {
    [
        &STATE_BLOCK_PREAMBLE,
        account.as_bytes(),
        previous.as_bytes(),
        representative.as_bytes(),
        balance,
        link.as_bytes(),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateBlock {
    subtype: Option<StateBlockSubtype>,
    account: NanoAccount,
    previous: BlockHash,
    representative: NanoAccount,
    balance: u128,
    link: Link,
    hash: BlockHash,
    signature: Signature,
    work: WorkSolution,
}

impl StateBlock {
    pub fn builder() -> StateBlockBuilder {
        StateBlockBuilder::default()
    }

    pub fn subtype(&self) -> Option<StateBlockSubtype> {
        self.subtype
    }

    pub fn account(&self) -> &NanoAccount {
        &self.account
    }

    pub fn previous(&self) -> &BlockHash {
        &self.previous
    }

    pub fn representative(&self) -> &NanoAccount {
        &self.representative
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    /// The link read as an account, using this block's address prefix
    pub fn link_as_account(&self) -> NanoAccount {
        NanoAccount::from_public_key(self.link.as_public_key())
            .with_prefix(self.account.prefix())
            .unwrap_or_else(|_| NanoAccount::from_public_key(self.link.as_public_key()))
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn work(&self) -> &WorkSolution {
        &self.work
    }

    /// An all-zero previous marks the account's first block
    pub fn is_opening(&self) -> bool {
        self.previous.is_zero()
    }

    pub fn work_root(&self) -> WorkRoot {
        if self.is_opening() {
            WorkRoot::from(*self.account.public_key())
        } else {
            WorkRoot::from(self.previous)
        }
    }

    pub fn hashable_bytes(&self) -> Vec<u8> {
        let balance = self.balance.to_be_bytes();
        layout(
            self.account.public_key(),
            &self.previous,
            self.representative.public_key(),
            &balance,
            &self.link,
        )
        .concat()
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<StateBlock> {
        let wire = StateBlockWire::deserialize(value)
            .map_err(|e| NanoError::format(format!("invalid state block: {e}")))?;
        let mut builder = StateBlock::builder()
            .account(wire.account)
            .previous(wire.previous)
            .representative(wire.representative)
            .balance(parse_decimal_balance(&wire.balance)?)
            .signature(wire.signature)
            .work(wire.work);
        if let Some(subtype) = wire.subtype {
            builder = builder.subtype(subtype);
        }
        if let Some(link) = wire.link {
            builder = builder.link(link);
        }
        if let Some(link_account) = wire.link_as_account {
            builder = builder.link_account(link_account);
        }
        builder.build()
    }
}

/// Collects state block fields. The link may be given as raw bytes, as an
/// account, or both (they must then agree); left unset it is all zero.
#[derive(Debug, Clone, Default)]
pub struct StateBlockBuilder {
    subtype: Option<StateBlockSubtype>,
    account: Option<NanoAccount>,
    previous: Option<BlockHash>,
    representative: Option<NanoAccount>,
    balance: Option<u128>,
    link: Option<Link>,
    link_account: Option<NanoAccount>,
    signature: Option<Signature>,
    work: Option<WorkSolution>,
}

struct Unsigned {
    subtype: Option<StateBlockSubtype>,
    account: NanoAccount,
    previous: BlockHash,
    representative: NanoAccount,
    balance: u128,
    link: Link,
    hash: BlockHash,
}

impl StateBlockBuilder {
    pub fn subtype(mut self, subtype: StateBlockSubtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    pub fn account(mut self, account: NanoAccount) -> Self {
        self.account = Some(account);
        self
    }

    pub fn previous(mut self, previous: BlockHash) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn representative(mut self, representative: NanoAccount) -> Self {
        self.representative = Some(representative);
        self
    }

    pub fn balance(mut self, balance: u128) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn link(mut self, link: Link) -> Self {
        self.link = Some(link);
        self
    }

    pub fn link_account(mut self, account: NanoAccount) -> Self {
        self.link_account = Some(account);
        self
    }

    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn work(mut self, work: WorkSolution) -> Self {
        self.work = Some(work);
        self
    }

    fn resolve_link(&self) -> Result<Link> {
        match (&self.link, &self.link_account) {
            (Some(link), Some(account)) => {
                if link.as_public_key() != *account.public_key() {
                    return Err(NanoError::format(format!(
                        "link {link} does not match link account {account}"
                    )));
                }
                Ok(*link)
            }
            (Some(link), None) => Ok(*link),
            (None, Some(account)) => Ok(Link::from(*account.public_key())),
            (None, None) => Ok(Link::zero()),
        }
    }

    fn unsigned(&self) -> Result<Unsigned> {
        let account = self.account.clone().ok_or_else(|| missing("account"))?;
        let previous = self.previous.ok_or_else(|| missing("previous"))?;
        let representative = self
            .representative
            .clone()
            .ok_or_else(|| missing("representative"))?;
        let balance = self.balance.ok_or_else(|| missing("balance"))?;
        let link = self.resolve_link()?;

        let balance_bytes = balance.to_be_bytes();
        let hash = hash_fields(&layout(
            account.public_key(),
            &previous,
            representative.public_key(),
            &balance_bytes,
            &link,
        ));

        Ok(Unsigned {
            subtype: self.subtype,
            account,
            previous,
            representative,
            balance,
            link,
            hash,
        })
    }

    /// The hash the finished block will have
    pub fn hash(&self) -> Result<BlockHash> {
        Ok(self.unsigned()?.hash)
    }

    /// Finish a block whose signature and work were supplied
    pub fn build(self) -> Result<StateBlock> {
        let signature = self.signature.ok_or_else(|| missing("signature"))?;
        let work = self.work.ok_or_else(|| missing("work"))?;
        Ok(self.unsigned()?.finish(signature, work))
    }

    /// Finish the block by signing its hash with `key`, which must belong
    /// to the block's account
    pub fn sign(self, key: &PrivateKey, work: WorkSolution) -> Result<StateBlock> {
        let unsigned = self.unsigned()?;
        if key.public_key() != *unsigned.account.public_key() {
            return Err(NanoError::Crypto(format!(
                "signing key does not belong to {}",
                unsigned.account
            )));
        }
        let signature = key.sign(&[unsigned.hash.as_bytes()]);
        Ok(unsigned.finish(signature, work))
    }
}

impl Unsigned {
    fn finish(self, signature: Signature, work: WorkSolution) -> StateBlock {
        StateBlock {
            subtype: self.subtype,
            account: self.account,
            previous: self.previous,
            representative: self.representative,
            balance: self.balance,
            link: self.link,
            hash: self.hash,
            signature,
            work,
        }
    }
}

fn missing(field: &str) -> NanoError {
    NanoError::format(format!("state block is missing '{field}'"))
}

#[derive(Serialize)]
struct StateBlockJson<'a> {
    #[serde(rename = "type")]
    block_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtype: Option<StateBlockSubtype>,
    account: &'a NanoAccount,
    previous: &'a BlockHash,
    representative: &'a NanoAccount,
    balance: String,
    link: &'a Link,
    link_as_account: NanoAccount,
    signature: &'a Signature,
    work: &'a WorkSolution,
}

#[derive(Deserialize)]
struct StateBlockWire {
    #[serde(default)]
    subtype: Option<StateBlockSubtype>,
    account: NanoAccount,
    previous: BlockHash,
    representative: NanoAccount,
    balance: String,
    #[serde(default)]
    link: Option<Link>,
    #[serde(default)]
    link_as_account: Option<NanoAccount>,
    signature: Signature,
    work: WorkSolution,
}

impl Serialize for StateBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        StateBlockJson {
            block_type: BlockType::State.name(),
            subtype: self.subtype,
            account: &self.account,
            previous: &self.previous,
            representative: &self.representative,
            balance: self.balance.to_string(),
            link: &self.link,
            link_as_account: self.link_as_account(),
            signature: &self.signature,
            work: &self.work,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::fixtures::*;
    use serde_json::json;

    const STATE_HASH: &str = "FBAACEDE08B25AF127410B4386ACC5A1AF194DF7BA9DA5471F01F890D8DCB576";
    const STATE_SIGNATURE: &str = "3D016C37A8D469F8A1E597958098EB5EDA1063287659CED351B3F9BDB53285A5\
                                   A6AE3D1AD4077843772C9FAE22874834E380B316C3E01010E605F73E21200E07";

    #[test]
    fn test_preamble() {
        assert_eq!(STATE_BLOCK_PREAMBLE[31], 6);
        assert!(STATE_BLOCK_PREAMBLE[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_hash_and_signature_vectors() {
        let block = state_block();
        assert_eq!(block.hash().to_hex(), STATE_HASH);
        assert_eq!(block.signature().to_hex(), STATE_SIGNATURE);
        assert_eq!(block.hashable_bytes().len(), 32 * 5 + 16);
    }

    #[test]
    fn test_hash_ignores_signature_work_and_subtype() {
        let signed = state_block();
        let other = StateBlock::builder()
            .subtype(StateBlockSubtype::Epoch)
            .account(account())
            .previous(previous())
            .representative(representative())
            .balance(BALANCE)
            .link(link())
            .signature(Signature::zero())
            .work(WorkSolution::from_u64(1))
            .build()
            .unwrap();
        assert_eq!(signed.hash(), other.hash());
        assert_ne!(signed, other);
    }

    #[test]
    fn test_opening_block_uses_account_as_work_root() {
        let block = StateBlock::builder()
            .account(account())
            .previous(BlockHash::zero())
            .representative(representative())
            .balance(BALANCE)
            .link(link())
            .sign(&private_key(), work())
            .unwrap();
        assert!(block.is_opening());
        assert_eq!(
            block.hash().to_hex(),
            "FA7E6CF243D14B53368C6672533082D6F71B38CB80AC03159B764D94057838D3"
        );
        assert_eq!(block.work_root(), WorkRoot::from(*account().public_key()));
    }

    #[test]
    fn test_unused_link_defaults_to_zero() {
        let block = StateBlock::builder()
            .account(account())
            .previous(previous())
            .representative(representative())
            .balance(BALANCE)
            .sign(&private_key(), work())
            .unwrap();
        assert!(block.link().is_zero());
        assert_eq!(
            block.hash().to_hex(),
            "7065DF77B34FEBD0DBD48AEAA5ECE370B827625EC6A85EBF34BAB10FDDEC2F8E"
        );
    }

    #[test]
    fn test_link_from_account_form() {
        let link_account = NanoAccount::parse(LINK_ACCOUNT).unwrap();
        let builder = StateBlock::builder()
            .account(account())
            .previous(previous())
            .representative(representative())
            .balance(BALANCE);
        let by_account = builder
            .clone()
            .link_account(link_account.clone())
            .hash()
            .unwrap();
        let by_both = builder
            .clone()
            .link(link())
            .link_account(link_account)
            .hash()
            .unwrap();
        assert_eq!(by_account.to_hex(), STATE_HASH);
        assert_eq!(by_both, by_account);

        let conflicting = builder
            .link(link())
            .link_account(representative())
            .hash()
            .unwrap_err();
        assert!(conflicting.is_format());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let err = StateBlock::builder()
            .account(account())
            .balance(1)
            .hash()
            .unwrap_err();
        assert!(err.to_string().contains("previous"));

        let unsigned = StateBlock::builder()
            .account(account())
            .previous(previous())
            .representative(representative())
            .balance(1)
            .build()
            .unwrap_err();
        assert!(unsigned.to_string().contains("signature"));
    }

    #[test]
    fn test_sign_requires_matching_key() {
        let err = StateBlock::builder()
            .account(representative())
            .previous(previous())
            .representative(representative())
            .balance(1)
            .sign(&private_key(), work())
            .unwrap_err();
        assert!(matches!(err, NanoError::Crypto(_)));
    }

    #[test]
    fn test_json_wire_form() {
        let value = serde_json::to_value(state_block()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "state",
                "subtype": "send",
                "account": ACCOUNT,
                "previous": PREVIOUS,
                "representative": REPRESENTATIVE,
                "balance": "1000000000000000000000000000000",
                "link": LINK,
                "link_as_account": LINK_ACCOUNT,
                "signature": STATE_SIGNATURE,
                "work": "7202df8a7c380578",
            })
        );
    }

    #[test]
    fn test_parse_from_json() {
        let value = serde_json::to_value(state_block()).unwrap();
        let parsed = StateBlock::from_json_value(&value).unwrap();
        assert_eq!(parsed, state_block());

        let mut without_link = value.clone();
        without_link.as_object_mut().unwrap().remove("link");
        assert_eq!(StateBlock::from_json_value(&without_link).unwrap(), state_block());
    }

    #[test]
    fn test_parse_rejects_bad_balance() {
        let mut value = serde_json::to_value(state_block()).unwrap();
        value["balance"] = json!("0x10");
        assert!(StateBlock::from_json_value(&value).unwrap_err().is_format());
    }

    #[test]
    fn test_subtype_from_legacy() {
        assert_eq!(
            StateBlockSubtype::from_legacy(BlockType::Send),
            Some(StateBlockSubtype::Send)
        );
        assert_eq!(
            StateBlockSubtype::from_legacy(BlockType::Open),
            Some(StateBlockSubtype::Receive)
        );
        assert_eq!(
            StateBlockSubtype::from_legacy(BlockType::Receive),
            Some(StateBlockSubtype::Receive)
        );
        assert_eq!(
            StateBlockSubtype::from_legacy(BlockType::Change),
            Some(StateBlockSubtype::Change)
        );
        assert_eq!(StateBlockSubtype::from_legacy(BlockType::State), None);
    }
}
