//! Block deserializer registry
//!
//! Maps a `type` name to a parse function. A deserializer is built with
//! parsers for the five known variants and can be extended per instance;
//! there is no shared global table.

use crate::core::block::{
    Block, BlockType, ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, StateBlock,
};
use crate::error::{NanoError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Parses one block object whose `type` field has already been matched
pub type BlockParser = Arc<dyn Fn(&Value) -> Result<Block> + Send + Sync>;

#[derive(Clone)]
pub struct BlockDeserializer {
    parsers: HashMap<String, BlockParser>,
}

impl BlockDeserializer {
    /// A registry with no parsers at all
    pub fn empty() -> BlockDeserializer {
        BlockDeserializer {
            parsers: HashMap::new(),
        }
    }

    /// Add or replace the parser for `type_name`
    pub fn register<F>(&mut self, type_name: impl Into<String>, parser: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Block> + Send + Sync + 'static,
    {
        self.parsers.insert(type_name.into(), Arc::new(parser));
        self
    }

    pub fn supports(&self, type_name: &str) -> bool {
        self.parsers.contains_key(type_name)
    }

    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Parse a block object. A JSON string holding a serialized object is
    /// unwrapped first.
    pub fn deserialize_value(&self, value: &Value) -> Result<Block> {
        match value {
            Value::String(inner) => {
                let unwrapped: Value = serde_json::from_str(inner).map_err(|e| {
                    NanoError::format(format!("block string is not a JSON object: {e}"))
                })?;
                if !unwrapped.is_object() {
                    return Err(NanoError::format("block string is not a JSON object"));
                }
                self.dispatch(&unwrapped)
            }
            Value::Object(_) => self.dispatch(value),
            other => Err(NanoError::format(format!(
                "expected a block object, got {other}"
            ))),
        }
    }

    pub fn deserialize_str(&self, text: &str) -> Result<Block> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| NanoError::format(format!("invalid block JSON: {e}")))?;
        self.deserialize_value(&value)
    }

    fn dispatch(&self, value: &Value) -> Result<Block> {
        let type_name = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| NanoError::format("block is missing its 'type' field"))?;
        let parser = self
            .parsers
            .get(type_name)
            .ok_or_else(|| NanoError::format(format!("unrecognized block type '{type_name}'")))?;
        parser(value)
    }
}

impl Default for BlockDeserializer {
    fn default() -> Self {
        let mut registry = BlockDeserializer::empty();
        registry
            .register(BlockType::Send.name(), |v: &Value| {
                SendBlock::from_json_value(v).map(Block::from)
            })
            .register(BlockType::Receive.name(), |v: &Value| {
                ReceiveBlock::from_json_value(v).map(Block::from)
            })
            .register(BlockType::Open.name(), |v: &Value| {
                OpenBlock::from_json_value(v).map(Block::from)
            })
            .register(BlockType::Change.name(), |v: &Value| {
                ChangeBlock::from_json_value(v).map(Block::from)
            })
            .register(BlockType::State.name(), |v: &Value| {
                StateBlock::from_json_value(v).map(Block::from)
            });
        registry
    }
}

impl fmt::Debug for BlockDeserializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDeserializer")
            .field("types", &self.type_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::fixtures::*;
    use serde_json::json;

    #[test]
    fn test_default_registry_knows_all_types() {
        let registry = BlockDeserializer::default();
        assert_eq!(
            registry.type_names(),
            vec!["change", "open", "receive", "send", "state"]
        );
    }

    #[test]
    fn test_state_block_from_object() {
        let block = Block::from(state_block());
        let parsed = BlockDeserializer::default()
            .deserialize_value(&block.to_json_value().unwrap())
            .unwrap();
        assert_eq!(parsed, block);
    }

    #[test]
    fn test_double_encoded_block() {
        let block = Block::from(state_block());
        let wrapped = Value::String(block.to_json().unwrap());
        let parsed = BlockDeserializer::default()
            .deserialize_value(&wrapped)
            .unwrap();
        assert_eq!(parsed.hash(), block.hash());

        let text = serde_json::to_string(&wrapped).unwrap();
        let parsed = BlockDeserializer::default().deserialize_str(&text).unwrap();
        assert_eq!(parsed, block);
    }

    #[test]
    fn test_legacy_dispatch() {
        let change = ChangeBlock::sign(previous(), representative(), &private_key(), work());
        let parsed = BlockDeserializer::default()
            .deserialize_str(&Block::from(change.clone()).to_json().unwrap())
            .unwrap();
        assert_eq!(parsed, Block::Change(change));
    }

    #[test]
    fn test_unknown_type_is_named() {
        let err = BlockDeserializer::default()
            .deserialize_value(&json!({"type": "epoch_v9"}))
            .unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("epoch_v9"));
    }

    #[test]
    fn test_missing_type_and_non_objects() {
        let registry = BlockDeserializer::default();
        assert!(registry.deserialize_value(&json!({"previous": PREVIOUS})).is_err());
        assert!(registry.deserialize_value(&json!(42)).is_err());
        assert!(registry.deserialize_value(&json!("\"state\"")).is_err());
        assert!(registry.deserialize_str("{not json").is_err());
    }

    #[test]
    fn test_registration_extends_one_instance_only() {
        let mut custom = BlockDeserializer::empty();
        custom.register("alias", |v: &Value| StateBlock::from_json_value(v).map(Block::from));
        assert!(custom.supports("alias"));
        assert!(!custom.supports("state"));
        assert!(!BlockDeserializer::default().supports("alias"));

        let mut value = Block::from(state_block()).to_json_value().unwrap();
        value["type"] = json!("alias");
        let parsed = custom.deserialize_value(&value).unwrap();
        assert_eq!(parsed.block_type(), BlockType::State);
    }
}
