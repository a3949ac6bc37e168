//! Category taxonomies for histogram collections.
//!
//! Each collection served by `/charts/histogram/{collection}` reports bucket
//! counts per type tag (`message_confirmed`, `token_transfer`, ...). A
//! [`CategoryMap`] folds those tags into a handful of chart categories, each with
//! a display color and a readable name for the tag.
//!
//! Maps are plain values: build one per collection at startup with
//! [`Collection::category_map`] and pass it by reference.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::fmt;

/// Chart category a type tag belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDescriptor {
    pub category: String,
    /// `#rrggbb`
    pub color: String,
    pub nicename: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    name: String,
    entries: HashMap<String, CategoryDescriptor>,
    categories: Vec<String>,
    colors: HashMap<String, String>,
}

impl CategoryMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a tag. The category joins the zero-initialised set the first time it
    /// is seen, and its first color wins.
    pub fn with_entry(mut self, tag: &str, category: &str, color: &str, nicename: &str) -> Self {
        if !self.categories.iter().any(|c| c == category) {
            self.categories.push(category.to_string());
            self.colors.insert(category.to_string(), color.to_string());
        }
        self.entries.insert(
            tag.to_string(),
            CategoryDescriptor {
                category: category.to_string(),
                color: color.to_string(),
                nicename: nicename.to_string(),
            },
        );
        self
    }

    /// Register a category with no tags (used by flat collections).
    pub fn with_category(mut self, category: &str, color: &str) -> Self {
        if !self.categories.iter().any(|c| c == category) {
            self.categories.push(category.to_string());
            self.colors.insert(category.to_string(), color.to_string());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, tag: &str) -> Option<&CategoryDescriptor> {
        self.entries.get(tag)
    }

    /// Categories in insertion order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn color_of(&self, category: &str) -> Option<&str> {
        self.colors.get(category).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Readable names of the tags folded into `category`, sorted.
    pub fn nicenames_in(&self, category: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .values()
            .filter(|d| d.category == category)
            .map(|d| d.nicename.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

// Palette
const BLOCKCHAIN: &str = "#6F67D8";
const MESSAGES: &str = "#E3A33F";
const TOKENS: &str = "#4FBEB4";
const OFF_CHAIN: &str = "#C35C8F";
const BROADCAST: &str = "#5E8AD5";
const PRIVATE: &str = "#D56A5E";

pub const CAT_BLOCKCHAIN: &str = "Blockchain";
pub const CAT_MESSAGES: &str = "Messages";
pub const CAT_TOKENS: &str = "Tokens";
pub const CAT_OFF_CHAIN: &str = "Off-Chain";
pub const CAT_BROADCAST: &str = "Broadcast";
pub const CAT_PRIVATE: &str = "Private";
pub const CAT_BLOCKCHAIN_EVENTS: &str = "Blockchain Events";

/// Histogram collections exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    BlockchainEvents,
    Events,
    Messages,
    Operations,
    Transactions,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Events,
        Collection::Messages,
        Collection::Operations,
        Collection::Transactions,
        Collection::BlockchainEvents,
    ];

    /// Collection name in the REST path.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Collection::BlockchainEvents => "blockchainevents",
            Collection::Events => "events",
            Collection::Messages => "messages",
            Collection::Operations => "operations",
            Collection::Transactions => "transactions",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Collection::BlockchainEvents => "Blockchain Events",
            Collection::Events => "Events",
            Collection::Messages => "Messages",
            Collection::Operations => "Operations",
            Collection::Transactions => "Transactions",
        }
    }

    /// Buckets carry a single `count` instead of per-type counts.
    pub fn is_flat(&self) -> bool {
        matches!(self, Collection::BlockchainEvents)
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn category_map(&self) -> CategoryMap {
        match self {
            Collection::BlockchainEvents => blockchain_event_map(),
            Collection::Events => event_map(),
            Collection::Messages => message_map(),
            Collection::Operations => operation_map(),
            Collection::Transactions => transaction_map(),
        }
    }
}

impl std::str::FromStr for Collection {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "blockchainevents" | "blockchain" | "bcevents" => Ok(Collection::BlockchainEvents),
            "events" | "event" => Ok(Collection::Events),
            "messages" | "message" | "msgs" => Ok(Collection::Messages),
            "operations" | "operation" | "ops" => Ok(Collection::Operations),
            "transactions" | "transaction" | "txs" | "tx" => Ok(Collection::Transactions),
            _ => Err(anyhow!(
                "Invalid collection '{s}'. Valid options: events, messages, operations, \
                 transactions, blockchainevents"
            )),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// One category map per collection, built once at startup.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    maps: HashMap<Collection, CategoryMap>,
}

impl Taxonomy {
    pub fn canonical() -> Self {
        Self {
            maps: Collection::ALL
                .iter()
                .map(|c| (*c, c.category_map()))
                .collect(),
        }
    }

    pub fn map(&self, collection: Collection) -> &CategoryMap {
        // canonical() fills every collection
        &self.maps[&collection]
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::canonical()
    }
}

pub fn blockchain_event_map() -> CategoryMap {
    CategoryMap::new("blockchainevents").with_category(CAT_BLOCKCHAIN_EVENTS, BLOCKCHAIN)
}

pub fn event_map() -> CategoryMap {
    CategoryMap::new("events")
        .with_entry(
            "blockchain_event_received",
            CAT_BLOCKCHAIN,
            BLOCKCHAIN,
            "Blockchain Event Received",
        )
        .with_entry(
            "blockchain_invoke_op_succeeded",
            CAT_BLOCKCHAIN,
            BLOCKCHAIN,
            "Blockchain Invoke Succeeded",
        )
        .with_entry(
            "blockchain_invoke_op_failed",
            CAT_BLOCKCHAIN,
            BLOCKCHAIN,
            "Blockchain Invoke Failed",
        )
        .with_entry(
            "blockchain_contract_deploy_op_succeeded",
            CAT_BLOCKCHAIN,
            BLOCKCHAIN,
            "Contract Deploy Succeeded",
        )
        .with_entry(
            "blockchain_contract_deploy_op_failed",
            CAT_BLOCKCHAIN,
            BLOCKCHAIN,
            "Contract Deploy Failed",
        )
        .with_entry(
            "contract_interface_confirmed",
            CAT_BLOCKCHAIN,
            BLOCKCHAIN,
            "Contract Interface Confirmed",
        )
        .with_entry("contract_api_confirmed", CAT_BLOCKCHAIN, BLOCKCHAIN, "Contract API Confirmed")
        .with_entry("transaction_submitted", CAT_BLOCKCHAIN, BLOCKCHAIN, "Transaction Submitted")
        .with_entry("message_confirmed", CAT_MESSAGES, MESSAGES, "Message Confirmed")
        .with_entry("message_rejected", CAT_MESSAGES, MESSAGES, "Message Rejected")
        .with_entry("datatype_confirmed", CAT_MESSAGES, MESSAGES, "Datatype Confirmed")
        .with_entry("identity_confirmed", CAT_MESSAGES, MESSAGES, "Identity Confirmed")
        .with_entry("identity_updated", CAT_MESSAGES, MESSAGES, "Identity Updated")
        .with_entry("namespace_confirmed", CAT_MESSAGES, MESSAGES, "Namespace Confirmed")
        .with_entry("group_confirmed", CAT_MESSAGES, MESSAGES, "Group Confirmed")
        .with_entry("token_pool_confirmed", CAT_TOKENS, TOKENS, "Token Pool Confirmed")
        .with_entry("token_pool_op_failed", CAT_TOKENS, TOKENS, "Token Pool Failed")
        .with_entry("token_transfer_confirmed", CAT_TOKENS, TOKENS, "Token Transfer Confirmed")
        .with_entry("token_transfer_op_failed", CAT_TOKENS, TOKENS, "Token Transfer Failed")
        .with_entry("token_approval_confirmed", CAT_TOKENS, TOKENS, "Token Approval Confirmed")
        .with_entry("token_approval_op_failed", CAT_TOKENS, TOKENS, "Token Approval Failed")
}

pub fn message_map() -> CategoryMap {
    CategoryMap::new("messages")
        .with_entry("broadcast", CAT_BROADCAST, BROADCAST, "Broadcast")
        .with_entry("definition", CAT_BROADCAST, BROADCAST, "Definition")
        .with_entry("transfer_broadcast", CAT_BROADCAST, BROADCAST, "Transfer Broadcast")
        .with_entry("private", CAT_PRIVATE, PRIVATE, "Private")
        .with_entry("groupinit", CAT_PRIVATE, PRIVATE, "Group Init")
        .with_entry("transfer_private", CAT_PRIVATE, PRIVATE, "Transfer Private")
}

pub fn operation_map() -> CategoryMap {
    CategoryMap::new("operations")
        .with_entry("blockchain_pin_batch", CAT_BLOCKCHAIN, BLOCKCHAIN, "Blockchain Pin Batch")
        .with_entry(
            "blockchain_network_action",
            CAT_BLOCKCHAIN,
            BLOCKCHAIN,
            "Blockchain Network Action",
        )
        .with_entry("blockchain_deploy", CAT_BLOCKCHAIN, BLOCKCHAIN, "Blockchain Deploy")
        .with_entry("blockchain_invoke", CAT_BLOCKCHAIN, BLOCKCHAIN, "Blockchain Invoke")
        .with_entry("dataexchange_send_batch", CAT_OFF_CHAIN, OFF_CHAIN, "Data Exchange Send Batch")
        .with_entry("dataexchange_send_blob", CAT_OFF_CHAIN, OFF_CHAIN, "Data Exchange Send Blob")
        .with_entry(
            "sharedstorage_upload_batch",
            CAT_OFF_CHAIN,
            OFF_CHAIN,
            "Shared Storage Upload Batch",
        )
        .with_entry(
            "sharedstorage_upload_blob",
            CAT_OFF_CHAIN,
            OFF_CHAIN,
            "Shared Storage Upload Blob",
        )
        .with_entry(
            "sharedstorage_upload_value",
            CAT_OFF_CHAIN,
            OFF_CHAIN,
            "Shared Storage Upload Value",
        )
        .with_entry(
            "sharedstorage_download_batch",
            CAT_OFF_CHAIN,
            OFF_CHAIN,
            "Shared Storage Download Batch",
        )
        .with_entry(
            "sharedstorage_download_blob",
            CAT_OFF_CHAIN,
            OFF_CHAIN,
            "Shared Storage Download Blob",
        )
        .with_entry("token_create_pool", CAT_TOKENS, TOKENS, "Token Create Pool")
        .with_entry("token_activate_pool", CAT_TOKENS, TOKENS, "Token Activate Pool")
        .with_entry("token_transfer", CAT_TOKENS, TOKENS, "Token Transfer")
        .with_entry("token_approval", CAT_TOKENS, TOKENS, "Token Approval")
}

pub fn transaction_map() -> CategoryMap {
    CategoryMap::new("transactions")
        .with_entry("batch_pin", CAT_BLOCKCHAIN, BLOCKCHAIN, "Batch Pin")
        .with_entry("network_action", CAT_BLOCKCHAIN, BLOCKCHAIN, "Network Action")
        .with_entry("contract_deploy", CAT_BLOCKCHAIN, BLOCKCHAIN, "Contract Deploy")
        .with_entry("contract_invoke", CAT_BLOCKCHAIN, BLOCKCHAIN, "Contract Invoke")
        .with_entry("contract_invoke_pin", CAT_BLOCKCHAIN, BLOCKCHAIN, "Contract Invoke Pin")
        .with_entry("unpinned", CAT_OFF_CHAIN, OFF_CHAIN, "Unpinned")
        .with_entry("data_publish", CAT_OFF_CHAIN, OFF_CHAIN, "Data Publish")
        .with_entry("token_pool", CAT_TOKENS, TOKENS, "Token Pool")
        .with_entry("token_transfer", CAT_TOKENS, TOKENS, "Token Transfer")
        .with_entry("token_approval", CAT_TOKENS, TOKENS, "Token Approval")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_parsing() {
        assert_eq!("events".parse::<Collection>().unwrap(), Collection::Events);
        assert_eq!("OPS".parse::<Collection>().unwrap(), Collection::Operations);
        assert_eq!(
            "blockchain-events".parse::<Collection>().unwrap(),
            Collection::BlockchainEvents
        );
        assert_eq!("tx".parse::<Collection>().unwrap(), Collection::Transactions);
        assert!("wallets".parse::<Collection>().is_err());
    }

    #[test]
    fn test_collection_cycle_visits_all() {
        let mut c = Collection::Events;
        let mut seen = vec![c];
        for _ in 0..Collection::ALL.len() - 1 {
            c = c.next();
            seen.push(c);
        }
        assert_eq!(c.next(), Collection::Events);
        for col in Collection::ALL {
            assert!(seen.contains(&col));
        }
    }

    #[test]
    fn test_category_order_and_colors() {
        let map = event_map();
        assert_eq!(map.categories(), &["Blockchain", "Messages", "Tokens"]);
        assert_eq!(map.color_of(CAT_TOKENS), Some(TOKENS));
        assert_eq!(map.get("message_confirmed").unwrap().category, CAT_MESSAGES);
        assert!(map.get("not_a_tag").is_none());
    }

    #[test]
    fn test_every_tag_maps_into_the_category_set() {
        for col in Collection::ALL {
            let map = col.category_map();
            assert!(!map.categories().is_empty(), "{col} has no categories");
            for cat in map.categories() {
                let color = map.color_of(cat).unwrap();
                assert!(color.starts_with('#') && color.len() == 7);
            }
            if col.is_flat() {
                assert!(map.is_empty());
            } else {
                assert!(!map.is_empty());
            }
        }
    }

    #[test]
    fn test_nicenames_grouped_by_category() {
        let map = message_map();
        assert_eq!(
            map.nicenames_in(CAT_PRIVATE),
            vec!["Group Init", "Private", "Transfer Private"]
        );
        assert_eq!(map.nicenames_in(CAT_BROADCAST).len(), 3);
        assert!(map.nicenames_in(CAT_TOKENS).is_empty());
        assert!(blockchain_event_map().nicenames_in(CAT_BLOCKCHAIN_EVENTS).is_empty());
    }
}
