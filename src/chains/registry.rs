use std::{collections::HashMap, str::FromStr};

use alloy::primitives::Address;

use crate::{config::ContractAddresses, errors::ChainError};

/// Deployed contract addresses for one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainContracts {
    pub chess_wager: Address,
    pub tournament: Address,
}

/// Chain id to contract addresses, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    chains: HashMap<u64, ChainContracts>,
}

impl ContractRegistry {
    pub fn from_entries(entries: &[ContractAddresses]) -> Result<Self, ChainError> {
        let mut chains = HashMap::with_capacity(entries.len());

        for entry in entries {
            let contracts = ChainContracts {
                chess_wager: parse_address(&entry.chess_wager)?,
                tournament: parse_address(&entry.tournament)?,
            };
            chains.insert(entry.chain_id, contracts);
        }

        Ok(Self { chains })
    }

    pub fn get(&self, chain_id: u64) -> Option<&ChainContracts> {
        self.chains.get(&chain_id)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

fn parse_address(value: &str) -> Result<Address, ChainError> {
    Address::from_str(value).map_err(|_| ChainError::InvalidAddress(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(chain_id: u64, chess_wager: &str, tournament: &str) -> ContractAddresses {
        ContractAddresses {
            chain_id,
            chess_wager: chess_wager.to_string(),
            tournament: tournament.to_string(),
        }
    }

    #[test]
    fn test_lookup_by_chain_id() {
        let registry = ContractRegistry::from_entries(&[
            entry(
                80001,
                "0x0000000000000000000000000000000000000001",
                "0x0000000000000000000000000000000000000002",
            ),
            entry(
                44787,
                "0x0000000000000000000000000000000000000003",
                "0x0000000000000000000000000000000000000004",
            ),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        let celo = registry.get(44787).unwrap();
        assert_eq!(celo.chess_wager, Address::with_last_byte(3));
        assert_eq!(celo.tournament, Address::with_last_byte(4));
        assert!(registry.get(1).is_none());
    }

    #[test]
    fn test_rejects_malformed_address() {
        let err = ContractRegistry::from_entries(&[entry(
            1,
            "0xnot-an-address",
            "0x0000000000000000000000000000000000000002",
        )])
        .unwrap_err();

        assert!(matches!(err, ChainError::InvalidAddress(addr) if addr == "0xnot-an-address"));
    }
}
