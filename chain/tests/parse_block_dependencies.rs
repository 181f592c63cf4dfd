// Copyright 2018 The Bsq Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::sync::Arc;

use chain_test_helper::{new_chain, tx, CollectingAdapter, MemorySource};

use bsq_core::core::{TxId, TxOutputKey};

const GENESIS_HEIGHT: u32 = 100;
const GENESIS_TX: &str = "gen";

fn setup() -> (Arc<MemorySource>, Arc<CollectingAdapter>, bsq_chain::Chain) {
	let _ = env_logger::try_init();
	let source = Arc::new(MemorySource::new());
	let adapter = Arc::new(CollectingAdapter::new());
	let chain = new_chain(source.clone(), adapter.clone(), GENESIS_HEIGHT, GENESIS_TX);
	(source, adapter, chain)
}

#[test]
fn sibling_chain_classified_in_dependency_order() {
	let (source, adapter, chain) = setup();
	source.add_block(
		100,
		"h100",
		"h99",
		vec![tx(GENESIS_TX, 100, &[("btc", 0)], &[1000])],
	);
	// "child" precedes its in-block producer "parent" in chain order
	source.add_block(
		101,
		"h101",
		"h100",
		vec![
			tx("child", 101, &[("parent", 0)], &[250]),
			tx("parent", 101, &[(GENESIS_TX, 0)], &[400, 600]),
		],
	);

	chain.parse_blocks(100, 101).unwrap();

	let accepted = adapter.accepted_blocks();
	let order: Vec<TxId> = accepted[1].txs.iter().map(|t| t.id.clone()).collect();
	assert_eq!(order, vec![TxId::from("parent"), TxId::from("child")]);

	// the child spent parent:0 (400) into a 250 output, burning the rest
	assert_eq!(chain.get_spendable_tx_output(&TxId::from("parent"), 0), None);
	assert_eq!(
		chain
			.get_spendable_tx_output(&TxId::from("parent"), 1)
			.map(|o| o.value),
		Some(600)
	);
	assert_eq!(
		chain
			.get_spendable_tx_output(&TxId::from("child"), 0)
			.map(|o| o.value),
		Some(250)
	);
	assert_eq!(chain.get_burned_fee(&TxId::from("child")), Some(150));
}

#[test]
fn dependent_on_plain_sibling_stays_plain() {
	let (source, adapter, chain) = setup();
	source.add_block(
		100,
		"h100",
		"h99",
		vec![tx(GENESIS_TX, 100, &[("btc", 0)], &[1000])],
	);
	// "plain" carries no token value, so neither does its dependent
	source.add_block(
		101,
		"h101",
		"h100",
		vec![
			tx("spender", 101, &[("plain", 0)], &[77]),
			tx("plain", 101, &[("unknown", 5)], &[123]),
		],
	);

	chain.parse_blocks(100, 101).unwrap();

	assert!(!chain.contains_tx(&TxId::from("plain")));
	assert!(!chain.contains_tx(&TxId::from("spender")));
	assert!(adapter.accepted_blocks()[1].txs.is_empty());
	assert_eq!(chain.head_height(), Some(101));
}

#[test]
fn doubly_referenced_output_goes_to_first_spender() {
	let (source, _adapter, chain) = setup();
	source.add_block(
		100,
		"h100",
		"h99",
		vec![tx(GENESIS_TX, 100, &[("btc", 0)], &[1000])],
	);
	source.add_block(
		101,
		"h101",
		"h100",
		vec![
			tx("first", 101, &[(GENESIS_TX, 0)], &[1000]),
			tx("second", 101, &[(GENESIS_TX, 0)], &[1000]),
		],
	);

	chain.parse_blocks(100, 101).unwrap();

	assert!(chain.contains_tx(&TxId::from("first")));
	assert!(!chain.contains_tx(&TxId::from("second")));

	let state = chain.snapshot();
	let key = TxOutputKey::new(TxId::from(GENESIS_TX), 0);
	assert_eq!(state.get_spent_info(&key).unwrap().tx_id, TxId::from("first"));
}

#[test]
fn chained_siblings_resolve_over_multiple_passes() {
	let (source, adapter, chain) = setup();
	source.add_block(
		100,
		"h100",
		"h99",
		vec![tx(GENESIS_TX, 100, &[("btc", 0)], &[1000])],
	);
	// a -> b -> c within one block, listed in reverse order
	source.add_block(
		101,
		"h101",
		"h100",
		vec![
			tx("c", 101, &[("b", 0)], &[800]),
			tx("b", 101, &[("a", 0)], &[900]),
			tx("a", 101, &[(GENESIS_TX, 0)], &[1000]),
		],
	);

	chain.parse_blocks(100, 101).unwrap();

	let order: Vec<TxId> = adapter.accepted_blocks()[1]
		.txs
		.iter()
		.map(|t| t.id.clone())
		.collect();
	assert_eq!(
		order,
		vec![TxId::from("a"), TxId::from("b"), TxId::from("c")]
	);
	assert_eq!(
		chain
			.get_spendable_tx_output(&TxId::from("c"), 0)
			.map(|o| o.value),
		Some(800)
	);
	assert_eq!(chain.get_burned_fee(&TxId::from("b")), Some(100));
	assert_eq!(chain.get_burned_fee(&TxId::from("c")), Some(100));
	assert_eq!(chain.total_burned_fee(), 200);
}
