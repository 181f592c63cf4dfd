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

use bsq_chain::ErrorKind;
use bsq_core::global;
use bsq_core::global::ParseMode;

const GENESIS_HEIGHT: u32 = 100;
const GENESIS_TX: &str = "gen";

// Mutates the process-wide parse parameters, so everything runs inside a
// single test fn.
#[test]
fn reference_cycle_exhausts_recursion_cap() {
	let _ = env_logger::try_init();
	global::set_max_block_recursions(5);
	global::set_parse_mode(ParseMode::Dev);

	let source = Arc::new(MemorySource::new());
	let adapter = Arc::new(CollectingAdapter::new());
	let chain = new_chain(source.clone(), adapter.clone(), GENESIS_HEIGHT, GENESIS_TX);

	source.add_block(
		100,
		"h100",
		"h99",
		vec![tx(GENESIS_TX, 100, &[("btc", 0)], &[1000])],
	);
	// two txs referencing each other never become ready
	source.add_block(
		101,
		"h101",
		"h100",
		vec![
			tx("a", 101, &[("b", 0)], &[10]),
			tx("b", 101, &[("a", 0)], &[10]),
		],
	);

	// dev mode: the violation surfaces and nothing of block 101 commits
	let res = chain.parse_blocks(100, 101);
	match res {
		Err(e) => match e.kind() {
			ErrorKind::InvariantViolation(_) => (),
			k => panic!("unexpected error kind {:?}", k),
		},
		Ok(_) => panic!("pathological block accepted"),
	}
	assert_eq!(chain.head_height(), Some(100));
	assert_eq!(chain.block_count(), 1);

	// production mode: the violation is swallowed, the sweep halts at the
	// last good block
	global::set_parse_mode(ParseMode::Production);
	chain.parse_blocks(101, 101).unwrap();
	assert_eq!(chain.head_height(), Some(100));

	global::set_parse_mode(ParseMode::Dev);
	global::set_max_block_recursions(global::DEFAULT_MAX_BLOCK_RECURSIONS);

	// a deep but acyclic chain still resolves under the default cap
	let mut deep = vec![];
	for i in 0..50 {
		let producer = if i == 0 {
			GENESIS_TX.to_string()
		} else {
			format!("d{}", i - 1)
		};
		deep.push(tx(&format!("d{}", i), 101, &[(producer.as_str(), 0)], &[1000]));
	}
	deep.reverse();
	source.add_block(101, "h101d", "h100", deep);
	chain.parse_blocks(101, 101).unwrap();
	assert_eq!(chain.head_height(), Some(101));
	assert_eq!(adapter.accepted_blocks().last().unwrap().txs.len(), 50);

	global::set_parse_mode(ParseMode::Production);
}
