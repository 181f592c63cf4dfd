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

//! In-memory store of the parsed token chain: appended blocks, token txs,
//! verified outputs, spent records and burned fees.

use std::collections::HashMap;

use bsq_core::core::{BlockHash, BsqBlock, SpentInfo, Tx, TxId, TxOutput, TxOutputKey};

use crate::error::{Error, ErrorKind};
use crate::types::Tip;

/// Authoritative in-memory state of the token chain.
///
/// All mutation flows through the methods below. The parser stages one
/// block's worth of writes in a [`Batch`] and commits them in a single
/// [`apply_block`](BsqChainState::apply_block) call, so a block either
/// appears in full or not at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BsqChainState {
	blocks: Vec<BsqBlock>,
	tx_map: HashMap<TxId, Tx>,
	verified_output_map: HashMap<TxOutputKey, TxOutput>,
	spent_info_map: HashMap<TxOutputKey, SpentInfo>,
	burned_fee_map: HashMap<TxId, u64>,
	genesis_tx: Option<Tx>,
}

impl BsqChainState {
	/// Creates an empty chain state.
	pub fn new() -> BsqChainState {
		BsqChainState::default()
	}

	/// True iff no block has been appended yet or the most recently
	/// appended block's hash equals `previous_hash`.
	pub fn is_block_connecting(&self, previous_hash: &BlockHash) -> bool {
		match self.blocks.last() {
			None => true,
			Some(tip) => tip.hash == *previous_hash,
		}
	}

	/// Appends a fully parsed token block.
	pub fn add_block(&mut self, block: BsqBlock) -> Result<(), Error> {
		if !self.is_block_connecting(&block.previous_hash) {
			return Err(ErrorKind::ChainLinkage(format!(
				"block {} at height {} does not extend our tip",
				block.hash, block.height
			))
			.into());
		}
		self.blocks.push(block);
		Ok(())
	}

	/// Records the genesis tx. Idempotent for the same tx, a different one
	/// is a conflict.
	pub fn set_genesis_tx(&mut self, tx: Tx) -> Result<(), Error> {
		match self.genesis_tx {
			Some(ref existing) if existing.id != tx.id => Err(ErrorKind::GenesisConflict(
				format!("{} would replace {}", tx.id, existing.id),
			)
			.into()),
			_ => {
				self.genesis_tx = Some(tx);
				Ok(())
			}
		}
	}

	/// Records a token tx. Idempotent, the first record for an id wins.
	pub fn add_tx(&mut self, tx: Tx) {
		self.tx_map.entry(tx.id.clone()).or_insert(tx);
	}

	/// Marks an output as verified token value. Idempotent.
	pub fn add_verified_tx_output(&mut self, output: TxOutput) {
		self.verified_output_map.insert(output.key(), output);
	}

	/// Returns the output iff it is verified and no spent record exists
	/// against it.
	pub fn get_spendable_tx_output(&self, tx_id: &TxId, index: u32) -> Option<TxOutput> {
		let key = TxOutputKey::new(tx_id.clone(), index);
		if self.spent_info_map.contains_key(&key) {
			return None;
		}
		self.verified_output_map.get(&key).cloned()
	}

	/// Records the consumption of a verified output. The first record for
	/// an output wins.
	pub fn add_spent_tx_with_spent_info(&mut self, output: &TxOutput, spent_info: SpentInfo) {
		self.spent_info_map.entry(output.key()).or_insert(spent_info);
	}

	/// Records the token value a tx consumed without assigning it to any
	/// output. The amount must be positive.
	pub fn add_burned_fee(&mut self, tx_id: TxId, amount: u64) {
		debug_assert!(amount > 0);
		self.burned_fee_map.insert(tx_id, amount);
	}

	/// The tip of the chain, if any block has been appended.
	pub fn head(&self) -> Option<Tip> {
		self.blocks.last().map(Tip::from_block)
	}

	/// All appended blocks in height order.
	pub fn blocks(&self) -> &[BsqBlock] {
		&self.blocks
	}

	/// Appended blocks at or above the given height.
	pub fn blocks_from(&self, height: u32) -> Vec<BsqBlock> {
		self.blocks
			.iter()
			.filter(|b| b.height >= height)
			.cloned()
			.collect()
	}

	/// Number of appended blocks.
	pub fn block_count(&self) -> usize {
		self.blocks.len()
	}

	/// Number of recorded token txs.
	pub fn tx_count(&self) -> usize {
		self.tx_map.len()
	}

	/// The recorded genesis tx, if any.
	pub fn genesis_tx(&self) -> Option<&Tx> {
		self.genesis_tx.as_ref()
	}

	/// Looks up a recorded token tx.
	pub fn get_tx(&self, tx_id: &TxId) -> Option<&Tx> {
		self.tx_map.get(tx_id)
	}

	/// Whether a token tx with the given id has been recorded.
	pub fn contains_tx(&self, tx_id: &TxId) -> bool {
		self.tx_map.contains_key(tx_id)
	}

	/// The consumer of the given output, if it has been spent.
	pub fn get_spent_info(&self, key: &TxOutputKey) -> Option<&SpentInfo> {
		self.spent_info_map.get(key)
	}

	/// Fee burned by the given tx, if any.
	pub fn get_burned_fee(&self, tx_id: &TxId) -> Option<u64> {
		self.burned_fee_map.get(tx_id).cloned()
	}

	/// Total token value burned in fees across the whole chain.
	pub fn total_burned_fee(&self) -> u64 {
		self.burned_fee_map.values().sum()
	}

	/// Total face value of verified outputs that are still spendable.
	pub fn total_spendable_value(&self) -> u64 {
		self.verified_output_map
			.iter()
			.filter(|(key, _)| !self.spent_info_map.contains_key(key))
			.map(|(_, out)| out.value)
			.sum()
	}

	/// Commits one block's worth of staged mutations together with the
	/// block record itself.
	pub fn apply_block(&mut self, block: BsqBlock, delta: BlockDelta) -> Result<(), Error> {
		if !self.is_block_connecting(&block.previous_hash) {
			return Err(ErrorKind::ChainLinkage(format!(
				"cannot apply block {} at height {}, tip moved",
				block.hash, block.height
			))
			.into());
		}
		if let Some(genesis) = delta.genesis_tx {
			self.set_genesis_tx(genesis)?;
		}
		for tx in delta.txs {
			self.add_tx(tx);
		}
		for output in delta.verified_outputs {
			self.add_verified_tx_output(output);
		}
		for (output, spent_info) in delta.spent {
			self.add_spent_tx_with_spent_info(&output, spent_info);
		}
		for (tx_id, amount) in delta.burned_fees {
			self.add_burned_fee(tx_id, amount);
		}
		self.add_block(block)
	}
}

/// Staging area for the mutations of a single block.
///
/// Reads see both the staged writes and the base state, which is what
/// intra-block tx chains require. Nothing reaches the base state until the
/// batch is collapsed into a [`BlockDelta`]; dropping the batch discards
/// the staged writes.
pub struct Batch<'a> {
	base: &'a BsqChainState,
	txs: Vec<Tx>,
	genesis_tx: Option<Tx>,
	verified_output_map: HashMap<TxOutputKey, TxOutput>,
	spent_map: HashMap<TxOutputKey, (TxOutput, SpentInfo)>,
	burned_fees: Vec<(TxId, u64)>,
}

impl<'a> Batch<'a> {
	/// Creates an empty batch on top of the given base state.
	pub fn new(base: &'a BsqChainState) -> Batch<'a> {
		Batch {
			base,
			txs: vec![],
			genesis_tx: None,
			verified_output_map: HashMap::new(),
			spent_map: HashMap::new(),
			burned_fees: vec![],
		}
	}

	/// Returns the output iff it is verified (staged or committed) and no
	/// spent record exists against it in either layer.
	pub fn get_spendable_tx_output(&self, tx_id: &TxId, index: u32) -> Option<TxOutput> {
		let key = TxOutputKey::new(tx_id.clone(), index);
		if self.spent_map.contains_key(&key) {
			return None;
		}
		if let Some(output) = self.verified_output_map.get(&key) {
			return Some(output.clone());
		}
		self.base.get_spendable_tx_output(tx_id, index)
	}

	/// Stages a token tx. Like the base layer, the first record for an id
	/// wins.
	pub fn add_tx(&mut self, tx: Tx) {
		if !self.txs.iter().any(|t| t.id == tx.id) {
			self.txs.push(tx);
		}
	}

	/// Stages the genesis tx, checking both layers for a conflict.
	pub fn set_genesis_tx(&mut self, tx: Tx) -> Result<(), Error> {
		if let Some(existing) = self.base.genesis_tx() {
			if existing.id != tx.id {
				return Err(ErrorKind::GenesisConflict(format!(
					"{} would replace {}",
					tx.id, existing.id
				))
				.into());
			}
		}
		if let Some(ref staged) = self.genesis_tx {
			if staged.id != tx.id {
				return Err(ErrorKind::GenesisConflict(format!(
					"{} would replace {}",
					tx.id, staged.id
				))
				.into());
			}
		}
		self.genesis_tx = Some(tx);
		Ok(())
	}

	/// Stages an output as verified token value.
	pub fn add_verified_tx_output(&mut self, output: TxOutput) {
		self.verified_output_map.insert(output.key(), output);
	}

	/// Stages the consumption of a verified output.
	pub fn add_spent_tx_with_spent_info(&mut self, output: TxOutput, spent_info: SpentInfo) {
		let key = output.key();
		self.spent_map.entry(key).or_insert((output, spent_info));
	}

	/// Stages a burned fee.
	pub fn add_burned_fee(&mut self, tx_id: TxId, amount: u64) {
		debug_assert!(amount > 0);
		self.burned_fees.push((tx_id, amount));
	}

	/// Collapses the batch into the delta to commit, releasing the borrow
	/// on the base state.
	pub fn into_delta(self) -> BlockDelta {
		BlockDelta {
			txs: self.txs,
			genesis_tx: self.genesis_tx,
			verified_outputs: self.verified_output_map.into_iter().map(|(_, v)| v).collect(),
			spent: self.spent_map.into_iter().map(|(_, v)| v).collect(),
			burned_fees: self.burned_fees,
		}
	}
}

/// One block's worth of staged chain state mutations, ready to be
/// committed via [`BsqChainState::apply_block`].
#[derive(Debug)]
pub struct BlockDelta {
	txs: Vec<Tx>,
	genesis_tx: Option<Tx>,
	verified_outputs: Vec<TxOutput>,
	spent: Vec<(TxOutput, SpentInfo)>,
	burned_fees: Vec<(TxId, u64)>,
}
