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

//! Implementation of the token block acceptance (or refusal) pipeline.

use std::collections::HashSet;

use bsq_core::core::{BlockHash, BsqBlock, SpentInfo, Tx, TxId};
use bsq_core::global;

use crate::error::{Error, ErrorKind};
use crate::store::{Batch, BsqChainState};
use crate::types::Options;

/// Contextual information required to process a new block and either
/// reject or accept it.
pub struct BlockContext<'a> {
	/// Processing options
	pub opts: Options,
	/// Height the genesis tx is expected at
	pub genesis_height: u32,
	/// Id of the genesis tx
	pub genesis_tx_id: TxId,
	/// Chain state consulted during classification and mutated on accept
	pub state: &'a mut BsqChainState,
}

// block processing stages
// 1. does the block connect to our tip (otherwise it is an orphan)
// 2. pick out the genesis tx if this is the genesis height
// 3. classify the remaining txs, deferring intra-block dependents
// 4. commit the staged state and the block record together

/// Runs one block through classification and commits the result. Returns
/// the accepted token view of the block.
pub fn process_block(
	height: u32,
	hash: &BlockHash,
	previous_hash: &BlockHash,
	txs: Vec<Tx>,
	ctx: &mut BlockContext<'_>,
) -> Result<BsqBlock, Error> {
	if !ctx.state.is_block_connecting(previous_hash) {
		debug!(
			"process_block: block {} at height {} does not connect to our tip",
			hash, height
		);
		return Err(ErrorKind::Orphan(height).into());
	}

	let mut batch = Batch::new(&*ctx.state);
	let mut accepted = vec![];

	let mut candidates = Vec::with_capacity(txs.len());
	for tx in txs {
		if height == ctx.genesis_height && tx.id == ctx.genesis_tx_id {
			parse_genesis_tx(&tx, &mut batch)?;
			accepted.push(tx);
		} else {
			candidates.push(tx);
		}
	}

	parse_txs(candidates, height, &mut batch, &mut accepted)?;

	let delta = batch.into_delta();
	let block = BsqBlock::new(height, hash.clone(), previous_hash.clone(), accepted);
	ctx.state.apply_block(block.clone(), delta)?;

	if ctx.opts.contains(Options::SYNC) {
		debug!(
			"process_block: committed block {} at height {}, {} token txs",
			block.hash,
			block.height,
			block.txs.len()
		);
	} else {
		info!(
			"process_block: committed block {} at height {}, {} token txs",
			block.hash,
			block.height,
			block.txs.len()
		);
	}
	Ok(block)
}

/// The genesis tx is token value by definition: every output is verified
/// at full face value, the input rule never applies.
fn parse_genesis_tx(tx: &Tx, batch: &mut Batch<'_>) -> Result<(), Error> {
	batch.set_genesis_tx(tx.clone())?;
	batch.add_tx(tx.clone());
	for output in &tx.outputs {
		batch.add_verified_tx_output(output.clone());
	}
	info!(
		"parse_genesis_tx: genesis tx {} with {} outputs, supply {}",
		tx.id,
		tx.outputs.len(),
		tx.output_value()
	);
	Ok(())
}

/// Classifies all candidate txs of one block. A tx consuming an output
/// created by another tx in the same block cannot be classified before its
/// producer, so such txs are deferred and the worklist is swept again
/// until it drains.
fn parse_txs(
	txs: Vec<Tx>,
	block_height: u32,
	batch: &mut Batch<'_>,
	accepted: &mut Vec<Tx>,
) -> Result<(), Error> {
	let mut remaining = txs;
	let mut depth = 0;

	while !remaining.is_empty() {
		depth += 1;
		if depth > global::max_block_recursions() {
			let msg = format!(
				"unresolvable tx dependencies at height {}: {} txs left after {} passes",
				block_height,
				remaining.len(),
				depth - 1
			);
			error!("parse_txs: {}", msg);
			return Err(ErrorKind::InvariantViolation(msg).into());
		}
		if depth > global::WARN_RECURSION_DEPTH {
			warn!(
				"parse_txs: pass {} at height {}, {} txs still deferred",
				depth,
				block_height,
				remaining.len()
			);
		}

		let total = remaining.len();
		let intra_block_ids = intra_block_spending_tx_ids(&remaining);
		let mut ready = Vec::with_capacity(total);
		let mut deferred = vec![];
		for tx in remaining {
			let waits_on_sibling = tx
				.inputs
				.iter()
				.any(|input| intra_block_ids.contains(&input.spending_tx_id));
			if waits_on_sibling {
				deferred.push(tx);
			} else {
				ready.push(tx);
			}
		}
		if ready.len() + deferred.len() != total {
			let msg = format!(
				"tx partition mismatch at height {}: {} + {} != {}",
				block_height,
				ready.len(),
				deferred.len(),
				total
			);
			error!("parse_txs: {}", msg);
			return Err(ErrorKind::InvariantViolation(msg).into());
		}

		for tx in ready {
			parse_tx(tx, block_height, batch, accepted);
		}
		remaining = deferred;
	}
	Ok(())
}

/// The coloring rule. Token value accumulates from spendable inputs in
/// declared order and is assigned to outputs by ascending index until it
/// runs out; the walk stops at the first output it cannot fund. Whatever
/// remains unassigned is burned as an implicit fee.
fn parse_tx(tx: Tx, block_height: u32, batch: &mut Batch<'_>, accepted: &mut Vec<Tx>) {
	let mut available: u64 = 0;
	for (input_index, input) in tx.inputs.iter().enumerate() {
		if let Some(spent_output) =
			batch.get_spendable_tx_output(&input.spending_tx_id, input.spending_output_index)
		{
			available += spent_output.value;
			let spent_info = SpentInfo::new(block_height, tx.id.clone(), input_index as u32);
			batch.add_spent_tx_with_spent_info(spent_output, spent_info);
		}
	}
	if available == 0 {
		trace!("parse_tx: tx {} carries no token value", tx.id);
		return;
	}

	batch.add_tx(tx.clone());
	for output in &tx.outputs {
		if available >= output.value {
			batch.add_verified_tx_output(output.clone());
			available -= output.value;
			if available == 0 {
				break;
			}
		} else {
			break;
		}
	}
	if available > 0 {
		debug!("parse_tx: tx {} burned {} in fees", tx.id, available);
		batch.add_burned_fee(tx.id.clone(), available);
	}
	accepted.push(tx);
}

/// Ids of txs in the given set that another tx of the same set consumes
/// an output of.
fn intra_block_spending_tx_ids(txs: &[Tx]) -> HashSet<TxId> {
	let block_tx_ids: HashSet<&TxId> = txs.iter().map(|tx| &tx.id).collect();
	let mut intra = HashSet::new();
	for tx in txs {
		for input in &tx.inputs {
			if input.spending_tx_id != tx.id && block_tx_ids.contains(&input.spending_tx_id) {
				intra.insert(input.spending_tx_id.clone());
			}
		}
	}
	intra
}
