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

//! Facade and handler for the rest of the token chain implementation,
//! mostly the ingestion paths driving the block pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use bsq_core::core::{BlockHash, BsqBlock, RawBlock, Tx, TxId, TxOutput};
use bsq_core::global;

use crate::error::{Error, ErrorKind};
use crate::pipe::{self, BlockContext};
use crate::store::BsqChainState;
use crate::types::{BlockSource, ChainAdapter, Options, Tip};

/// Facade to the token chain pipeline and state. Provides the current view
/// of the verified output set according to the parsed chain.
///
/// A single worker drives the ingestion methods, strictly in height order.
/// Queries may be issued from other threads and serialize with the writer
/// through an internal lock.
pub struct Chain {
	source: Arc<dyn BlockSource>,
	adapter: Arc<dyn ChainAdapter>,
	state: Arc<RwLock<BsqChainState>>,
	genesis_height: u32,
	genesis_tx_id: TxId,
	stop: AtomicBool,
}

impl Chain {
	/// Initializes an empty token chain expecting the genesis tx with the
	/// given id at the given height of the underlying chain.
	pub fn init(
		source: Arc<dyn BlockSource>,
		adapter: Arc<dyn ChainAdapter>,
		genesis_height: u32,
		genesis_tx_id: TxId,
	) -> Chain {
		Chain {
			source,
			adapter,
			state: Arc::new(RwLock::new(BsqChainState::new())),
			genesis_height,
			genesis_tx_id,
			stop: AtomicBool::new(false),
		}
	}

	/// Sweeps the underlying chain from `start_height` to `head_height`
	/// inclusive. Each block is fetched from the source together with its
	/// txs, classified, committed and handed to the adapter. Used to catch
	/// up with historical blocks; new blocks go through
	/// [`parse_block`](Chain::parse_block).
	pub fn parse_blocks(&self, start_height: u32, head_height: u32) -> Result<(), Error> {
		info!(
			"parse_blocks: sweeping heights {} to {}",
			start_height, head_height
		);
		for height in start_height..=head_height {
			if self.stop_requested() {
				info!(
					"parse_blocks: stop requested, halting sweep before height {}",
					height
				);
				return Ok(());
			}
			let raw = self.source.request_block(height)?;
			let txs = self.request_block_txs(&raw)?;
			match self.process_block_txs(raw.height, &raw.hash, &raw.previous_hash, txs, Options::SYNC)
			{
				Ok(_) => (),
				Err(e) => return self.reject_or_raise(height, e),
			}
		}
		info!("parse_blocks: sweep complete at height {}", head_height);
		Ok(())
	}

	/// Ingests blocks that arrive already materialized, e.g. deserialized
	/// from a peer snapshot. Classification is re-run on each block's tx
	/// list; the block source is not consulted.
	pub fn parse_bsq_blocks(&self, blocks: Vec<BsqBlock>) -> Result<(), Error> {
		for block in blocks {
			if self.stop_requested() {
				info!(
					"parse_bsq_blocks: stop requested, halting before height {}",
					block.height
				);
				return Ok(());
			}
			match self.process_block_txs(
				block.height,
				&block.hash,
				&block.previous_hash,
				block.txs,
				Options::SYNC,
			) {
				Ok(_) => (),
				Err(e) => return self.reject_or_raise(block.height, e),
			}
		}
		Ok(())
	}

	/// Parses a single newly arrived block, committing it and notifying
	/// the adapter on success. Returns the token view of the block.
	pub fn parse_block(&self, raw: &RawBlock) -> Result<BsqBlock, Error> {
		let txs = self.request_block_txs(raw)?;
		self.process_block_txs(raw.height, &raw.hash, &raw.previous_hash, txs, Options::NONE)
	}

	fn request_block_txs(&self, raw: &RawBlock) -> Result<Vec<Tx>, Error> {
		let mut txs = Vec::with_capacity(raw.tx_ids.len());
		for tx_id in &raw.tx_ids {
			let tx = self.source.request_transaction(tx_id, raw.height)?;
			txs.push(tx);
		}
		Ok(txs)
	}

	fn process_block_txs(
		&self,
		height: u32,
		hash: &BlockHash,
		previous_hash: &BlockHash,
		txs: Vec<Tx>,
		opts: Options,
	) -> Result<BsqBlock, Error> {
		let block = {
			let mut state = self.state.write().unwrap();
			let mut ctx = BlockContext {
				opts,
				genesis_height: self.genesis_height,
				genesis_tx_id: self.genesis_tx_id.clone(),
				state: &mut *state,
			};
			pipe::process_block(height, hash, previous_hash, txs, &mut ctx)?
		};
		// notify with the lock released so the adapter can query the chain
		self.adapter.block_accepted(&block);
		Ok(block)
	}

	// In dev mode an invariant violation surfaces to the caller. Otherwise
	// the offending block is rejected and the sweep halts, leaving the
	// state at the last good block.
	fn reject_or_raise(&self, height: u32, e: Error) -> Result<(), Error> {
		if let ErrorKind::InvariantViolation(_) = e.kind() {
			if !global::is_dev_mode() {
				error!(
					"rejecting block at height {} and halting: {}",
					height,
					e.kind()
				);
				return Ok(());
			}
		}
		Err(e)
	}

	/// The tip of the parsed chain, if any block has been committed.
	pub fn head(&self) -> Option<Tip> {
		self.state.read().unwrap().head()
	}

	/// Height of the most recently committed block.
	pub fn head_height(&self) -> Option<u32> {
		self.head().map(|tip| tip.height)
	}

	/// Whether a block with the given previous hash would connect to the
	/// current tip.
	pub fn is_block_connecting(&self, previous_hash: &BlockHash) -> bool {
		self.state.read().unwrap().is_block_connecting(previous_hash)
	}

	/// Number of committed blocks.
	pub fn block_count(&self) -> usize {
		self.state.read().unwrap().block_count()
	}

	/// Committed blocks at or above the given height, e.g. to serve a
	/// peer that is catching up.
	pub fn blocks_from(&self, height: u32) -> Vec<BsqBlock> {
		self.state.read().unwrap().blocks_from(height)
	}

	/// Looks up a recorded token tx.
	pub fn get_tx(&self, tx_id: &TxId) -> Option<Tx> {
		self.state.read().unwrap().get_tx(tx_id).cloned()
	}

	/// Whether a token tx with the given id has been recorded.
	pub fn contains_tx(&self, tx_id: &TxId) -> bool {
		self.state.read().unwrap().contains_tx(tx_id)
	}

	/// Verified output that has not been spent yet.
	pub fn get_spendable_tx_output(&self, tx_id: &TxId, index: u32) -> Option<TxOutput> {
		self.state.read().unwrap().get_spendable_tx_output(tx_id, index)
	}

	/// Fee burned by the given tx, if any.
	pub fn get_burned_fee(&self, tx_id: &TxId) -> Option<u64> {
		self.state.read().unwrap().get_burned_fee(tx_id)
	}

	/// Total token value burned in fees across the whole chain.
	pub fn total_burned_fee(&self) -> u64 {
		self.state.read().unwrap().total_burned_fee()
	}

	/// Clone of the full chain state, for persistence or inspection.
	pub fn snapshot(&self) -> BsqChainState {
		self.state.read().unwrap().clone()
	}

	/// Replaces the chain state wholesale, e.g. when restoring a persisted
	/// snapshot before re-parsing after a re-organization.
	pub fn apply_snapshot(&self, state: BsqChainState) {
		let mut current = self.state.write().unwrap();
		*current = state;
	}

	/// Asks the driver to stop. The sweep exits cleanly after the block
	/// currently being processed; nothing is partially committed.
	pub fn request_stop(&self) {
		self.stop.store(true, Ordering::Relaxed);
	}

	/// Whether a stop has been requested.
	pub fn stop_requested(&self) -> bool {
		self.stop.load(Ordering::Relaxed)
	}
}
