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

//! Base types that the block processing pipeline requires.

use failure::Fail;

use bsq_core::core::{BlockHash, BsqBlock, RawBlock, Tx, TxId};

bitflags! {
	/// Options for block processing
	pub struct Options: u32 {
		/// No flags
		const NONE = 0b0000_0000;
		/// Catch-up sweep over historical blocks
		const SYNC = 0b0000_0001;
	}
}

/// The tip of the parsed token chain. References the max height and the
/// latest and previous block hashes for convenience.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tip {
	/// Height of the tip
	pub height: u32,
	/// Last block pushed to the chain
	pub last_block_h: BlockHash,
	/// Block previous to last
	pub prev_block_h: BlockHash,
}

impl Tip {
	/// The tip after appending the given block.
	pub fn from_block(b: &BsqBlock) -> Tip {
		Tip {
			height: b.height,
			last_block_h: b.hash.clone(),
			prev_block_h: b.previous_hash.clone(),
		}
	}
}

/// Failure modes of a block source.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum SourceError {
	/// Transport-level failure talking to the node
	#[fail(display = "Transport failure: {}", _0)]
	Transport(String),
	/// The node has no block at the requested height
	#[fail(display = "No block at height {}", _0)]
	BlockNotFound(u32),
	/// The node could not resolve a transaction
	#[fail(display = "Transaction {} not found", _0)]
	TxNotFound(String),
}

/// Trait the chain driver requires an implementor for in order to pull
/// raw blocks and transactions from the underlying chain node.
pub trait BlockSource: Send + Sync {
	/// Returns the raw block at the given height.
	fn request_block(&self, height: u32) -> Result<RawBlock, SourceError>;

	/// Returns the full tx with ordered inputs and outputs. The height is
	/// the block height the tx is expected to be confirmed at.
	fn request_transaction(&self, tx_id: &TxId, height: u32) -> Result<Tx, SourceError>;
}

/// Bridge between the chain pipeline and the rest of the system. Handles
/// downstream processing of accepted blocks, most importantly handing the
/// token view of each block to the caller.
pub trait ChainAdapter: Send + Sync {
	/// The pipeline has committed this block to the token chain state.
	/// Invoked on the parser worker after the commit, so reads through the
	/// chain observe state that includes the block.
	fn block_accepted(&self, block: &BsqBlock);
}

/// Adapter that ignores block notifications.
pub struct NoopAdapter {}

impl ChainAdapter for NoopAdapter {
	fn block_accepted(&self, _block: &BsqBlock) {}
}
