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

//! Blocks, in the two shapes the parser deals with: the raw view handed
//! out by the upstream node and the token view the parser produces.

use crate::core::hash::{BlockHash, TxId};
use crate::core::transaction::Tx;

/// A block as delivered by the block source: header linkage plus the
/// ordered ids of all contained txs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
	/// Height of the block on the underlying chain
	pub height: u32,
	/// Block hash
	pub hash: BlockHash,
	/// Hash of the preceding block
	pub previous_hash: BlockHash,
	/// Ids of all txs in the block, in chain order
	pub tx_ids: Vec<TxId>,
}

impl RawBlock {
	/// Creates a raw block record.
	pub fn new(height: u32, hash: BlockHash, previous_hash: BlockHash, tx_ids: Vec<TxId>) -> RawBlock {
		RawBlock {
			height,
			hash,
			previous_hash,
			tx_ids,
		}
	}
}

/// The token view of a block: header linkage plus the token-carrying txs,
/// in the order classification discovered them.
///
/// The same shape is also accepted as input on the pre-materialized
/// ingestion path, in which case the tx list is a candidate set that gets
/// re-classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BsqBlock {
	/// Height of the block on the underlying chain
	pub height: u32,
	/// Block hash
	pub hash: BlockHash,
	/// Hash of the preceding block
	pub previous_hash: BlockHash,
	/// Token txs of the block
	pub txs: Vec<Tx>,
}

impl BsqBlock {
	/// Creates a token block record.
	pub fn new(height: u32, hash: BlockHash, previous_hash: BlockHash, txs: Vec<Tx>) -> BsqBlock {
		BsqBlock {
			height,
			hash,
			previous_hash,
			txs,
		}
	}
}
