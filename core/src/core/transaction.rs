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

//! Transactions as seen by the token parser.
//!
//! A transaction only carries token value if it descends from the genesis
//! tx. Whether an output actually does is not stored on the output itself,
//! the chain state owns the set of verified outputs.

use std::fmt;

use crate::core::hash::TxId;

/// A transaction input, a reference to an output being consumed by the
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
	/// Id of the tx whose output is being consumed
	pub spending_tx_id: TxId,
	/// Index of the consumed output within that tx
	pub spending_output_index: u32,
}

impl TxInput {
	/// Creates a reference to the output at `spending_output_index` of
	/// the tx with id `spending_tx_id`.
	pub fn new(spending_tx_id: TxId, spending_output_index: u32) -> TxInput {
		TxInput {
			spending_tx_id,
			spending_output_index,
		}
	}
}

/// A transaction output. Identity is `(tx_id, index)`, the value is an
/// amount in the smallest indivisible token unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
	/// Id of the tx that created this output
	pub tx_id: TxId,
	/// Position of this output within its tx
	pub index: u32,
	/// Face value in the smallest token unit
	pub value: u64,
	/// Receiving address, when the upstream node could resolve one
	pub address: Option<String>,
}

impl TxOutput {
	/// Creates a new output.
	pub fn new(tx_id: TxId, index: u32, value: u64, address: Option<String>) -> TxOutput {
		TxOutput {
			tx_id,
			index,
			value,
			address,
		}
	}

	/// The map key identifying this output.
	pub fn key(&self) -> TxOutputKey {
		TxOutputKey::new(self.tx_id.clone(), self.index)
	}
}

/// Key identity of an output: the id of its tx and its index therein.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxOutputKey {
	/// Id of the tx that created the output
	pub tx_id: TxId,
	/// Position of the output within its tx
	pub index: u32,
}

impl TxOutputKey {
	/// Creates a key for the output at `index` of tx `tx_id`.
	pub fn new(tx_id: TxId, index: u32) -> TxOutputKey {
		TxOutputKey { tx_id, index }
	}
}

impl fmt::Display for TxOutputKey {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}:{}", self.tx_id, self.index)
	}
}

/// Records the consumer of a previously verified output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpentInfo {
	/// Height of the block containing the consuming tx
	pub block_height: u32,
	/// Id of the consuming tx
	pub tx_id: TxId,
	/// Index of the consuming input within that tx
	pub input_index: u32,
}

impl SpentInfo {
	/// Creates a spent record for input `input_index` of tx `tx_id` at
	/// `block_height`.
	pub fn new(block_height: u32, tx_id: TxId, input_index: u32) -> SpentInfo {
		SpentInfo {
			block_height,
			tx_id,
			input_index,
		}
	}
}

/// A transaction. The order of inputs and outputs is significant: inputs
/// are evaluated in declared order and token value is assigned to outputs
/// by ascending index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
	/// Tx id as handed out by the upstream node
	pub id: TxId,
	/// Height of the block the tx was confirmed in
	pub block_height: u32,
	/// Ordered inputs
	pub inputs: Vec<TxInput>,
	/// Ordered outputs
	pub outputs: Vec<TxOutput>,
}

impl Tx {
	/// Creates a new transaction.
	pub fn new(id: TxId, block_height: u32, inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Tx {
		Tx {
			id,
			block_height,
			inputs,
			outputs,
		}
	}

	/// Sum of all output face values.
	pub fn output_value(&self) -> u64 {
		self.outputs.iter().map(|out| out.value).sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_key_identity() {
		let out = TxOutput::new(TxId::from("abc"), 2, 100, None);
		assert_eq!(out.key(), TxOutputKey::new(TxId::from("abc"), 2));
		assert_ne!(out.key(), TxOutputKey::new(TxId::from("abc"), 3));
		assert_ne!(out.key(), TxOutputKey::new(TxId::from("abd"), 2));
		assert_eq!(format!("{}", out.key()), "abc:2");
	}

	#[test]
	fn tx_output_value() {
		let tx = Tx::new(
			TxId::from("t"),
			7,
			vec![TxInput::new(TxId::from("p"), 0)],
			vec![
				TxOutput::new(TxId::from("t"), 0, 300, None),
				TxOutput::new(TxId::from("t"), 1, 200, Some("addr".to_owned())),
			],
		);
		assert_eq!(tx.output_value(), 500);
	}
}
