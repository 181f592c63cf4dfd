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

//! Identifiers for blocks and transactions.
//!
//! Both arrive as hex strings from the upstream node and are treated as
//! opaque here. The node is trusted for identity, nothing is hashed on
//! this side.

use std::fmt;

/// Hash identifying a block on the underlying chain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHash(pub String);

impl fmt::Display for BlockHash {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for BlockHash {
	fn from(s: String) -> BlockHash {
		BlockHash(s)
	}
}

impl<'a> From<&'a str> for BlockHash {
	fn from(s: &'a str) -> BlockHash {
		BlockHash(s.to_owned())
	}
}

/// Id of a transaction on the underlying chain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxId(pub String);

impl fmt::Display for TxId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for TxId {
	fn from(s: String) -> TxId {
		TxId(s)
	}
}

impl<'a> From<&'a str> for TxId {
	fn from(s: &'a str) -> TxId {
		TxId(s.to_owned())
	}
}
