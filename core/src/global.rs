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

//! Values shared across all modules without having to pass them all over
//! the place. Should be used sparingly.

use std::sync::RwLock;

/// Cap on the number of passes resolving tx dependencies within a single
/// block. Derived from the theoretical worst-case length of a tx chain
/// fitting in one block.
pub const DEFAULT_MAX_BLOCK_RECURSIONS: u32 = 5300;

/// Depth above which dependency resolution logs a warning.
pub const WARN_RECURSION_DEPTH: u32 = 100;

/// How the parser reacts to a fatal invariant violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParseMode {
	/// Violations are logged, the offending block is rejected
	Production,

	/// Violations are propagated to the caller
	Dev,
}

lazy_static! {
	/// The parse mode
	pub static ref PARSE_MODE: RwLock<ParseMode> = RwLock::new(ParseMode::Production);

	/// The dependency resolution cap, settable to exercise pathological
	/// blocks in tests
	pub static ref MAX_BLOCK_RECURSIONS: RwLock<u32> =
			RwLock::new(DEFAULT_MAX_BLOCK_RECURSIONS);
}

/// Set the parse mode
pub fn set_parse_mode(mode: ParseMode) {
	let mut param_ref = PARSE_MODE.write().unwrap();
	*param_ref = mode;
}

/// Are we in dev mode?
pub fn is_dev_mode() -> bool {
	let param_ref = PARSE_MODE.read().unwrap();
	match *param_ref {
		ParseMode::Dev => true,
		ParseMode::Production => false,
	}
}

/// The dependency resolution cap
pub fn max_block_recursions() -> u32 {
	let param_ref = MAX_BLOCK_RECURSIONS.read().unwrap();
	*param_ref
}

/// Set the dependency resolution cap
pub fn set_max_block_recursions(max: u32) {
	let mut param_ref = MAX_BLOCK_RECURSIONS.write().unwrap();
	*param_ref = max;
}
