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

//! Error types for the token chain
use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

use crate::types::SourceError;

/// Error definition
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Chain error definitions
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// The block does not connect to our current chain tip, a
	/// re-organization is needed before it can be processed
	#[fail(display = "Orphan block at height {}", _0)]
	Orphan(u32),
	/// A second, different genesis tx was observed
	#[fail(display = "Conflicting genesis tx: {}", _0)]
	GenesisConflict(String),
	/// Appending a block whose previous hash no longer matches the tip
	#[fail(display = "Chain linkage broken: {}", _0)]
	ChainLinkage(String),
	/// A parser invariant did not hold
	#[fail(display = "Parser invariant violated: {}", _0)]
	InvariantViolation(String),
	/// The block source could not deliver a block or tx
	#[fail(display = "Block source unavailable: {}", _0)]
	SourceUnavailable(String),
	/// Anything else
	#[fail(display = "Other Error: {}", _0)]
	Other(String),
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let cause = match self.cause() {
			Some(c) => format!("{}", c),
			None => String::from("Unknown"),
		};
		let backtrace = match self.backtrace() {
			Some(b) => format!("{}", b),
			None => String::from("Unknown"),
		};
		let output = format!(
			"{} \n Cause: {} \n Backtrace: {}",
			self.inner, cause, backtrace
		);
		Display::fmt(&output, f)
	}
}

impl Error {
	/// get kind
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}
	/// get cause
	pub fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}
	/// get backtrace
	pub fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error {
			inner: Context::new(kind),
		}
	}
}

impl From<Context<ErrorKind>> for Error {
	fn from(inner: Context<ErrorKind>) -> Error {
		Error { inner }
	}
}

impl From<SourceError> for Error {
	fn from(error: SourceError) -> Error {
		let ec = error.clone();
		Error {
			inner: error.context(ErrorKind::SourceUnavailable(format!("{}", ec))),
		}
	}
}
