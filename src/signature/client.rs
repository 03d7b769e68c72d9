// Copyright 2025 Lablup Inc. and Jeongkyu Shin
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

//! Adapter between the preference model and the russh client configuration

use super::algorithm::SignatureAlgorithm;
use once_cell::sync::Lazy;
use russh::client::Config;
use russh::keys::ssh_key::{Algorithm, EcdsaCurve, HashAlg};
use std::borrow::Cow;

/// Signature algorithms present in the client's default negotiation list,
/// in our preference-model terms. Computed once from a default
/// [`Config`]; this is the set `preferred_signatures` intersects against
/// when no explicit supported set is injected.
static CLIENT_SUPPORTED: Lazy<Vec<SignatureAlgorithm>> = Lazy::new(|| {
    let defaults: Vec<Algorithm> = Config::default().preferred.key.to_vec();
    SignatureAlgorithm::ALL
        .iter()
        .copied()
        .filter(|sig| {
            sig.client_algorithm()
                .is_some_and(|alg| defaults.contains(&alg))
        })
        .collect()
});

/// Signature algorithms the bundled SSH client implementation negotiates by
/// default.
pub fn client_supported_signatures() -> &'static [SignatureAlgorithm] {
    &CLIENT_SUPPORTED
}

impl SignatureAlgorithm {
    /// The client library's identifier for this algorithm.
    ///
    /// Certificate variants negotiate under their plain key identifier and
    /// have no distinct client-side entry.
    pub fn client_algorithm(self) -> Option<Algorithm> {
        match self {
            SignatureAlgorithm::Rsa => Some(Algorithm::Rsa { hash: None }),
            SignatureAlgorithm::RsaSha256 => Some(Algorithm::Rsa {
                hash: Some(HashAlg::Sha256),
            }),
            SignatureAlgorithm::RsaSha512 => Some(Algorithm::Rsa {
                hash: Some(HashAlg::Sha512),
            }),
            SignatureAlgorithm::NistP256 => Some(Algorithm::Ecdsa {
                curve: EcdsaCurve::NistP256,
            }),
            SignatureAlgorithm::NistP384 => Some(Algorithm::Ecdsa {
                curve: EcdsaCurve::NistP384,
            }),
            SignatureAlgorithm::NistP521 => Some(Algorithm::Ecdsa {
                curve: EcdsaCurve::NistP521,
            }),
            SignatureAlgorithm::Ed25519 => Some(Algorithm::Ed25519),
            SignatureAlgorithm::SkEd25519 => Some(Algorithm::SkEd25519),
            SignatureAlgorithm::RsaSha256Cert
            | SignatureAlgorithm::RsaSha512Cert
            | SignatureAlgorithm::NistP256Cert
            | SignatureAlgorithm::NistP384Cert
            | SignatureAlgorithm::NistP521Cert
            | SignatureAlgorithm::Ed25519Cert => None,
        }
    }
}

/// Reorder the client's host key negotiation list so `preferred` comes
/// first.
///
/// Algorithms are never added or removed, only reordered: preferred entries
/// already in the list move to the front in preference order, everything
/// else keeps its original relative order behind them.
pub fn apply_preferred_signatures(config: &mut Config, preferred: &[SignatureAlgorithm]) {
    if preferred.is_empty() {
        return;
    }

    let current: Vec<Algorithm> = config.preferred.key.to_vec();
    let mut reordered: Vec<Algorithm> = Vec::with_capacity(current.len());
    for sig in preferred {
        if let Some(alg) = sig.client_algorithm() {
            if current.contains(&alg) && !reordered.contains(&alg) {
                reordered.push(alg);
            }
        }
    }
    for alg in current {
        if !reordered.contains(&alg) {
            reordered.push(alg);
        }
    }

    config.preferred.key = Cow::Owned(reordered);
}
