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

use std::fmt;

/// SSH public-key signature algorithms the resolver can offer during
/// negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    Rsa,
    RsaSha256,
    RsaSha256Cert,
    RsaSha512,
    RsaSha512Cert,
    NistP256,
    NistP256Cert,
    NistP384,
    NistP384Cert,
    NistP521,
    NistP521Cert,
    Ed25519,
    Ed25519Cert,
    SkEd25519,
}

impl SignatureAlgorithm {
    /// Every algorithm the resolver knows about.
    pub const ALL: &'static [SignatureAlgorithm] = &[
        SignatureAlgorithm::Rsa,
        SignatureAlgorithm::RsaSha256,
        SignatureAlgorithm::RsaSha256Cert,
        SignatureAlgorithm::RsaSha512,
        SignatureAlgorithm::RsaSha512Cert,
        SignatureAlgorithm::NistP256,
        SignatureAlgorithm::NistP256Cert,
        SignatureAlgorithm::NistP384,
        SignatureAlgorithm::NistP384Cert,
        SignatureAlgorithm::NistP521,
        SignatureAlgorithm::NistP521Cert,
        SignatureAlgorithm::Ed25519,
        SignatureAlgorithm::Ed25519Cert,
        SignatureAlgorithm::SkEd25519,
    ];

    /// Wire identifier offered during key exchange.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Rsa => "ssh-rsa",
            SignatureAlgorithm::RsaSha256 => "rsa-sha2-256",
            SignatureAlgorithm::RsaSha256Cert => "rsa-sha2-256-cert-v01@openssh.com",
            SignatureAlgorithm::RsaSha512 => "rsa-sha2-512",
            SignatureAlgorithm::RsaSha512Cert => "rsa-sha2-512-cert-v01@openssh.com",
            SignatureAlgorithm::NistP256 => "ecdsa-sha2-nistp256",
            SignatureAlgorithm::NistP256Cert => "ecdsa-sha2-nistp256-cert-v01@openssh.com",
            SignatureAlgorithm::NistP384 => "ecdsa-sha2-nistp384",
            SignatureAlgorithm::NistP384Cert => "ecdsa-sha2-nistp384-cert-v01@openssh.com",
            SignatureAlgorithm::NistP521 => "ecdsa-sha2-nistp521",
            SignatureAlgorithm::NistP521Cert => "ecdsa-sha2-nistp521-cert-v01@openssh.com",
            SignatureAlgorithm::Ed25519 => "ssh-ed25519",
            SignatureAlgorithm::Ed25519Cert => "ssh-ed25519-cert-v01@openssh.com",
            SignatureAlgorithm::SkEd25519 => "sk-ssh-ed25519@openssh.com",
        }
    }

    /// Ordered preference family for a trusted host key algorithm.
    ///
    /// A key whose algorithm is recognized biases negotiation toward its own
    /// family, strongest-first within the family; anything else gets no bias.
    pub fn family_for(host_key_algorithm: &str) -> &'static [SignatureAlgorithm] {
        match host_key_algorithm {
            "ssh-rsa" => &[
                SignatureAlgorithm::Rsa,
                SignatureAlgorithm::RsaSha256,
                SignatureAlgorithm::RsaSha256Cert,
                SignatureAlgorithm::RsaSha512,
                SignatureAlgorithm::RsaSha512Cert,
            ],
            "ecdsa-sha2-nistp256" => &[
                SignatureAlgorithm::NistP256,
                SignatureAlgorithm::NistP256Cert,
            ],
            "ecdsa-sha2-nistp384" => &[
                SignatureAlgorithm::NistP384,
                SignatureAlgorithm::NistP384Cert,
            ],
            "ecdsa-sha2-nistp521" => &[
                SignatureAlgorithm::NistP521,
                SignatureAlgorithm::NistP521Cert,
            ],
            "ssh-ed25519" => &[
                SignatureAlgorithm::Ed25519,
                SignatureAlgorithm::Ed25519Cert,
                SignatureAlgorithm::SkEd25519,
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
