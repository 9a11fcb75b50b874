//! Integrity scorer
//!
//! Decides whether a candidate extent is kept, from four signals:
//! header match, footer match, Shannon entropy within the range expected
//! for the extension, and a minimum size.
//!
//! Weights default to header 0.4, footer 0.4, entropy 0.2 with acceptance
//! at 0.7. When the format defines no footer, the footer check is not
//! applicable rather than failed: the score is rescaled over the header
//! and entropy weights alone, so a footer-less extent with a matching
//! header and plausible entropy scores 1.0, while a header match alone
//! (0.67) still falls short. A failed size check forces the score to 0.

use crate::domain::entities::{SignatureDescriptor, MAX_ENTROPY};

/// Shannon entropy of `data` in bits per byte, in `[0, 8]`.
///
/// Empty input has entropy 0. The result is exactly 0 iff every byte is
/// the same.
pub fn entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut freq = [0u64; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }

    let len = data.len() as f64;
    let bits: f64 = freq
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum();
    // A single symbol sums to -0.0
    if bits <= 0.0 {
        0.0
    } else {
        bits.min(MAX_ENTROPY)
    }
}

/// Entropy window and size floor for one class of extensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub entropy_min: f64,
    pub entropy_max: f64,
    /// Extents must be strictly larger than this many bytes
    pub min_size: u64,
}

impl Thresholds {
    pub const fn new(entropy_min: f64, entropy_max: f64, min_size: u64) -> Self {
        Self {
            entropy_min,
            entropy_max,
            min_size,
        }
    }

    #[inline]
    pub fn entropy_ok(&self, entropy: f64) -> bool {
        (self.entropy_min..=self.entropy_max).contains(&entropy)
    }

    #[inline]
    pub fn size_ok(&self, len: u64) -> bool {
        len > self.min_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub header: f64,
    pub footer: f64,
    pub entropy: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            header: 0.4,
            footer: 0.4,
            entropy: 0.2,
        }
    }
}

/// Per-extension thresholds, weights and the acceptance cut-off.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPolicy {
    classes: Vec<(Vec<String>, Thresholds)>,
    unclassified: Thresholds,
    weights: Weights,
    accept_threshold: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        let class = |exts: &[&str], t: Thresholds| {
            (exts.iter().map(|e| e.to_string()).collect::<Vec<_>>(), t)
        };
        Self {
            classes: vec![
                // Compressed image and archive payloads
                class(&["jpg", "jpeg", "png", "zip"], Thresholds::new(7.0, 8.0, 1024)),
                class(&["pdf"], Thresholds::new(4.5, 8.0, 1024)),
                class(&["gif"], Thresholds::new(3.5, 7.0, 512)),
            ],
            unclassified: Thresholds::new(3.0, MAX_ENTROPY, 256),
            weights: Weights::default(),
            accept_threshold: 0.7,
        }
    }
}

impl ScoringPolicy {
    /// Sets thresholds for `extensions`, overriding any earlier class.
    pub fn with_class(mut self, extensions: &[&str], thresholds: Thresholds) -> Self {
        self.classes.insert(
            0,
            (extensions.iter().map(|e| e.to_string()).collect(), thresholds),
        );
        self
    }

    /// Thresholds used for extensions no class lists
    pub fn with_unclassified(mut self, thresholds: Thresholds) -> Self {
        self.unclassified = thresholds;
        self
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_accept_threshold(mut self, threshold: f64) -> Self {
        self.accept_threshold = threshold;
        self
    }

    /// Looks up thresholds for an extension, ignoring ASCII case
    pub fn thresholds_for(&self, extension: &str) -> &Thresholds {
        self.classes
            .iter()
            .find(|(exts, _)| exts.iter().any(|e| e.eq_ignore_ascii_case(extension)))
            .map(|(_, t)| t)
            .unwrap_or(&self.unclassified)
    }

    pub fn weights(&self) -> Weights {
        self.weights
    }

    pub fn accept_threshold(&self) -> f64 {
        self.accept_threshold
    }
}

/// Breakdown of one scoring decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub header_ok: bool,
    /// `None` when the format defines no footer
    pub footer_ok: Option<bool>,
    pub entropy_ok: bool,
    pub size_ok: bool,
    pub entropy: f64,
    pub score: f64,
    pub accepted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IntegrityScorer {
    policy: ScoringPolicy,
}

impl IntegrityScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    /// Scores an extent's bytes against its descriptor
    pub fn evaluate(&self, data: &[u8], descriptor: &SignatureDescriptor) -> Verdict {
        let thresholds = self.policy.thresholds_for(descriptor.extension());
        let w = self.policy.weights;

        let entropy = entropy(data);
        let header_ok = descriptor.matches_header(data);
        let footer_ok = descriptor.matches_footer(data);
        let entropy_ok = thresholds.entropy_ok(entropy);
        let size_ok = thresholds.size_ok(data.len() as u64);

        let mut earned = 0.0;
        let mut applicable = w.header + w.entropy;
        if header_ok {
            earned += w.header;
        }
        if entropy_ok {
            earned += w.entropy;
        }
        if let Some(ok) = footer_ok {
            applicable += w.footer;
            if ok {
                earned += w.footer;
            }
        }

        let full = w.header + w.footer + w.entropy;
        let score = if !size_ok || applicable <= 0.0 {
            0.0
        } else {
            earned * full / applicable
        };

        Verdict {
            header_ok,
            footer_ok,
            entropy_ok,
            size_ok,
            entropy,
            score,
            accepted: score >= self.policy.accept_threshold,
        }
    }

    /// Accept/reject only
    pub fn score(&self, data: &[u8], descriptor: &SignatureDescriptor) -> bool {
        self.evaluate(data, descriptor).accepted
    }
}
