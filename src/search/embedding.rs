//! Text embedders
//!
//! The engine only sees the [`Embedder`] trait. The built-in implementation
//! is Harmonic Token Projection (HTP), a deterministic, training-free method:
//! "Harmonic Token Projection: A Vocabulary-Free, Training-Free,
//!  Deterministic, and Reversible Embedding Methodology"
//! https://arxiv.org/html/2511.20665
//!
//! HTP needs no model files, so datasets prepared with `advisify index` can
//! be queried anywhere. A dataset embedded with another model must be
//! queried with that same model.

use std::f64::consts::PI;
use std::sync::Mutex;

use crate::error::{AdvisifyError, Result};

/// Maps text to a fixed-length vector
pub trait Embedder {
    /// Length of every vector returned by [`Embedder::encode`]
    fn dimension(&self) -> usize;

    fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        (**self).encode(text)
    }
}

/// Embedding dimension (2 * number of moduli)
pub const HTP_DIM: usize = 384;

const NUM_MODULI: usize = HTP_DIM / 2;

/// Maximum token length (Unicode code points)
const MAX_TOKEN_LENGTH: usize = 64;

/// Harmonic Token Projection embedder
///
/// Each token becomes an integer, reduced modulo the first `HTP_DIM / 2`
/// primes; every residue is projected onto the unit circle. Token vectors are
/// mean-pooled and L2-normalized.
#[derive(Debug, Clone)]
pub struct HtpEmbedder {
    moduli: Vec<u64>,
}

impl HtpEmbedder {
    pub fn new() -> Self {
        Self {
            moduli: first_primes(NUM_MODULI),
        }
    }

    /// Embed a single token: E_i = [sin(2πr_i/m_i), cos(2πr_i/m_i)]
    fn embed_token(&self, token: &str) -> impl Iterator<Item = f64> + '_ {
        let n = token_to_integer(token);

        self.moduli.iter().flat_map(move |&m| {
            let theta = 2.0 * PI * ((n % m) as f64) / (m as f64);
            [theta.sin(), theta.cos()]
        })
    }
}

impl Default for HtpEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HtpEmbedder {
    fn dimension(&self) -> usize {
        HTP_DIM
    }

    /// Text without any token maps to the zero vector
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Ok(vec![0.0; HTP_DIM]);
        }

        let mut pooled = vec![0.0f64; HTP_DIM];
        for token in &tokens {
            for (acc, val) in pooled.iter_mut().zip(self.embed_token(token)) {
                *acc += val;
            }
        }

        let count = tokens.len() as f64;
        pooled.iter_mut().for_each(|v| *v /= count);

        let norm = pooled.iter().map(|x| x * x).sum::<f64>().sqrt();
        let scale = if norm > 0.0 { norm } else { 1.0 };

        Ok(pooled.iter().map(|x| (x / scale) as f32).collect())
    }
}

/// Serializes calls into an embedder that is not safe to share
///
/// Any `Send` embedder wrapped here is `Sync`, so the engine can be shared
/// across threads while the model sees one request at a time.
#[derive(Debug)]
pub struct SerializedEmbedder<E> {
    inner: Mutex<E>,
    dimension: usize,
}

impl<E: Embedder> SerializedEmbedder<E> {
    pub fn new(inner: E) -> Self {
        let dimension = inner.dimension();
        Self {
            inner: Mutex::new(inner),
            dimension,
        }
    }

    pub fn into_inner(self) -> E {
        self.inner.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<E: Embedder> Embedder for SerializedEmbedder<E> {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let model = self
            .inner
            .lock()
            .map_err(|_| AdvisifyError::embedding("embedding model lock poisoned"))?;
        model.encode(text)
    }
}

/// Lowercased words, split on whitespace and ASCII punctuation
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

/// N = Σ u_j * B^(L-j) with B = 2^16, wrapping on overflow
fn token_to_integer(token: &str) -> u64 {
    token
        .chars()
        .take(MAX_TOKEN_LENGTH)
        .fold(0u64, |n, c| n.wrapping_mul(65536).wrapping_add(c as u64))
}

/// First `count` primes; pairwise coprime by construction
fn first_primes(count: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(count);
    let mut candidate = 2u64;

    while primes.len() < count {
        let is_prime = primes
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0);
        if is_prime {
            primes.push(candidate);
        }
        candidate += 1;
    }

    primes
}
