//! HNSW (Hierarchical Navigable Small World) similarity index
//!
//! Approximate nearest neighbor search over a corpus by inner product, where a
//! higher score means a closer match. Indexes are built fresh for every request
//! and never updated in place.
//!
//! The graph has several layers: upper layers hold exponentially fewer nodes
//! and are walked greedily to find a good entry point, the bottom layer is
//! searched with a bounded beam. Level assignment uses a seeded LCG so that
//! building the same corpus twice yields the same graph.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::error::{RecommendError, Result};

const MAX_LEVEL: usize = 16;
const LEVEL_SEED: u64 = 42;

/// Graph construction and search parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HnswParams {
  /// Max neighbors per node on upper layers (layer 0 allows twice as many)
  pub m: usize,
  /// Beam width while inserting
  pub ef_construction: usize,
  /// Minimum beam width while searching
  pub ef_search: usize,
}

impl Default for HnswParams {
  fn default() -> Self {
    Self { m: 32, ef_construction: 40, ef_search: 16 }
  }
}

/// A corpus position and its inner-product score against the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
  pub position: usize,
  pub score: f32,
}

#[derive(Debug, Clone, Copy)]
struct Scored {
  score: f32,
  position: usize,
}

impl PartialEq for Scored {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Scored {
  // Higher score wins; on ties the lower position ranks higher.
  fn cmp(&self, other: &Self) -> Ordering {
    self.score.total_cmp(&other.score).then_with(|| other.position.cmp(&self.position))
  }
}

pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Exhaustive top-k by inner product, best first
pub fn brute_force_top_k<V: AsRef<[f32]>>(vectors: &[V], query: &[f32], k: usize) -> Vec<SearchHit> {
  let mut scored: Vec<Scored> = vectors
    .iter()
    .enumerate()
    .map(|(position, vector)| Scored { score: inner_product(vector.as_ref(), query), position })
    .collect();
  scored.sort_by(|a, b| b.cmp(a));
  scored.into_iter().take(k).map(into_hit).collect()
}

fn into_hit(scored: Scored) -> SearchHit {
  SearchHit { position: scored.position, score: scored.score }
}

pub struct SimilarityIndex {
  params: HnswParams,
  dimension: usize,
  vectors: Vec<Vec<f32>>,
  // neighbors[position][layer]
  neighbors: Vec<Vec<Vec<usize>>>,
  entry_point: usize,
  top_level: usize,
  level_mult: f64,
  rng_state: u64,
}

impl SimilarityIndex {
  pub fn build<V: AsRef<[f32]>>(vectors: &[V]) -> Result<Self> {
    Self::build_with(vectors, HnswParams::default())
  }

  pub fn build_with<V: AsRef<[f32]>>(vectors: &[V], params: HnswParams) -> Result<Self> {
    if params.m < 2 {
      return Err(RecommendError::index_build("HNSW M must be at least 2"));
    }

    let first = vectors.first().ok_or_else(|| RecommendError::index_build("no vectors to index"))?;
    let dimension = first.as_ref().len();
    if dimension == 0 {
      return Err(RecommendError::index_build("vectors are empty"));
    }

    let mut index = Self {
      params,
      dimension,
      vectors: Vec::with_capacity(vectors.len()),
      neighbors: Vec::with_capacity(vectors.len()),
      entry_point: 0,
      top_level: 0,
      level_mult: 1.0 / (params.m as f64).ln(),
      rng_state: LEVEL_SEED,
    };

    for (position, vector) in vectors.iter().enumerate() {
      let vector = vector.as_ref();
      if vector.len() != dimension {
        return Err(RecommendError::index_build(format!(
          "vector {position} has dimension {}, expected {dimension}",
          vector.len()
        )));
      }
      if vector.iter().any(|value| !value.is_finite()) {
        return Err(RecommendError::index_build(format!(
          "vector {position} contains non-finite values"
        )));
      }
      index.insert(vector.to_vec());
    }

    tracing::debug!(
      nodes = index.len(),
      dimension,
      top_level = index.top_level,
      "built similarity index"
    );
    Ok(index)
  }

  pub fn len(&self) -> usize {
    self.vectors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vectors.is_empty()
  }

  pub fn dimension(&self) -> usize {
    self.dimension
  }

  /// Return exactly `min(k, len)` hits ordered by non-increasing score.
  ///
  /// No similarity threshold is applied. If the graph walk reaches fewer
  /// nodes than requested, the remainder is filled by scoring the unvisited
  /// positions exhaustively.
  pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
    if query.len() != self.dimension {
      return Err(RecommendError::index_build(format!(
        "query has dimension {}, index expects {}",
        query.len(),
        self.dimension
      )));
    }

    let wanted = k.min(self.len());
    if wanted == 0 {
      return Ok(Vec::new());
    }

    let mut entry = self.entry_point;
    for layer in (1..=self.top_level).rev() {
      entry = self.greedy_closest(entry, query, layer);
    }

    let ef = k.max(self.params.ef_search);
    let mut found = self.search_layer(entry, query, ef, 0);
    found.truncate(wanted);

    if found.len() < wanted {
      let seen: HashSet<usize> = found.iter().map(|hit| hit.position).collect();
      let mut rest: Vec<Scored> = (0..self.len())
        .filter(|position| !seen.contains(position))
        .map(|position| self.score(position, query))
        .collect();
      rest.sort_by(|a, b| b.cmp(a));
      found.extend(rest.into_iter().take(wanted - found.len()));
      found.sort_by(|a, b| b.cmp(a));
    }

    Ok(found.into_iter().map(into_hit).collect())
  }

  fn insert(&mut self, vector: Vec<f32>) {
    let position = self.vectors.len();
    let level = self.select_level();

    self.vectors.push(vector);
    self.neighbors.push(vec![Vec::new(); level + 1]);

    if position == 0 {
      self.entry_point = 0;
      self.top_level = level;
      return;
    }

    let query = self.vectors[position].clone();
    let mut entry = self.entry_point;
    for layer in ((level + 1)..=self.top_level).rev() {
      entry = self.greedy_closest(entry, &query, layer);
    }

    for layer in (0..=level.min(self.top_level)).rev() {
      let candidates = self.search_layer(entry, &query, self.params.ef_construction, layer);
      let limit = self.max_neighbors(layer);

      let selected: Vec<usize> = candidates.iter().take(limit).map(|c| c.position).collect();
      for &neighbor in &selected {
        self.connect(position, neighbor, layer);
        self.connect(neighbor, position, layer);
        self.prune(neighbor, layer, limit);
      }

      if let Some(best) = candidates.first() {
        entry = best.position;
      }
    }

    if level > self.top_level {
      self.entry_point = position;
      self.top_level = level;
    }
  }

  fn max_neighbors(&self, layer: usize) -> usize {
    if layer == 0 {
      self.params.m * 2
    } else {
      self.params.m
    }
  }

  // level = floor(-ln(uniform) * level_mult)
  fn select_level(&mut self) -> usize {
    self.rng_state = self.rng_state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let uniform = ((self.rng_state >> 11) as f64 / (1u64 << 53) as f64).max(1e-12);
    ((-uniform.ln() * self.level_mult).floor() as usize).min(MAX_LEVEL)
  }

  fn score(&self, position: usize, query: &[f32]) -> Scored {
    Scored { score: inner_product(&self.vectors[position], query), position }
  }

  fn layer_neighbors(&self, position: usize, layer: usize) -> &[usize] {
    self.neighbors[position].get(layer).map(Vec::as_slice).unwrap_or(&[])
  }

  fn greedy_closest(&self, entry: usize, query: &[f32], layer: usize) -> usize {
    let mut best = self.score(entry, query);
    loop {
      let mut improved = false;
      for &neighbor in self.layer_neighbors(best.position, layer) {
        let candidate = self.score(neighbor, query);
        if candidate > best {
          best = candidate;
          improved = true;
        }
      }
      if !improved {
        return best.position;
      }
    }
  }

  /// Beam search on one layer; returns up to `ef` nodes, best first
  fn search_layer(&self, entry: usize, query: &[f32], ef: usize, layer: usize) -> Vec<Scored> {
    let ef = ef.max(1);
    let mut visited: HashSet<usize> = HashSet::new();
    let mut candidates: BinaryHeap<Scored> = BinaryHeap::new();
    let mut results: BinaryHeap<Reverse<Scored>> = BinaryHeap::new();

    let start = self.score(entry, query);
    visited.insert(entry);
    candidates.push(start);
    results.push(Reverse(start));

    while let Some(current) = candidates.pop() {
      let worst = results.peek().map(|r| r.0);
      if let Some(worst) = worst {
        if current < worst && results.len() >= ef {
          break;
        }
      }

      for &neighbor in self.layer_neighbors(current.position, layer) {
        if !visited.insert(neighbor) {
          continue;
        }

        let scored = self.score(neighbor, query);
        let admit = results.len() < ef || results.peek().map(|r| scored > r.0).unwrap_or(true);
        if admit {
          candidates.push(scored);
          results.push(Reverse(scored));
          if results.len() > ef {
            results.pop();
          }
        }
      }
    }

    let mut ordered: Vec<Scored> = results.into_iter().map(|r| r.0).collect();
    ordered.sort_by(|a, b| b.cmp(a));
    ordered
  }

  fn connect(&mut self, from: usize, to: usize, layer: usize) {
    let lists = &mut self.neighbors[from];
    while lists.len() <= layer {
      lists.push(Vec::new());
    }
    if from != to && !lists[layer].contains(&to) {
      lists[layer].push(to);
    }
  }

  /// Keep only the `limit` neighbors closest to `position` on `layer`
  fn prune(&mut self, position: usize, layer: usize, limit: usize) {
    let current = self.layer_neighbors(position, layer);
    if current.len() <= limit {
      return;
    }

    let base = &self.vectors[position];
    let mut scored: Vec<Scored> = current
      .iter()
      .map(|&neighbor| Scored { score: inner_product(&self.vectors[neighbor], base), position: neighbor })
      .collect();
    scored.sort_by(|a, b| b.cmp(a));

    self.neighbors[position][layer] = scored.into_iter().take(limit).map(|s| s.position).collect();
  }
}
