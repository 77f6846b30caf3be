//! Discrete probability models: Bayesian posteriors and Markov chains.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use u_quality::probability::{bayesian_posterior, markov_from_transitions, markov_step};
//!
//! let prior = BTreeMap::from([("secure".to_string(), 0.7), ("vulnerable".to_string(), 0.3)]);
//! let model = bayesian_posterior(&prior, &[("secure", 0.9), ("vulnerable", 0.6)]);
//! assert!(model.posterior["secure"] > model.posterior["vulnerable"]);
//!
//! let transitions = BTreeMap::from([
//!     ("secure".to_string(), BTreeMap::from([("secure".to_string(), 0.9), ("vulnerable".to_string(), 0.1)])),
//!     ("vulnerable".to_string(), BTreeMap::from([("secure".to_string(), 0.3), ("vulnerable".to_string(), 0.7)])),
//! ]);
//! let chain = markov_from_transitions(&transitions);
//! let (state, trace) = markov_step(&chain, "secure", 1).unwrap();
//! assert_eq!(state, "secure");
//! assert_eq!(trace, vec!["secure", "secure"]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::model::{ModelKind, ModelParameters, DEFAULT_CONFIDENCE_LEVEL};

/// Separator of the flattened `"from->to"` transition names.
const TRANSITION_SEPARATOR: &str = "->";

/// Row sums within this distance of 1 count as stochastic.
const ROW_SUM_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Bayesian
// ---------------------------------------------------------------------------

/// Prior and posterior probabilities over named outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesianModel {
    /// Prior probability per outcome.
    pub prior: BTreeMap<String, f64>,
    /// Posterior per outcome; sums to 1 whenever the total mass was positive.
    pub posterior: BTreeMap<String, f64>,
}

impl BayesianModel {
    /// The outcome with the highest posterior; ties go to the first name.
    pub fn most_probable(&self) -> Option<(&str, f64)> {
        self.posterior
            .iter()
            .fold(None, |best: Option<(&str, f64)>, (name, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((name.as_str(), p)),
            })
    }

    /// Exports the posterior as model parameters, one coefficient per outcome.
    ///
    /// `goodness_of_fit` carries the total posterior mass (1 when normalized).
    pub fn to_parameters(&self) -> ModelParameters {
        ModelParameters {
            kind: ModelKind::Bayesian,
            coefficients: self.posterior.values().copied().collect(),
            variable_names: self.posterior.keys().cloned().collect(),
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            goodness_of_fit: self.posterior.values().sum(),
        }
    }
}

/// Updates `prior` with per-outcome likelihoods.
///
/// Each outcome's prior is multiplied by the **first** likelihood listed
/// for it (1.0 when none is listed), and the products are divided by their
/// sum. When the total mass is zero the unnormalized products are returned
/// as-is; callers treat that as a degenerate result.
pub fn bayesian_posterior<S: AsRef<str>>(
    prior: &BTreeMap<String, f64>,
    likelihoods: &[(S, f64)],
) -> BayesianModel {
    let mut posterior: BTreeMap<String, f64> = prior
        .iter()
        .map(|(outcome, &p)| {
            let likelihood = likelihoods
                .iter()
                .find(|(name, _)| name.as_ref() == outcome)
                .map_or(1.0, |&(_, l)| l);
            (outcome.clone(), p * likelihood)
        })
        .collect();

    let total: f64 = posterior.values().sum();
    if total > 0.0 {
        for value in posterior.values_mut() {
            *value /= total;
        }
    } else {
        tracing::warn!(
            outcomes = prior.len(),
            "zero total probability mass; posterior left unnormalized"
        );
    }

    BayesianModel {
        prior: prior.clone(),
        posterior,
    }
}

// ---------------------------------------------------------------------------
// Markov
// ---------------------------------------------------------------------------

/// A discrete-state Markov chain.
///
/// Transition probabilities are keyed by `(from, to)`; unspecified pairs
/// are 0. Rows are expected, but not required, to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkovModel {
    states: Vec<String>,
    transitions: BTreeMap<(String, String), f64>,
}

impl MarkovModel {
    /// States in sorted order.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Probability of moving `from` → `to`; 0 when unspecified.
    pub fn probability(&self, from: &str, to: &str) -> f64 {
        self.transitions
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Dense transition matrix, rows and columns in [`states`](Self::states) order.
    pub fn transition_matrix(&self) -> Vec<Vec<f64>> {
        self.states
            .iter()
            .map(|from| self.states.iter().map(|to| self.probability(from, to)).collect())
            .collect()
    }

    /// Whether `state` is part of the model.
    pub fn contains(&self, state: &str) -> bool {
        self.states.binary_search_by(|s| s.as_str().cmp(state)).is_ok()
    }

    /// Outgoing transitions with positive probability, in target order.
    pub fn outgoing<'a>(&'a self, from: &'a str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.transitions
            .range((from.to_string(), String::new())..)
            .take_while(move |((f, _), _)| f == from)
            .filter(|(_, &p)| p > 0.0)
            .map(|((_, to), &p)| (to.as_str(), p))
    }

    /// Whether every row sums to 1 (within 10⁻⁶).
    pub fn is_stochastic(&self) -> bool {
        self.row_sums()
            .iter()
            .all(|s| (s - 1.0).abs() < ROW_SUM_TOLERANCE)
    }

    fn row_sums(&self) -> Vec<f64> {
        self.transition_matrix()
            .iter()
            .map(|row| row.iter().sum())
            .collect()
    }

    /// Propagates a probability distribution over states `steps` times.
    ///
    /// States missing from `initial` start at 0. Mass is not renormalized,
    /// so rows that do not sum to 1 leak or add mass.
    ///
    /// # Errors
    ///
    /// [`AnalyticsError::UnknownState`] when `initial` names a state the
    /// model does not have.
    pub fn distribution_after(
        &self,
        initial: &BTreeMap<String, f64>,
        steps: usize,
    ) -> Result<BTreeMap<String, f64>> {
        if let Some(unknown) = initial.keys().find(|s| !self.contains(s)) {
            return Err(AnalyticsError::UnknownState {
                state: unknown.clone(),
            });
        }

        let matrix = self.transition_matrix();
        let mut current: Vec<f64> = self
            .states
            .iter()
            .map(|s| initial.get(s).copied().unwrap_or(0.0))
            .collect();

        for _ in 0..steps {
            let mut next = vec![0.0; self.states.len()];
            for (i, &mass) in current.iter().enumerate() {
                if mass == 0.0 {
                    continue;
                }
                for (j, p) in matrix[i].iter().enumerate() {
                    next[j] += mass * p;
                }
            }
            current = next;
        }

        Ok(self.states.iter().cloned().zip(current).collect())
    }

    /// Flattens the dense matrix into model parameters named `"from->to"`.
    ///
    /// `goodness_of_fit` is the share of rows that sum to 1.
    pub fn to_parameters(&self) -> ModelParameters {
        let mut coefficients = Vec::with_capacity(self.states.len() * self.states.len());
        let mut variable_names = Vec::with_capacity(coefficients.capacity());
        for from in &self.states {
            for to in &self.states {
                coefficients.push(self.probability(from, to));
                variable_names.push(format!("{from}{TRANSITION_SEPARATOR}{to}"));
            }
        }

        let sums = self.row_sums();
        let stochastic = sums
            .iter()
            .filter(|s| (*s - 1.0).abs() < ROW_SUM_TOLERANCE)
            .count();
        let goodness_of_fit = if sums.is_empty() {
            0.0
        } else {
            stochastic as f64 / sums.len() as f64
        };

        ModelParameters {
            kind: ModelKind::Markov,
            coefficients,
            variable_names,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            goodness_of_fit,
        }
    }

    /// Rebuilds a chain from `"from->to"` parameters.
    ///
    /// # Errors
    ///
    /// [`AnalyticsError::UnsupportedModel`] for a non-Markov kind,
    /// [`AnalyticsError::MismatchedLength`] when names and coefficients
    /// differ in length, [`AnalyticsError::InvalidParameter`] for a name
    /// without the separator.
    pub fn from_parameters(params: &ModelParameters) -> Result<Self> {
        if params.kind != ModelKind::Markov {
            return Err(AnalyticsError::UnsupportedModel { kind: params.kind });
        }
        if params.variable_names.len() != params.coefficients.len() {
            return Err(AnalyticsError::MismatchedLength {
                left: params.variable_names.len(),
                right: params.coefficients.len(),
            });
        }

        let mut rows: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for (name, &p) in params.variable_names.iter().zip(&params.coefficients) {
            let (from, to) = name.split_once(TRANSITION_SEPARATOR).ok_or_else(|| {
                AnalyticsError::InvalidParameter {
                    message: format!("transition name {name:?} lacks \"{TRANSITION_SEPARATOR}\""),
                }
            })?;
            rows.entry(from.to_string())
                .or_default()
                .insert(to.to_string(), p);
        }
        Ok(markov_from_transitions(&rows))
    }
}

/// Builds a chain from nested `from → (to → probability)` maps.
///
/// States are the sorted union of every source and target.
pub fn markov_from_transitions(
    transitions: &BTreeMap<String, BTreeMap<String, f64>>,
) -> MarkovModel {
    let mut states = BTreeSet::new();
    let mut flat = BTreeMap::new();
    for (from, row) in transitions {
        states.insert(from.clone());
        for (to, &p) in row {
            states.insert(to.clone());
            flat.insert((from.clone(), to.clone()), p);
        }
    }

    let model = MarkovModel {
        states: states.into_iter().collect(),
        transitions: flat,
    };
    if !model.is_stochastic() {
        tracing::debug!(states = model.states.len(), "transition rows do not all sum to 1");
    }
    model
}

/// Estimates a chain from an observed state sequence by counting transitions.
///
/// Each row is normalized by the number of departures from that state; a
/// state never departed from (e.g. the final one) has no outgoing
/// transitions.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `observed` is empty.
pub fn markov_from_sequence<S: AsRef<str>>(observed: &[S]) -> Result<MarkovModel> {
    if observed.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            context: "markov state sequence",
        });
    }

    let mut counts: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for pair in observed.windows(2) {
        *counts
            .entry(pair[0].as_ref().to_string())
            .or_default()
            .entry(pair[1].as_ref().to_string())
            .or_default() += 1.0;
    }
    for row in counts.values_mut() {
        let departures: f64 = row.values().sum();
        for p in row.values_mut() {
            *p /= departures;
        }
    }

    let mut model = markov_from_transitions(&counts);
    for state in observed {
        if !model.contains(state.as_ref()) {
            model.states.push(state.as_ref().to_string());
            model.states.sort();
        }
    }
    Ok(model)
}

/// Walks the chain greedily from `current` for up to `steps` transitions.
///
/// Each step follows the most probable outgoing transition (ties go to the
/// first target in state order). A state with no outgoing transition is
/// absorbing and ends the walk early. The trace starts with `current` and
/// lists every state visited.
///
/// # Errors
///
/// [`AnalyticsError::UnknownState`] when `current` is not in the model.
pub fn markov_step(
    model: &MarkovModel,
    current: &str,
    steps: usize,
) -> Result<(String, Vec<String>)> {
    if !model.contains(current) {
        return Err(AnalyticsError::UnknownState {
            state: current.to_string(),
        });
    }

    let mut state = current.to_string();
    let mut trace = vec![state.clone()];
    for step in 0..steps {
        let next = model
            .outgoing(&state)
            .fold(None, |best: Option<(&str, f64)>, (to, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((to, p)),
            })
            .map(|(to, _)| to.to_string());

        let Some(next) = next else {
            tracing::warn!(state = %state, step, "absorbing state reached; stopping early");
            break;
        };
        state = next;
        trace.push(state.clone());
    }

    Ok((state, trace))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn posterior_sums_to_one(
            priors in proptest::collection::vec(0.01_f64..1.0, 1..=8),
            likes in proptest::collection::vec(0.01_f64..1.0, 8),
        ) {
            let prior: BTreeMap<String, f64> = priors
                .iter()
                .enumerate()
                .map(|(i, &p)| (format!("o{i}"), p))
                .collect();
            let pairs: Vec<(String, f64)> = likes
                .iter()
                .enumerate()
                .map(|(i, &l)| (format!("o{i}"), l))
                .collect();
            let m = bayesian_posterior(&prior, &pairs);
            let total: f64 = m.posterior.values().sum();
            prop_assert!((total - 1.0).abs() < 1e-9, "total = {total}");
        }

        #[test]
        fn greedy_walk_length_bounded(steps in 0_usize..20) {
            let transitions = BTreeMap::from([
                ("a".to_string(), BTreeMap::from([("b".to_string(), 0.7), ("a".to_string(), 0.3)])),
                ("b".to_string(), BTreeMap::from([("a".to_string(), 0.8), ("b".to_string(), 0.2)])),
            ]);
            let chain = markov_from_transitions(&transitions);
            let (_, trace) = markov_step(&chain, "a", steps).expect("step");
            prop_assert_eq!(trace.len(), steps + 1);
        }
    }
}
