//! Operator privacy and ordering for the per-operator charts.
//!
//! With names hidden, every operator except the viewer is shown as
//! "Operador N". The viewer's own row is pulled out of the ranking and
//! reinserted near the middle so its position reveals nothing.
//!
//! Viewer identification is best effort. An explicit operator mapping on the
//! identity wins; otherwise the email local part is matched against the
//! operator name heuristically. No path here returns an error: a failed match
//! means pseudonymized names and the original order.

use crate::{
    aggregate::{OperatorMetric, SortKey},
    dark_list::match_key,
};
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Characters of the normalized name the email local part must contain.
const NAME_PREFIX_LEN: usize = 5;

/// Insertion index cap for the viewer's row.
const MAX_VIEWER_POSITION: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerIdentity {
    pub email: Option<String>,
    /// Exact operator name from the identity provider, when it has one.
    #[serde(default)]
    pub operator_name: Option<String>,
}

impl ViewerIdentity {
    pub fn from_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            operator_name: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_operator(mut self, operator_name: impl Into<String>) -> Self {
        self.operator_name = Some(operator_name.into());
        self
    }

    fn email_local_part(&self) -> Option<String> {
        let email = self.email.as_deref()?.trim();
        let local = email.split('@').next().unwrap_or(email).to_lowercase();
        (!local.is_empty()).then_some(local)
    }
}

/// Does `operator_name` belong to the signed-in viewer?
pub fn is_viewer_operator(operator_name: Option<&str>, viewer: &ViewerIdentity) -> bool {
    let Some(name) = operator_name.map(str::trim).filter(|n| !n.is_empty()) else {
        return false;
    };
    if viewer.email.is_none() {
        return false;
    }

    if let Some(mapped) = viewer.operator_name.as_deref() {
        return match_key(mapped.trim()) == match_key(name);
    }

    let Some(local) = viewer.email_local_part() else {
        return false;
    };
    let normalized = normalize_operator_name(name);
    if normalized.is_empty() {
        return false;
    }

    let prefix: String = normalized.chars().take(NAME_PREFIX_LEN).collect();
    normalized.contains(&local) || local.contains(&prefix)
}

/// Name to render for the operator at `index` of the displayed list.
pub fn display_name(
    operator_name: &str,
    index: usize,
    viewer: &ViewerIdentity,
    hide_names: bool,
) -> String {
    if !hide_names || is_viewer_operator(Some(operator_name), viewer) {
        return operator_name.to_string();
    }
    pseudonym(index)
}

pub fn pseudonym(index: usize) -> String {
    format!("Operador {}", index + 1)
}

/// Rank the other operators by `sort_key` (descending, stable) and place the
/// viewer's row at `min(3, others / 2)`. Returns the input unchanged when the
/// viewer cannot be found.
pub fn prioritize_viewer_in_middle(
    metrics: &[OperatorMetric],
    viewer: &ViewerIdentity,
    sort_key: &SortKey,
) -> Vec<OperatorMetric> {
    if metrics.is_empty() || viewer.email.is_none() {
        return metrics.to_vec();
    }

    let Some(viewer_index) = metrics
        .iter()
        .position(|m| is_viewer_operator(Some(&m.operator_name), viewer))
    else {
        log::debug!("privacy: viewer not matched to any of {} operators", metrics.len());
        return metrics.to_vec();
    };

    let mut others = metrics.to_vec();
    let own = others.remove(viewer_index);
    others.sort_by(|a, b| sort_key.value(b).total_cmp(&sort_key.value(a)));

    let position = MAX_VIEWER_POSITION.min(others.len() / 2);
    others.insert(position, own);
    others
}

/// Decompose, drop accents, lowercase, keep ASCII letters only.
pub fn normalize_operator_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphabetic())
        .collect()
}
