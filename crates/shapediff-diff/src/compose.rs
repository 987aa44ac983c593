//! The composer: rewrites a patch into an equivalent normal form.
//!
//! Normal form is a left-leaning `AndThen` chain with no `Empty` steps, no
//! updates whose nested patch is empty, and no adjacent steps that can be
//! fused:
//!
//! - `ArrayAppend(a) ; ArrayAppend(b)` becomes `ArrayAppend(a ++ b)`
//! - `ArraySlice(a, b) ; ArraySlice(c, d)` becomes `ArraySlice(a + c, a + d)`
//!   when the second range lies inside the first and the offsets fit a `usize`
//! - two updates of the same field or index merge their nested patches
//! - anything followed by `Replace(v)` is just `Replace(v)`
//!
//! Normalization never changes what a patch does to a value it applies to.

use std::mem;

use shapediff_types::Patch;
use tracing::debug;

/// Rewrite `patch` into normal form.
pub fn normalize(patch: Patch) -> Patch {
    let before = patch.steps().len();
    let normalized = normalize_chain(patch);
    debug!(before, after = normalized.steps().len(), "normalized patch");
    normalized
}

fn normalize_chain(patch: Patch) -> Patch {
    let mut out: Vec<Patch> = Vec::new();
    for step in patch.into_steps() {
        if let Some(step) = prune(step) {
            push_fused(&mut out, step);
        }
    }
    Patch::sequence(out)
}

/// Normalize the nested patch of a single step. `None` if the step is an
/// identity.
fn prune(mut step: Patch) -> Option<Patch> {
    match &mut step {
        Patch::StructUpdate { patch, .. } | Patch::ArrayUpdate { patch, .. } => {
            **patch = normalize_chain(mem::take(&mut **patch));
            if patch.is_empty() {
                return None;
            }
        }
        Patch::StructAdd { patch, .. } => **patch = normalize_chain(mem::take(&mut **patch)),
        Patch::ArrayAppend { values } if values.is_empty() => return None,
        _ => {}
    }
    Some(step)
}

fn push_fused(out: &mut Vec<Patch>, mut step: Patch) {
    if matches!(step, Patch::Replace { .. }) {
        out.clear();
        out.push(step);
        return;
    }
    while let Some(mut last) = out.pop() {
        if !fuse(&mut last, &mut step) {
            out.push(last);
            break;
        }
        if is_identity(&last) {
            return;
        }
        step = last;
    }
    out.push(step);
}

/// Fold `next` into `last` when the pair can be written as one step.
/// Returns `false`, with both untouched, when it cannot.
fn fuse(last: &mut Patch, next: &mut Patch) -> bool {
    match (last, next) {
        (Patch::ArrayAppend { values: a }, Patch::ArrayAppend { values: b }) => {
            a.append(b);
            true
        }
        (Patch::ArraySlice { from: a, until: b }, Patch::ArraySlice { from: c, until: d }) => {
            // Offsets past usize::MAX cannot be expressed; leave such slices apart.
            match (a.checked_add(*c), a.checked_add(*d)) {
                (Some(from), Some(until)) if *c <= *d && until <= *b => {
                    *a = from;
                    *b = until;
                    true
                }
                _ => false,
            }
        }
        (Patch::StructUpdate { path: p, patch: x }, Patch::StructUpdate { path: q, patch: y }) if p == q => {
            merge(x, y);
            true
        }
        (Patch::ArrayUpdate { index: i, patch: x }, Patch::ArrayUpdate { index: j, patch: y }) if i == j => {
            merge(x, y);
            true
        }
        _ => false,
    }
}

fn merge(into: &mut Patch, next: &mut Patch) {
    let merged = mem::take(into).and_then(mem::take(next));
    *into = normalize_chain(merged);
}

fn is_identity(step: &Patch) -> bool {
    match step {
        Patch::StructUpdate { patch, .. } | Patch::ArrayUpdate { patch, .. } => patch.is_empty(),
        other => other.is_empty(),
    }
}
