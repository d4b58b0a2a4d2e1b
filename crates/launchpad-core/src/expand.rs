//! Cartesian expansion of swept arguments.

use crate::params::{ParamMap, ParamValue};

/// Expand `config` over every swept, sequence-valued key.
///
/// Keys are visited in configuration order, so the swept key that comes first
/// in the configuration is the outermost loop. Unswept keys and swept scalars
/// keep their value as is. Sweep keys that name no configuration key are ignored.
pub fn expand_sweep<S: AsRef<str>>(config: &ParamMap, sweep_keys: &[S]) -> Vec<ParamMap> {
    if sweep_keys.is_empty() {
        return vec![config.clone()];
    }

    let is_swept = |key: &str| sweep_keys.iter().any(|s| s.as_ref() == key);
    for key in sweep_keys {
        if !config.contains_key(key.as_ref()) {
            tracing::debug!(key = key.as_ref(), "sweep key not present in training arguments; ignoring");
        }
    }

    let mut combos = vec![ParamMap::new()];
    for (key, value) in config.iter() {
        let pool: &[ParamValue] = match value.as_list() {
            Some(items) if is_swept(key) => items,
            _ => std::slice::from_ref(value),
        };

        combos = combos
            .into_iter()
            .flat_map(|partial| {
                pool.iter().map(move |choice| {
                    let mut next = partial.clone();
                    next.insert(key, choice.clone());
                    next
                })
            })
            .collect();
    }

    combos
}
