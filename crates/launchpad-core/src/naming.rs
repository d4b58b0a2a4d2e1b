use crate::params::ParamMap;

fn sanitize(value: &str) -> String {
    value.replace(['.', '-'], "_")
}

/// Deterministic job name: `base` followed by `<key><value>` for every swept
/// key present in `config`, joined with `_`.
///
/// `run` + `{lr: 0.01, bsz: 32}` swept over `[lr, bsz]` gives `run_lr0_01_bsz32`.
pub fn job_name<S: AsRef<str>>(base: &str, config: &ParamMap, sweep_keys: &[S]) -> String {
    let mut parts = vec![base.to_string()];
    for key in sweep_keys {
        let key = key.as_ref();
        if let Some(value) = config.get(key) {
            parts.push(format!("{key}{}", sanitize(&value.to_string())));
        }
    }
    parts.join("_")
}
