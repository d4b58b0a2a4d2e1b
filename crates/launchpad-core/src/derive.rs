//! Derivation of canonical training arguments from convenience ones.
//!
//! Operators describe run length in tokens and the decay window as a fraction;
//! the training process only understands iteration/sample counts.

use crate::error::{ConstraintViolation, SweepError, SweepResult};
use crate::params::{ParamMap, ParamValue};

pub const TRAIN_ITERS: &str = "train_iters";
pub const TRAIN_SAMPLES: &str = "train_samples";
pub const TRAIN_TOKENS: &str = "train_tokens";
pub const LR_DECAY_ITERS: &str = "lr_decay_iters";
pub const LR_DECAY_SAMPLES: &str = "lr_decay_samples";
pub const LR_DECAY_FRACTION: &str = "lr_decay_fraction";
pub const LR_WSD_DECAY_ITERS: &str = "lr_wsd_decay_iters";
pub const LR_WSD_DECAY_SAMPLES: &str = "lr_wsd_decay_samples";
pub const SEQ_LENGTH: &str = "seq_length";
pub const GLOBAL_BATCH_SIZE: &str = "global_batch_size";

/// Keys consumed here that the training process itself does not accept.
pub const CONVENIENCE_KEYS: [&str; 2] = [TRAIN_TOKENS, LR_DECAY_FRACTION];

const LENGTH_GROUP: (&str, [&str; 3]) = ("training length", [TRAIN_ITERS, TRAIN_SAMPLES, TRAIN_TOKENS]);
const DECAY_GROUP: (&str, [&str; 3]) = ("decay length", [LR_DECAY_ITERS, LR_DECAY_SAMPLES, LR_DECAY_FRACTION]);

fn exactly_one(config: &ParamMap, (group, members): (&'static str, [&'static str; 3])) -> Option<ConstraintViolation> {
    let present: Vec<String> =
        members.iter().filter(|key| config.contains_key(key)).map(|key| (*key).to_string()).collect();

    if present.len() == 1 {
        None
    } else {
        Some(ConstraintViolation { group, members: members.to_vec(), present })
    }
}

fn strip_grouping(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '_' | ',')).collect::<String>().trim().to_string()
}

/// Parse a non-negative integer count, tolerating grouping separators.
fn parse_count(key: &str, value: &ParamValue) -> SweepResult<u64> {
    match value {
        ParamValue::Int(i) => u64::try_from(*i).map_err(|_| SweepError::parse(key, value, "must not be negative")),
        ParamValue::Float(x) if x.is_finite() && *x >= 0.0 && x.fract() == 0.0 => Ok(*x as u64),
        ParamValue::Str(s) => strip_grouping(s)
            .parse::<u64>()
            .map_err(|e| SweepError::parse(key, value, format!("expected an integer ({e})"))),
        ParamValue::Null => Err(SweepError::MissingValue { key: key.to_string() }),
        _ => Err(SweepError::parse(key, value, "expected a single non-negative integer")),
    }
}

fn parse_fraction(key: &str, value: &ParamValue) -> SweepResult<f64> {
    let fraction = match value {
        ParamValue::Int(i) => *i as f64,
        ParamValue::Float(x) => *x,
        ParamValue::Str(s) => {
            s.trim().parse::<f64>().map_err(|e| SweepError::parse(key, value, format!("expected a number ({e})")))?
        }
        _ => return Err(SweepError::parse(key, value, "expected a single number")),
    };

    if (0.0..=1.0).contains(&fraction) {
        Ok(fraction)
    } else {
        Err(SweepError::parse(key, value, "must be within [0, 1]"))
    }
}

fn required_count(config: &ParamMap, key: &str) -> SweepResult<u64> {
    let value = config.get(key).ok_or_else(|| SweepError::MissingValue { key: key.to_string() })?;
    parse_count(key, value)
}

fn count_value(key: &str, count: u64) -> SweepResult<ParamValue> {
    i64::try_from(count).map(ParamValue::Int).map_err(|_| SweepError::parse(key, count, "exceeds the supported range"))
}

/// Rewrite convenience arguments into the canonical ones.
///
/// The input is left untouched; on error no partially derived map escapes.
pub fn derive_canonical(raw: &ParamMap) -> SweepResult<ParamMap> {
    let violations: Vec<ConstraintViolation> =
        [exactly_one(raw, LENGTH_GROUP), exactly_one(raw, DECAY_GROUP)].into_iter().flatten().collect();
    if !violations.is_empty() {
        return Err(SweepError::Constraint { violations });
    }

    let mut config = raw.clone();

    if let Some(tokens) = config.remove(TRAIN_TOKENS) {
        let tokens = parse_count(TRAIN_TOKENS, &tokens)?;
        let seq_length = required_count(&config, SEQ_LENGTH)?;
        let global_batch_size = required_count(&config, GLOBAL_BATCH_SIZE)?;
        let tokens_per_step = seq_length
            .checked_mul(global_batch_size)
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                SweepError::parse(
                    TRAIN_TOKENS,
                    tokens,
                    format!("{SEQ_LENGTH} * {GLOBAL_BATCH_SIZE} must be a positive integer"),
                )
            })?;
        let iters = tokens.div_ceil(tokens_per_step);
        tracing::debug!(tokens, tokens_per_step, iters, "derived train_iters from train_tokens");
        config.insert(TRAIN_ITERS, count_value(TRAIN_ITERS, iters)?);
    }

    if let Some(fraction) = config.remove(LR_DECAY_FRACTION) {
        let fraction = parse_fraction(LR_DECAY_FRACTION, &fraction)?;
        if config.contains_key(TRAIN_SAMPLES) {
            let samples = required_count(&config, TRAIN_SAMPLES)?;
            let decay = (samples as f64 * fraction).floor() as u64;
            config.insert(LR_DECAY_SAMPLES, count_value(LR_DECAY_SAMPLES, decay)?);
        } else if config.contains_key(TRAIN_ITERS) {
            let iters = required_count(&config, TRAIN_ITERS)?;
            let decay = (iters as f64 * fraction).floor() as u64;
            config.insert(LR_DECAY_ITERS, count_value(LR_DECAY_ITERS, decay)?);
        }
    }

    // The WSD schedule reads its decay window from separate arguments.
    if let Some(iters) = config.get(LR_DECAY_ITERS).cloned() {
        config.insert(LR_WSD_DECAY_ITERS, iters);
    } else if let Some(samples) = config.get(LR_DECAY_SAMPLES).cloned() {
        config.insert(LR_WSD_DECAY_SAMPLES, samples);
    }

    Ok(config)
}
