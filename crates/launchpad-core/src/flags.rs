//! Rendering of one expanded configuration as command-line flags.

use crate::error::{SweepError, SweepResult};
use crate::params::{ParamMap, ParamValue};

/// `global_batch_size` -> `--global-batch-size`.
pub fn flag_name(key: &str) -> String {
    format!("--{}", key.to_lowercase().replace('_', "-"))
}

/// Render `config` as flag tokens, in configuration order.
///
/// Booleans are presence-only, empty lists are dropped and a null value is
/// an error since the training process has no implicit defaults here.
pub fn to_flags(config: &ParamMap) -> SweepResult<Vec<String>> {
    let mut flags = Vec::with_capacity(config.len());

    for (key, value) in config.iter() {
        let flag = flag_name(key);
        match value {
            ParamValue::Null => return Err(SweepError::MissingValue { key: key.to_string() }),
            ParamValue::Bool(true) => flags.push(flag),
            ParamValue::Bool(false) => {}
            ParamValue::List(items) if items.is_empty() => {}
            ParamValue::List(items) => {
                let mut token = flag;
                for item in items {
                    token.push(' ');
                    token.push_str(&item.to_string());
                }
                flags.push(token);
            }
            scalar => flags.push(format!("{flag} {scalar}")),
        }
    }

    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_name() {
        assert_eq!(flag_name("global_batch_size"), "--global-batch-size");
        assert_eq!(flag_name("Use_Flash_Attn"), "--use-flash-attn");
    }

    #[test]
    fn test_to_flags_by_value_kind() {
        let config: ParamMap = [
            ("num_layers", ParamValue::Int(24)),
            ("bf16", ParamValue::Bool(true)),
            ("fp16", ParamValue::Bool(false)),
            ("data_path", ParamValue::from(vec!["0.7", "/data/a", "0.3", "/data/b"])),
            ("eval_ranks", ParamValue::List(vec![])),
            ("lr", ParamValue::Float(0.0003)),
            ("tokenizer_type", ParamValue::from("GPT2BPETokenizer")),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            to_flags(&config).unwrap(),
            vec![
                "--num-layers 24",
                "--bf16",
                "--data-path 0.7 /data/a 0.3 /data/b",
                "--lr 0.0003",
                "--tokenizer-type GPT2BPETokenizer",
            ]
        );
    }

    #[test]
    fn test_to_flags_rejects_null() {
        let config: ParamMap = [("lr", ParamValue::Float(0.1)), ("load", ParamValue::Null)].into_iter().collect();
        let err = to_flags(&config).unwrap_err();
        assert!(matches!(err, SweepError::MissingValue { ref key } if key == "load"));
    }

    #[test]
    fn test_flags_parse_back_to_scalars() {
        let config: ParamMap = [
            ("seq_length", ParamValue::Int(4096)),
            ("lr", ParamValue::Float(0.00025)),
            ("save", ParamValue::from("/ckpt/run")),
        ]
        .into_iter()
        .collect();

        let parsed: Vec<(String, String)> = to_flags(&config)
            .unwrap()
            .iter()
            .map(|token| {
                let (flag, value) = token.split_once(' ').unwrap();
                (flag.trim_start_matches("--").replace('-', "_"), value.to_string())
            })
            .collect();

        let expected: Vec<(String, String)> = config.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        assert_eq!(parsed, expected);
        assert_eq!(parsed[1].1.parse::<f64>().unwrap(), 0.00025);
    }
}
