//! 编码器属性测试
//!
//! 使用proptest验证转义与路径规范化的不变量

#[cfg(test)]
mod tests {
    use crate::bindings::protocol::{
        decode_literal, escape_literal, normalize_path, Command, HostResult, SENTINEL,
    };
    use proptest::prelude::*;

    // 偏向于引号、反斜杠和换行的字符串
    fn tricky_string() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just('\\'),
                Just('"'),
                Just('\r'),
                Just('\n'),
                Just('/'),
                Just(' '),
                any::<char>(),
            ],
            0..48,
        )
        .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        #[test]
        fn escape_round_trips(s in tricky_string()) {
            let escaped = escape_literal(&s);
            prop_assert_eq!(decode_literal(&escaped), Some(s));
        }

        #[test]
        fn escaped_literal_has_no_raw_breakers(s in tricky_string()) {
            let escaped = escape_literal(&s);
            prop_assert!(!escaped.contains('\r'));
            prop_assert!(!escaped.contains('\n'));
            // 每个引号前面都有奇数个反斜杠
            let bytes = escaped.as_bytes();
            for (i, b) in bytes.iter().enumerate() {
                if *b == b'"' {
                    let slashes = bytes[..i].iter().rev().take_while(|c| **c == b'\\').count();
                    prop_assert!(slashes % 2 == 1);
                }
            }
        }

        #[test]
        fn normalized_paths_use_forward_slashes(p in tricky_string()) {
            let normalized = normalize_path(&p);
            prop_assert!(!normalized.contains('\\'));
            prop_assert_eq!(normalize_path(&normalized), normalized);
        }

        #[test]
        fn expression_embeds_every_argument(args in prop::collection::vec(tricky_string(), 0..4)) {
            let mut cmd = Command::new("KitchenSink.addMarkerAtPlayhead").unwrap();
            for arg in &args {
                cmd = cmd.arg(arg.clone());
            }
            let expr = cmd.to_expression();
            prop_assert!(expr.starts_with("KitchenSink.addMarkerAtPlayhead("));
            prop_assert!(expr.ends_with(')'));
            prop_assert!(!expr.contains('\n'));
        }

        #[test]
        fn failure_wire_round_trips(message in "[^\r\n]{0,40}") {
            let result = HostResult::failure(message.trim_start());
            let wire = result.to_wire();
            prop_assert!(wire.starts_with(SENTINEL));
            prop_assert_eq!(HostResult::from_wire(&wire), result);
        }

        #[test]
        fn non_sentinel_text_is_success(payload in "[^E].{0,40}") {
            prop_assert_eq!(HostResult::from_wire(&payload), HostResult::success(payload.clone()));
        }
    }
}
