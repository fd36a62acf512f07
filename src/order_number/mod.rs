// 订单号
// 格式：3 位大写咖啡馆前缀 + 6 位序列号，例如 CHA000001

mod sequence;

use serde::Serialize;
use uuid::Uuid;

use crate::rate_limit::Clock;

pub use sequence::{RpcSequenceSource, SequenceError, SequenceSource};

const PREFIX_LEN: usize = 3;
const SEQUENCE_LEN: usize = 6;
const UNKNOWN_PREFIX: &str = "UNK";
const LEGACY_MARK: &str = "LEGACY";
const LEGACY_RANDOM_LEN: usize = 8;

/// 订单号生成结果
#[derive(Debug)]
pub enum OrderOutcome {
    /// 远端序列生成的订单号
    Sequenced(String),
    /// 远端失败时的降级订单号
    Fallback {
        order_number: String,
        reason: SequenceError,
    },
}

impl OrderOutcome {
    pub fn order_number(&self) -> &str {
        match self {
            OrderOutcome::Sequenced(order_number) => order_number,
            OrderOutcome::Fallback { order_number, .. } => order_number,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, OrderOutcome::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&SequenceError> {
        match self {
            OrderOutcome::Sequenced(_) => None,
            OrderOutcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// 生成当日订单号，远端失败时降级为 legacy 格式，不会返回错误
pub async fn generate_daily_order_number(
    source: &dyn SequenceSource,
    clock: &dyn Clock,
    cafe_id: Uuid,
) -> OrderOutcome {
    let reason = match source.next_order_number(cafe_id).await {
        Ok(reply) => {
            let reply = reply.trim();
            if is_valid_daily_order_number(reply) {
                return OrderOutcome::Sequenced(reply.to_owned());
            }
            SequenceError::Malformed(reply.to_owned())
        }
        Err(e) => e,
    };

    tracing::warn!(
        "Order sequence unavailable for cafe {}, using legacy order number: {}",
        cafe_id,
        reason
    );
    OrderOutcome::Fallback {
        order_number: legacy_order_number(clock.now_ms()),
        reason,
    }
}

/// LEGACY-{时间戳}-{8 位大写字母数字}-LEGACY
pub fn legacy_order_number(now_ms: i64) -> String {
    let random: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(LEGACY_RANDOM_LEN)
        .collect();
    format!(
        "{LEGACY_MARK}-{}-{}-{LEGACY_MARK}",
        now_ms.max(0),
        random.to_uppercase()
    )
}

pub fn is_valid_daily_order_number(order_number: &str) -> bool {
    let bytes = order_number.as_bytes();
    if bytes.len() != PREFIX_LEN + SEQUENCE_LEN {
        return false;
    }
    let (prefix, sequence) = bytes.split_at(PREFIX_LEN);
    prefix.iter().all(u8::is_ascii_uppercase) && sequence.iter().all(u8::is_ascii_digit)
}

pub fn is_legacy_order_number(order_number: &str) -> bool {
    let Some(body) = order_number
        .strip_prefix("LEGACY-")
        .and_then(|rest| rest.strip_suffix("-LEGACY"))
    else {
        return false;
    };
    let Some((timestamp, random)) = body.split_once('-') else {
        return false;
    };

    !timestamp.is_empty()
        && timestamp.bytes().all(|b| b.is_ascii_digit())
        && random.len() == LEGACY_RANDOM_LEN
        && random
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// 订单号中的咖啡馆前缀，格式不合法时返回 "UNK"
pub fn cafe_prefix(order_number: &str) -> &str {
    if is_valid_daily_order_number(order_number) {
        &order_number[..PREFIX_LEN]
    } else {
        UNKNOWN_PREFIX
    }
}

/// 订单号中的序列号，格式不合法时返回 0
pub fn sequence_number(order_number: &str) -> u32 {
    if !is_valid_daily_order_number(order_number) {
        return 0;
    }
    order_number[PREFIX_LEN..].parse().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedOrderNumber {
    pub order_number: String,
    pub valid: bool,
    pub legacy: bool,
    pub cafe_prefix: String,
    pub sequence: u32,
}

impl ParsedOrderNumber {
    pub fn parse(order_number: &str) -> Self {
        Self {
            order_number: order_number.to_owned(),
            valid: is_valid_daily_order_number(order_number),
            legacy: is_legacy_order_number(order_number),
            cafe_prefix: cafe_prefix(order_number).to_owned(),
            sequence: sequence_number(order_number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::ManualClock;
    use async_trait::async_trait;

    struct FixedReply(&'static str);

    #[async_trait]
    impl SequenceSource for FixedReply {
        async fn next_order_number(&self, _cafe_id: Uuid) -> Result<String, SequenceError> {
            Ok(self.0.to_owned())
        }
    }

    struct Unavailable;

    #[async_trait]
    impl SequenceSource for Unavailable {
        async fn next_order_number(&self, _cafe_id: Uuid) -> Result<String, SequenceError> {
            Err(SequenceError::Status(503))
        }
    }

    #[test]
    fn validates_daily_format() {
        assert!(is_valid_daily_order_number("CHA000001"));
        assert!(is_valid_daily_order_number("FCT999999"));
        assert!(!is_valid_daily_order_number("cha000001"));
        assert!(!is_valid_daily_order_number("CHA00001"));
        assert!(!is_valid_daily_order_number("CHA0000012"));
        assert!(!is_valid_daily_order_number("CH1000001"));
        assert!(!is_valid_daily_order_number("ÄBC000001"));
        assert!(!is_valid_daily_order_number(""));
    }

    #[test]
    fn extracts_prefix_and_sequence() {
        for order_number in ["CHA000001", "COO000120", "FCT123456"] {
            assert_eq!(cafe_prefix(order_number), &order_number[..3]);
            assert_eq!(
                sequence_number(order_number),
                order_number[3..].parse::<u32>().unwrap()
            );
        }
    }

    #[test]
    fn invalid_numbers_yield_sentinels() {
        assert_eq!(cafe_prefix("LEGACY-1-ABCDEFGH-LEGACY"), "UNK");
        assert_eq!(sequence_number("LEGACY-1-ABCDEFGH-LEGACY"), 0);
        assert_eq!(cafe_prefix("CH"), "UNK");
        assert_eq!(sequence_number("CHA12345X"), 0);
    }

    #[test]
    fn legacy_numbers_match_their_pattern() {
        let order_number = legacy_order_number(1_718_000_000_000);
        assert!(order_number.starts_with("LEGACY-1718000000000-"));
        assert!(is_legacy_order_number(&order_number));
        assert!(!is_valid_daily_order_number(&order_number));

        assert!(!is_legacy_order_number("LEGACY--ABCDEFGH-LEGACY"));
        assert!(!is_legacy_order_number("LEGACY-12-abcdefgh-LEGACY"));
        assert!(!is_legacy_order_number("LEGACY-12-ABCDEFG-LEGACY"));
        assert!(!is_legacy_order_number("CHA000001"));
    }

    #[test]
    fn parsed_summary() {
        let parsed = ParsedOrderNumber::parse("CHA000042");
        assert!(parsed.valid);
        assert!(!parsed.legacy);
        assert_eq!(parsed.cafe_prefix, "CHA");
        assert_eq!(parsed.sequence, 42);
    }

    #[tokio::test]
    async fn remote_number_is_used_when_valid() {
        let outcome =
            generate_daily_order_number(&FixedReply("CHA000007"), &ManualClock::new(0), Uuid::new_v4())
                .await;
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.order_number(), "CHA000007");
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_legacy() {
        let clock = ManualClock::new(1_718_000_123_456);
        let outcome = generate_daily_order_number(&Unavailable, &clock, Uuid::new_v4()).await;
        assert!(outcome.is_fallback());
        assert!(is_legacy_order_number(outcome.order_number()));
        assert!(outcome.order_number().starts_with("LEGACY-1718000123456-"));
        assert!(matches!(
            outcome.fallback_reason(),
            Some(SequenceError::Status(503))
        ));
    }

    #[tokio::test]
    async fn malformed_reply_falls_back_to_legacy() {
        for reply in ["", "cha1", "CHA0000001"] {
            let outcome =
                generate_daily_order_number(&FixedReply(reply), &ManualClock::new(0), Uuid::new_v4())
                    .await;
            assert!(is_legacy_order_number(outcome.order_number()));
            assert!(matches!(
                outcome.fallback_reason(),
                Some(SequenceError::Malformed(_))
            ));
        }
    }
}
