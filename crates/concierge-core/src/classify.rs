//! Pattern-based query classification.
//!
//! A query is lower-cased and trimmed, then tested against an ordered list
//! of rules. Each rule is a set of substrings; the first rule with any
//! substring contained anywhere in the query decides the class. Matching
//! is not token-aware, so `"투자자"` matches the `"투자"` signal.
//!
//! Rule order is the precedence:
//! `property > investment > company > protocol_tech > general > unknown`.

use crate::models::QueryClass;

/// Ordered classification rules. Earlier rules win.
pub const RULES: &[(QueryClass, &[&str])] = &[
    (
        QueryClass::Property,
        &[
            "부동산",
            "매물",
            "건물",
            "오피스",
            "아파트",
            "빌딩",
            "상가",
            "오피스텔",
            "property",
            "properties",
            "real estate",
            "building",
            "apartment",
        ],
    ),
    (
        QueryClass::Investment,
        &[
            "투자",
            "수익",
            "배당",
            "토큰",
            "금액",
            "invest",
            "return",
            "dividend",
            "yield",
            "token",
        ],
    ),
    (
        QueryClass::Company,
        &["회사", "기업", "브랜드", "팀", "company", "brand", "team"],
    ),
    (
        QueryClass::ProtocolTech,
        &[
            "블록체인",
            "프로토콜",
            "스마트 컨트랙트",
            "스마트컨트랙트",
            "보안",
            "감사",
            "blockchain",
            "protocol",
            "smart contract",
            "security",
            "audit",
        ],
    ),
    (
        QueryClass::General,
        &[
            "무엇", "뭐", "어떻게", "왜", "언제", "어디", "누가", "얼마", "what", "how", "why",
            "when", "where", "who", "?",
        ],
    ),
];

/// Assign a topic bucket to a raw query.
///
/// Pure and allocation-light; safe to call from any number of threads.
pub fn classify(query: &str) -> QueryClass {
    let normalized = query.trim().to_lowercase();
    if normalized.is_empty() {
        return QueryClass::Unknown;
    }

    RULES
        .iter()
        .find(|(_, signals)| signals.iter().any(|s| normalized.contains(s)))
        .map(|(class, _)| *class)
        .unwrap_or(QueryClass::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_investment_question_is_investment() {
        assert_eq!(classify("최소 투자 금액은 얼마인가요?"), QueryClass::Investment);
    }

    #[test]
    fn test_property_beats_investment() {
        assert_eq!(classify("강남 오피스 투자 수익률"), QueryClass::Property);
        assert_eq!(classify("real estate token"), QueryClass::Property);
    }

    #[test]
    fn test_investment_beats_company() {
        assert_eq!(classify("회사 배당 정책"), QueryClass::Investment);
    }

    #[test]
    fn test_company_beats_protocol() {
        assert_eq!(classify("team behind the protocol"), QueryClass::Company);
    }

    #[test]
    fn test_protocol_tech() {
        assert_eq!(classify("블록체인 기술"), QueryClass::ProtocolTech);
        assert_eq!(classify("Smart Contract audit"), QueryClass::ProtocolTech);
    }

    #[test]
    fn test_general_question() {
        assert_eq!(classify("가입은 어떻게 하나요"), QueryClass::General);
        assert_eq!(classify("anything else?"), QueryClass::General);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify("xyzzy unrelated nonsense"), QueryClass::Unknown);
        assert_eq!(classify("   "), QueryClass::Unknown);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(classify("   INVESTMENT options  "), QueryClass::Investment);
    }

    #[test]
    fn test_substring_not_token_boundary() {
        // "teamwork" contains "team"
        assert_eq!(classify("teamwork"), QueryClass::Company);
        assert_eq!(classify("투자자 모집"), QueryClass::Investment);
    }

    #[test]
    fn test_rules_in_precedence_order() {
        let order: Vec<QueryClass> = RULES.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            order,
            vec![
                QueryClass::Property,
                QueryClass::Investment,
                QueryClass::Company,
                QueryClass::ProtocolTech,
                QueryClass::General,
            ]
        );
    }
}
