//! Response formatting: turns the top ranked item (or its absence) into the
//! text shown to the user.
//!
//! Two branches, always exactly one taken:
//!
//! - **Match**: the first [`RankedResult`] is phrased according to its
//!   [`ContentKind`]; provenance is attached when the item has a URL.
//! - **Fallback**: nothing scored above zero, so a canned message keyed by
//!   the query's [`QueryClass`] is returned without provenance.
//!
//! The catastrophic-failure reply ([`APOLOGY`]) is defined here as well so
//! that every user-visible string lives in one place; the application's
//! responder decides when to use it.

use chrono::{DateTime, Utc};

use crate::models::{ChatResponse, ContentItem, ContentKind, QueryClass, Sender};
use crate::rank::RankedResult;

/// Appended to article excerpts.
pub const ELLIPSIS: &str = "...";

/// Returned when the pipeline itself fails.
pub const APOLOGY: &str =
    "죄송합니다. 답변을 준비하는 중 문제가 발생했습니다. 잠시 후 다시 시도해 주세요.";

const FALLBACK_PROPERTY: &str = "조건에 맞는 매물 정보를 찾지 못했습니다. 관심 있는 지역이나 건물 유형을 알려주시면 더 정확하게 안내해 드릴게요.";
const FALLBACK_INVESTMENT: &str = "투자 관련 문의는 투자 가이드에서 자세히 확인하실 수 있습니다. 최소 투자 금액, 예상 수익률, 배당 일정처럼 궁금한 점을 구체적으로 물어봐 주세요.";
const FALLBACK_COMPANY: &str = "저희는 부동산 자산을 블록체인 기반 디지털 증권으로 나누어 누구나 소액으로 투자할 수 있게 하는 플랫폼입니다. 회사 소개 페이지에서 더 많은 정보를 확인해 보세요.";
const FALLBACK_PROTOCOL: &str = "플랫폼은 블록체인 프로토콜 위에서 동작하며, 소유권 이전과 배당 내역은 모두 스마트 컨트랙트로 기록됩니다. 기술 문서에서 자세한 내용을 확인하실 수 있습니다.";
const FALLBACK_GREETING: &str = "안녕하세요! 부동산 조각 투자 상담 도우미입니다. 매물 정보, 투자 방법, 수익 구조, 회사 소개 등 궁금한 점을 편하게 물어봐 주세요.";

/// Formatting knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeSettings {
    /// Article excerpt budget in characters (not bytes).
    pub excerpt_chars: usize,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self { excerpt_chars: 150 }
    }
}

/// The composed answer before an id and timestamp are stamped on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source_url: Option<String>,
    pub source_title: Option<String>,
    /// Id of the item the answer came from, `None` for fallback/apology.
    pub matched_id: Option<String>,
}

impl Reply {
    pub fn apology() -> Self {
        Self {
            text: APOLOGY.to_string(),
            source_url: None,
            source_title: None,
            matched_id: None,
        }
    }

    pub fn into_response(self, id: i64, timestamp: DateTime<Utc>) -> ChatResponse {
        ChatResponse {
            id,
            text: self.text,
            sender: Sender::Bot,
            timestamp,
            source_url: self.source_url,
            source_title: self.source_title,
        }
    }
}

/// Build the reply for a classified, ranked query.
pub fn compose(class: QueryClass, ranked: &[RankedResult], settings: &ComposeSettings) -> Reply {
    match ranked.first() {
        Some(top) => from_item(&top.item, settings),
        None => Reply {
            text: fallback_message(class).to_string(),
            source_url: None,
            source_title: None,
            matched_id: None,
        },
    }
}

fn from_item(item: &ContentItem, settings: &ComposeSettings) -> Reply {
    let (source_url, source_title) = if item.url.is_empty() {
        (None, None)
    } else {
        (Some(item.url.clone()), Some(item.title.clone()))
    };
    Reply {
        text: format_item(item, settings),
        source_url,
        source_title,
        matched_id: Some(item.id.clone()),
    }
}

/// Phrase a matched item according to its type.
pub fn format_item(item: &ContentItem, settings: &ComposeSettings) -> String {
    match item.kind {
        ContentKind::Property => format!("'{}' 매물 정보입니다. {}", item.title, item.body),
        ContentKind::Article => format!(
            "{}\n\n{}{}",
            item.title,
            excerpt(&item.body, settings.excerpt_chars),
            ELLIPSIS
        ),
        ContentKind::Faq | ContentKind::Static => item.body.clone(),
    }
}

/// The canned answer for a class when nothing matched.
pub fn fallback_message(class: QueryClass) -> &'static str {
    match class {
        QueryClass::Property => FALLBACK_PROPERTY,
        QueryClass::Investment => FALLBACK_INVESTMENT,
        QueryClass::Company => FALLBACK_COMPANY,
        QueryClass::ProtocolTech => FALLBACK_PROTOCOL,
        QueryClass::General | QueryClass::Unknown => FALLBACK_GREETING,
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
