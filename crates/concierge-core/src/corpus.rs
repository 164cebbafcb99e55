//! Corpus construction: the built-in topic and FAQ entries, mapping of
//! catalog records into [`ContentItem`]s, and assembly into an ordered,
//! validated [`Corpus`].
//!
//! # Ordering
//!
//! Assembly always yields static items, then FAQ items, then properties
//! (catalog order), then articles (catalog order). The ranker's tie-break
//! is corpus order, so this ordering is observable in answers.
//!
//! # Validation
//!
//! - An item with neither title nor body is dropped.
//! - An item with a body but no title gets its id as title.
//! - A repeated id is dropped; the first occurrence wins.

use std::collections::HashSet;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::{ArticleRecord, ContentItem, ContentKind, PropertyRecord};
use crate::rank::{LexicalIndex, RankedResult, ScoreWeights};

/// Hand-authored general-topic entries.
pub fn static_items() -> Vec<ContentItem> {
    vec![
        ContentItem::new(
            "static-company",
            ContentKind::Static,
            "회사 소개",
            "저희는 상업용 부동산을 디지털 증권 형태의 조각으로 나누어 누구나 소액으로 우량 자산에 투자할 수 있도록 돕는 부동산 조각 투자 플랫폼입니다. 금융, 부동산, 블록체인 전문가로 구성된 팀이 자산 선별부터 운영까지 책임집니다.",
        )
        .with_url("/about")
        .with_keywords(["회사", "팀", "소개", "company", "about"])
        .with_category("about"),
        ContentItem::new(
            "static-platform",
            ContentKind::Static,
            "플랫폼 이용 방법",
            "1) 회원 가입과 본인 인증을 완료합니다. 2) 공개된 매물의 투자 설명서를 확인합니다. 3) 원하는 수량만큼 조각을 매수합니다. 4) 보유 기간 동안 임대 수익을 배당으로 받고, 필요하면 거래소에서 매도합니다.",
        )
        .with_url("/how-it-works")
        .with_keywords(["이용 방법", "가입", "매수", "매도", "how it works"])
        .with_category("guide"),
        ContentItem::new(
            "static-protocol",
            ContentKind::Static,
            "블록체인 프로토콜",
            "모든 조각의 발행, 이전, 배당 기록은 퍼블릭 블록체인 위의 스마트 컨트랙트로 처리됩니다. 거래 내역은 누구나 검증할 수 있고 소유권 변경 기록은 위변조가 불가능합니다.",
        )
        .with_url("/technology")
        .with_keywords(["블록체인", "프로토콜", "스마트 컨트랙트", "blockchain", "protocol"])
        .with_category("technology"),
        ContentItem::new(
            "static-token",
            ContentKind::Static,
            "토큰 시스템",
            "각 부동산 자산은 고유한 증권형 토큰으로 발행되며 1토큰은 자산 지분의 1조각을 의미합니다. 토큰 보유자는 지분 비율에 따라 임대 수익과 매각 차익을 배분받습니다.",
        )
        .with_url("/token")
        .with_keywords(["토큰", "지분", "token", "security token"])
        .with_category("technology"),
        ContentItem::new(
            "static-security",
            ContentKind::Static,
            "보안 및 감사",
            "스마트 컨트랙트는 외부 보안 전문 기관의 정기 감사를 받으며 고객 자산은 신탁 기관에 분리 보관됩니다. 감사 보고서는 보안 페이지에서 공개하고 있습니다.",
        )
        .with_url("/security")
        .with_keywords(["보안", "감사", "security", "audit"])
        .with_category("technology"),
    ]
}

/// Hand-authored FAQ entries. Bodies are phrased as direct answers.
pub fn faq_items() -> Vec<ContentItem> {
    let faqs: [(&str, &str, &[&str], &str); 6] = [
        (
            "최소 투자 금액은 얼마인가요?",
            "최소 투자 금액은 1조각(5,000원)이며, 이후에는 원하는 만큼 조각 단위로 추가 투자하실 수 있습니다.",
            &["최소 투자", "투자 금액", "minimum"],
            "투자",
        ),
        (
            "수익은 어떻게 배분되나요?",
            "임대 수익은 매 분기 보유 조각 수에 비례해 지갑으로 자동 배당됩니다. 매각 차익은 자산 매각 시점에 정산됩니다.",
            &["수익", "배당", "분배", "dividend"],
            "투자",
        ),
        (
            "보유한 조각은 언제든 팔 수 있나요?",
            "네, 플랫폼 내 거래소에서 다른 투자자에게 보유 조각을 언제든 매도하실 수 있습니다. 체결된 대금은 즉시 지갑에 반영됩니다.",
            &["매도", "거래소", "유동성"],
            "거래",
        ),
        (
            "투자 원금은 보장되나요?",
            "부동산 조각 투자는 원금 보장 상품이 아닙니다. 자산 가치 변동에 따라 손실이 발생할 수 있으니 투자 설명서를 꼭 확인해 주세요.",
            &["원금", "손실", "위험"],
            "투자",
        ),
        (
            "회원 가입은 어떻게 하나요?",
            "이메일 또는 소셜 계정으로 가입한 뒤 본인 인증과 투자자 적합성 확인을 마치면 바로 투자를 시작하실 수 있습니다.",
            &["가입", "회원", "본인 인증", "sign up"],
            "이용 안내",
        ),
        (
            "수수료는 얼마인가요?",
            "조각을 매수하거나 매도할 때 거래대금의 0.5%가 수수료로 부과되며, 배당금에는 별도 수수료가 없습니다.",
            &["수수료", "비용", "fee"],
            "이용 안내",
        ),
    ];

    faqs.iter()
        .enumerate()
        .map(|(i, (title, body, keywords, category))| {
            ContentItem::new(format!("faq-{}", i + 1), ContentKind::Faq, *title, *body)
                .with_url("/faq")
                .with_keywords(keywords.iter().copied())
                .with_category(*category)
        })
        .collect()
}

/// Static and FAQ entries, validated.
///
/// This is the degraded corpus: what remains when no catalog answers.
pub fn builtin_items() -> Result<Vec<ContentItem>> {
    let mut items = static_items();
    items.extend(faq_items());

    let mut seen = HashSet::new();
    for item in &items {
        if item.is_blank() {
            bail!("built-in item {} has no title or body", item.id);
        }
        if !seen.insert(item.id.as_str()) {
            bail!("duplicate built-in item id: {}", item.id);
        }
    }
    Ok(items)
}

/// Map a property record. Description, address, price, type, and region
/// all land in the body so every field participates in scoring.
pub fn property_item(record: &PropertyRecord) -> ContentItem {
    let price = format_price(record.total_value);
    let body = [
        record.description.as_str(),
        record.address.as_str(),
        price.as_str(),
        record.property_type.as_str(),
        record.region.as_str(),
    ]
    .iter()
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    let keywords = [record.property_type.trim(), record.region.trim()]
        .into_iter()
        .filter(|s| !s.is_empty());

    let mut item = ContentItem::new(
        format!("property-{}", record.id),
        ContentKind::Property,
        record.name.trim(),
        body,
    )
    .with_url(format!("/properties/{}", record.id))
    .with_keywords(keywords);
    if !record.region.trim().is_empty() {
        item = item.with_category(record.region.trim());
    }
    item
}

/// Map an article record. Tags become keywords.
pub fn article_item(record: &ArticleRecord) -> ContentItem {
    let mut item = ContentItem::new(
        format!("article-{}", record.id),
        ContentKind::Article,
        record.title.trim(),
        record.body.as_str(),
    )
    .with_url(record.url.trim())
    .with_keywords(record.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()));
    item.category = record.category.clone().filter(|c| !c.trim().is_empty());
    item
}

/// `1200000000` → `"1,200,000,000원"`. Non-positive or non-finite values
/// render as nothing.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let digits = format!("{:.0}", value);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('원');
    out
}

/// Why an item did not make it into the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedItem {
    pub id: String,
    pub reason: String,
}

/// Result of [`assemble`].
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub items: Vec<ContentItem>,
    pub dropped: Vec<DroppedItem>,
}

/// Merge item groups in the given order, enforcing the corpus invariants.
pub fn assemble<I>(groups: I) -> Assembly
where
    I: IntoIterator<Item = Vec<ContentItem>>,
{
    let mut out = Assembly::default();
    let mut seen: HashSet<String> = HashSet::new();

    for group in groups {
        for mut item in group {
            if item.is_blank() {
                out.dropped.push(DroppedItem {
                    id: item.id,
                    reason: "no title or body".to_string(),
                });
                continue;
            }
            if !seen.insert(item.id.clone()) {
                out.dropped.push(DroppedItem {
                    id: item.id,
                    reason: "duplicate id".to_string(),
                });
                continue;
            }
            if item.title.trim().is_empty() {
                item.title = item.id.clone();
            }
            out.items.push(item);
        }
    }
    out
}

/// Outcome of pulling one catalog during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub configured: bool,
    pub healthy: bool,
    pub items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceStatus {
    pub fn not_configured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configured: false,
            healthy: true,
            items: 0,
            error: None,
        }
    }

    pub fn ok(name: impl Into<String>, items: usize) -> Self {
        Self {
            name: name.into(),
            configured: true,
            healthy: true,
            items,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configured: true,
            healthy: false,
            items: 0,
            error: Some(error.into()),
        }
    }
}

/// An immutable, ranked-ready snapshot of aggregated content.
pub struct Corpus {
    index: LexicalIndex,
    sources: Vec<SourceStatus>,
    built_at: DateTime<Utc>,
    fingerprint: String,
}

impl Corpus {
    pub fn new(items: Vec<ContentItem>, sources: Vec<SourceStatus>, built_at: DateTime<Utc>) -> Self {
        let fingerprint = fingerprint(&items);
        Self {
            index: LexicalIndex::build(items),
            sources,
            built_at,
            fingerprint,
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.index.items()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// True when at least one configured catalog failed to load.
    pub fn degraded(&self) -> bool {
        self.sources.iter().any(|s| !s.healthy)
    }

    pub fn sources(&self) -> &[SourceStatus] {
        &self.sources
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn rank(&self, query: &str, weights: &ScoreWeights, explain: bool) -> Vec<RankedResult> {
        self.index.rank(query, weights, explain)
    }

    pub fn summary(&self) -> CorpusSummary {
        let counts = ContentKind::ALL
            .iter()
            .map(|kind| KindCount {
                kind: *kind,
                count: self.items().filter(|i| i.kind == *kind).count(),
            })
            .collect();
        CorpusSummary {
            total: self.len(),
            counts,
            degraded: self.degraded(),
            built_at: self.built_at().to_rfc3339(),
            fingerprint: self.fingerprint.clone(),
            sources: self.sources.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KindCount {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub count: usize,
}

/// Serializable corpus overview for the CLI and HTTP surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusSummary {
    pub total: usize,
    pub counts: Vec<KindCount>,
    pub degraded: bool,
    pub built_at: String,
    pub fingerprint: String,
    pub sources: Vec<SourceStatus>,
}

/// SHA-256 over every item's content, in order.
pub fn fingerprint(items: &[ContentItem]) -> String {
    let mut hasher = Sha256::new();
    for item in items {
        for field in [
            item.id.as_str(),
            item.kind.as_str(),
            item.title.as_str(),
            item.body.as_str(),
            item.url.as_str(),
        ] {
            hasher.update(field.as_bytes());
            hasher.update(b"\x1f");
        }
        for kw in &item.keywords {
            hasher.update(kw.as_bytes());
            hasher.update(b"\x1f");
        }
        hasher.update(b"\x1e");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(id: &str, name: &str) -> PropertyRecord {
        PropertyRecord {
            id: id.to_string(),
            name: name.to_string(),
            description: "역세권 신축 업무 시설".to_string(),
            address: "서울 강남구 테헤란로 1".to_string(),
            total_value: 1_200_000_000.0,
            property_type: "오피스".to_string(),
            region: "서울".to_string(),
        }
    }

    #[test]
    fn test_builtin_items_valid_and_ordered() {
        let items = builtin_items().unwrap();
        assert_eq!(items.len(), 11);
        assert!(items[..5].iter().all(|i| i.kind == ContentKind::Static));
        assert!(items[5..].iter().all(|i| i.kind == ContentKind::Faq));
        assert!(items.iter().all(|i| !i.url.is_empty()));
    }

    #[test]
    fn test_faq_contains_min_investment_question() {
        let faqs = faq_items();
        assert!(faqs.iter().any(|f| f.title == "최소 투자 금액은 얼마인가요?"));
        assert_eq!(faqs[0].id, "faq-1");
    }

    #[test]
    fn test_property_mapping_puts_all_fields_in_body() {
        let item = property_item(&property("7", "강남 프리미엄 오피스"));
        assert_eq!(item.id, "property-7");
        assert_eq!(item.kind, ContentKind::Property);
        assert_eq!(item.url, "/properties/7");
        assert_eq!(
            item.body,
            "역세권 신축 업무 시설 서울 강남구 테헤란로 1 1,200,000,000원 오피스 서울"
        );
        assert_eq!(item.keywords, vec!["오피스", "서울"]);
        assert_eq!(item.category.as_deref(), Some("서울"));
    }

    #[test]
    fn test_article_mapping_uses_tags() {
        let rec = ArticleRecord {
            id: "3".to_string(),
            title: "2026 오피스 시장 전망".to_string(),
            body: "본문".to_string(),
            url: "https://blog.example.com/3".to_string(),
            category: Some("시장".to_string()),
            tags: vec!["시장".to_string(), " ".to_string(), "전망".to_string()],
        };
        let item = article_item(&rec);
        assert_eq!(item.id, "article-3");
        assert_eq!(item.keywords, vec!["시장", "전망"]);
        assert_eq!(item.category.as_deref(), Some("시장"));
    }

    #[test]
    fn test_assemble_preserves_group_order() {
        let builtin = builtin_items().unwrap();
        let props = vec![property_item(&property("2", "B")), property_item(&property("1", "A"))];
        let arts = vec![ContentItem::new("article-1", ContentKind::Article, "T", "B")];
        let out = assemble([builtin.clone(), props, arts]);
        let ids: Vec<&str> = out.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids[builtin.len()], "property-2");
        assert_eq!(ids[builtin.len() + 1], "property-1");
        assert_eq!(*ids.last().unwrap(), "article-1");
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn test_assemble_drops_blank_and_duplicates() {
        let out = assemble([vec![
            ContentItem::new("a", ContentKind::Article, "A", "body"),
            ContentItem::new("b", ContentKind::Article, "", "  "),
            ContentItem::new("a", ContentKind::Article, "A again", "body"),
            ContentItem::new("c", ContentKind::Article, "", "only body"),
        ]]);
        let ids: Vec<&str> = out.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(out.items[0].title, "A");
        assert_eq!(out.items[1].title, "c");
        assert_eq!(out.dropped.len(), 2);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1_200_000_000.0), "1,200,000,000원");
        assert_eq!(format_price(999.0), "999원");
        assert_eq!(format_price(1000.0), "1,000원");
        assert_eq!(format_price(0.0), "");
        assert_eq!(format_price(f64::NAN), "");
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = builtin_items().unwrap();
        let mut b = a.clone();
        assert_eq!(fingerprint(&a), fingerprint(&b));
        b[0].body.push('!');
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_corpus_degraded_flag_and_summary() {
        let built_at = Utc::now();
        let corpus = Corpus::new(
            builtin_items().unwrap(),
            vec![
                SourceStatus::ok("properties", 0),
                SourceStatus::failed("articles", "timed out"),
            ],
            built_at,
        );
        assert!(corpus.degraded());
        assert_eq!(corpus.built_at(), built_at);
        let summary = corpus.summary();
        assert_eq!(summary.total, 11);
        assert_eq!(summary.built_at, built_at.to_rfc3339());
        let faq = summary
            .counts
            .iter()
            .find(|c| c.kind == ContentKind::Faq)
            .unwrap();
        assert_eq!(faq.count, 6);
    }

    #[test]
    fn test_unconfigured_source_is_not_degraded() {
        let corpus = Corpus::new(
            builtin_items().unwrap(),
            vec![SourceStatus::not_configured("properties")],
            Utc::now(),
        );
        assert!(!corpus.degraded());
    }
}
