//! Certification data model.
//!
//! [`Certification`] is the canonical, nested response shape served by
//! `GET /api/certification/{id}`. Older result pages were fed a flattened
//! shape (`sender_name`, `recipient_name`, `summary_text`, ...); that shape is
//! still accepted on decode and converted into the canonical one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// A generated legal notice ("내용증명서").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    /// Certification identifier.
    #[serde(rename = "_id")]
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Contract the notice was generated from.
    pub contract_id: i64,
    /// ISO 8601 creation timestamp, kept as sent.
    pub created_date: String,
    pub title: String,
    pub receiver: Party,
    pub sender: Party,
    pub body: String,
    #[serde(default)]
    pub strategy_summary: Option<String>,
    pub followup_strategy: String,
    pub legal_basis: Vec<LegalBasis>,
    pub case_basis: Vec<CaseBasis>,
    /// Seconds spent generating the notice.
    pub generation_time: f64,
    pub user_query: String,
    /// Preview image of the rendered notice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// External link to the original document, if hosted elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
}

/// Sender or receiver of a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub address: String,
    pub detail_address: String,
}

/// A statute cited as grounds for the notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalBasis {
    pub law_id: i64,
    /// Statute label, e.g. `민법 제390조`.
    pub law: String,
    pub explanation: String,
    pub content: String,
}

/// A court decision cited as precedent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseBasis {
    pub case_id: i64,
    /// Case label, e.g. `대법원 2019다12345 판결`.
    pub case: String,
    pub explanation: String,
    pub link: String,
}

/// Flattened response shape used by the first result page.
#[derive(Debug, Deserialize)]
struct LegacyCertification {
    certification_id: i64,
    title: String,
    date_created: String,
    recipient_name: String,
    recipient_address: String,
    recipient_detail_address: String,
    sender_name: String,
    sender_address: String,
    sender_detail_address: String,
    summary_text: String,
    #[serde(default)]
    strategy_summary: Option<String>,
    #[serde(default)]
    followup_strategy: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    original_url: Option<String>,
}

impl From<LegacyCertification> for Certification {
    fn from(legacy: LegacyCertification) -> Self {
        Self {
            id: legacy.certification_id,
            user_id: 0,
            contract_id: 0,
            created_date: legacy.date_created,
            title: legacy.title,
            receiver: Party {
                name: legacy.recipient_name,
                address: legacy.recipient_address,
                detail_address: legacy.recipient_detail_address,
            },
            sender: Party {
                name: legacy.sender_name,
                address: legacy.sender_address,
                detail_address: legacy.sender_detail_address,
            },
            body: legacy.summary_text,
            strategy_summary: legacy.strategy_summary,
            followup_strategy: legacy.followup_strategy,
            legal_basis: Vec::new(),
            case_basis: Vec::new(),
            generation_time: 0.0,
            user_query: String::new(),
            thumbnail_url: legacy.thumbnail_url,
            original_url: legacy.original_url,
        }
    }
}

impl Certification {
    /// Decode a response body into a certification.
    ///
    /// The canonical nested shape is tried first, then the legacy flattened
    /// shape. The decoded value is validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] if the body is not JSON, matches neither
    /// shape, or cites the same law or case twice.
    pub fn from_json(body: &[u8]) -> Result<Self, FetchError> {
        let value: serde_json::Value = serde_json::from_slice(body)?;

        let cert = match serde_json::from_value::<Self>(value.clone()) {
            Ok(cert) => cert,
            Err(canonical_err) => match serde_json::from_value::<LegacyCertification>(value) {
                Ok(legacy) => {
                    tracing::debug!(
                        id = legacy.certification_id,
                        "decoded legacy flattened certification"
                    );
                    Self::from(legacy)
                }
                // Report the canonical mismatch; it names the missing field.
                Err(_) => return Err(canonical_err.into()),
            },
        };

        cert.validate()?;
        Ok(cert)
    }

    /// Check that legal and case basis entries are unique by id.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] naming the first duplicated id.
    pub fn validate(&self) -> Result<(), FetchError> {
        let mut laws = HashSet::with_capacity(self.legal_basis.len());
        if let Some(dup) = self.legal_basis.iter().find(|b| !laws.insert(b.law_id)) {
            return Err(FetchError::Decode {
                reason: format!("duplicate law_id {}", dup.law_id),
            });
        }

        let mut cases = HashSet::with_capacity(self.case_basis.len());
        if let Some(dup) = self.case_basis.iter().find(|b| !cases.insert(b.case_id)) {
            return Err(FetchError::Decode {
                reason: format!("duplicate case_id {}", dup.case_id),
            });
        }

        Ok(())
    }
}

/// The demonstration certification served by the mock data endpoint.
pub fn sample(id: i64) -> Certification {
    Certification {
        id,
        user_id: 123,
        contract_id: 123,
        created_date: "2026-06-30T00:00:00Z".to_owned(),
        title: "계약 이행 증명서".to_owned(),
        receiver: Party {
            name: "홍길동".to_owned(),
            address: "서울특별시 강남구 테헤란로 123".to_owned(),
            detail_address: "101동 202호".to_owned(),
        },
        sender: Party {
            name: "김법무".to_owned(),
            address: "서울특별시 서초구 서초대로 456".to_owned(),
            detail_address: "법무빌딩 5층".to_owned(),
        },
        body: "본 계약에 따라 임차인은 계약 이행을 성실히 준수하여야 합니다. \
               이에 따라 계약 조건을 다시 확인하고 이행을 촉구합니다."
            .to_owned(),
        strategy_summary: Some("계약 이행 보장을 위해 법적 절차를 최소화함.".to_owned()),
        followup_strategy: "계약 갱신 시 동일 조건 유지 및 법적 보장 강화.".to_owned(),
        legal_basis: vec![
            LegalBasis {
                law_id: 201,
                law: "주택임대차보호법 제4조".to_owned(),
                explanation: "임대차 기간 중 계약 해지 불가에 대한 규정.".to_owned(),
                content: "임대차 기간은 2년 이상으로 정함.".to_owned(),
            },
            LegalBasis {
                law_id: 202,
                law: "민법 제390조".to_owned(),
                explanation: "채무불이행에 따른 손해배상.".to_owned(),
                content: "채무자가 이행하지 않을 경우 손해배상 책임을 짐.".to_owned(),
            },
        ],
        case_basis: vec![
            CaseBasis {
                case_id: 301,
                case: "대법원 2019다12345 판결".to_owned(),
                explanation: "계약 위반 시 손해배상 책임 인정.".to_owned(),
                link: "data/case/301".to_owned(),
            },
            CaseBasis {
                case_id: 302,
                case: "서울고등법원 2018나54321 판결".to_owned(),
                explanation: "임대차 기간 내 해지의 효력 부인.".to_owned(),
                link: "data/case/302".to_owned(),
            },
        ],
        generation_time: 42.96,
        user_query: "수신인과 발신인 정보를 입력하고 계약서 내용을 기반으로 인증서를 생성해주세요."
            .to_owned(),
        thumbnail_url: None,
        original_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> Vec<u8> {
        serde_json::to_vec(&sample(42)).unwrap()
    }

    #[test]
    fn canonical_payload_decodes() {
        let cert = Certification::from_json(&sample_json()).unwrap();
        assert_eq!(cert.id, 42);
        assert_eq!(cert.title, "계약 이행 증명서");
        assert_eq!(cert.legal_basis.len(), 2);
        assert_eq!(cert.case_basis.len(), 2);
    }

    #[test]
    fn id_is_serialized_as_underscore_id() {
        let value = serde_json::to_value(sample(7)).unwrap();
        assert_eq!(value["_id"], 7);
        assert!(value.get("id").is_none());
    }

    #[test]
    fn null_strategy_summary_is_none() {
        let mut value = serde_json::to_value(sample(1)).unwrap();
        value["strategy_summary"] = serde_json::Value::Null;
        let cert = Certification::from_json(value.to_string().as_bytes()).unwrap();
        assert_eq!(cert.strategy_summary, None);
    }

    #[test]
    fn schema_incomplete_payload_is_decode_error() {
        let body = r#"{"_id": 42, "title": "계약 이행 증명서"}"#;
        let err = Certification::from_json(body.as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn non_json_payload_is_decode_error() {
        let err = Certification::from_json(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn legacy_flattened_payload_is_converted() {
        let body = serde_json::json!({
            "certification_id": 9,
            "title": "임대차보증금 반환 촉구서",
            "date_created": "2026-06-30",
            "recipient_name": "홍길동",
            "recipient_address": "서울특별시 강남구 테헤란로 123",
            "recipient_detail_address": "101동 103호",
            "sender_name": "김 법무",
            "sender_address": "서울특별시 구구 비둘기야 밥먹자",
            "sender_detail_address": "빌드인 빌딩",
            "summary_text": "요약",
            "strategy_summary": null,
            "followup_strategy": "협의",
            "original_url": "https://example.com/doc.pdf"
        });

        let cert = Certification::from_json(body.to_string().as_bytes()).unwrap();
        assert_eq!(cert.id, 9);
        assert_eq!(cert.receiver.name, "홍길동");
        assert_eq!(cert.sender.detail_address, "빌드인 빌딩");
        assert_eq!(cert.body, "요약");
        assert!(cert.legal_basis.is_empty());
        assert_eq!(cert.original_url.as_deref(), Some("https://example.com/doc.pdf"));
    }

    #[test]
    fn duplicate_law_id_is_rejected() {
        let mut cert = sample(1);
        cert.legal_basis[1].law_id = cert.legal_basis[0].law_id;
        let body = serde_json::to_vec(&cert).unwrap();

        let err = Certification::from_json(&body).unwrap_err();
        assert_eq!(
            err,
            FetchError::Decode {
                reason: "duplicate law_id 201".to_owned()
            }
        );
    }

    #[test]
    fn duplicate_case_id_is_rejected() {
        let mut cert = sample(1);
        cert.case_basis[0].case_id = 302;
        assert!(cert.validate().is_err());
    }
}
