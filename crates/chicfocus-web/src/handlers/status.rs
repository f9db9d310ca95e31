//! 상태 확인 핸들러.

use axum::Json;
use chicfocus_core::models::identity::Identity;
use chicfocus_core::models::tier::Tier;
use serde::Serialize;
use std::collections::BTreeMap;

/// 티어 설명
#[derive(Debug, Serialize)]
pub struct ChickenTypeDto {
    pub label: &'static str,
    pub intensity: &'static str,
    /// 분
    pub time: u64,
    pub points: i64,
}

/// 상태 응답
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub users: Vec<&'static str>,
    pub chicken_types: BTreeMap<u8, ChickenTypeDto>,
}

/// GET /status
pub async fn get_status() -> Json<StatusResponse> {
    let chicken_types = Tier::ALL
        .iter()
        .map(|tier| {
            (
                tier.number(),
                ChickenTypeDto {
                    label: tier.label(),
                    intensity: tier.intensity(),
                    time: tier.minutes(),
                    points: tier.points(),
                },
            )
        })
        .collect();

    Json(StatusResponse {
        status: "ok",
        users: Identity::ALL.iter().map(|u| u.as_str()).collect(),
        chicken_types,
    })
}
