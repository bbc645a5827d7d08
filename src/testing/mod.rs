use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};

use crate::gateway::MemoryGateway;
use crate::model::Collection;
use crate::session::{Session, SessionGuard};

/// `count` valid tip documents, `tip-1` .. `tip-n`, created an hour apart
pub fn tip_docs(count: usize) -> Vec<Value> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).single().unwrap_or_else(Utc::now);
    (1..=count)
        .map(|i| {
            json!({
                "id": format!("tip-{}", i),
                "title": format!("Tip {}", i),
                "content": format!("Practice suggestion number {}", i),
                "category": if i % 2 == 0 { "breathing" } else { "grounding" },
                "createdAt": (start + Duration::hours(i as i64)).to_rfc3339(),
            })
        })
        .collect()
}

/// Gateway holding users plus testimonials that reference them
pub fn seeded_gateway() -> MemoryGateway {
    let gateway = MemoryGateway::new();
    gateway.seed(Collection::Tips, tip_docs(12));
    gateway.seed(
        Collection::Users,
        vec![
            json!({ "id": "u1", "email": "sam@example.com", "name": "Sam Rivers" }),
            json!({ "id": "u2", "email": "alex@example.com" }),
        ],
    );
    gateway.seed(
        Collection::Testimonials,
        vec![
            json!({ "id": "t1", "userId": "u1", "content": "The breathing guide helped", "approved": true }),
            json!({ "id": "t2", "userId": "u2", "content": "Found a counsellor quickly" }),
            json!({ "id": "t3", "userId": "ghost", "content": "Posted anonymously" }),
        ],
    );
    gateway
}

/// Session valid for the next hour
pub fn test_session(email: &str) -> Session {
    let now = Utc::now();
    Session {
        email: email.to_string(),
        user_id: Some("admin-1".to_string()),
        token: "test-token".to_string(),
        issued_at: now,
        expires_at: now + Duration::hours(1),
    }
}

pub fn authenticated_guard() -> SessionGuard {
    SessionGuard::from_session(test_session("admin@example.com"))
}
