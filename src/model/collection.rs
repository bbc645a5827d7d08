use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::schema::{FieldKind, FieldSpec, Schema};

const TIP_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", "Title", FieldKind::Text),
    FieldSpec::required("content", "Content", FieldKind::Text),
    FieldSpec::required("category", "Category", FieldKind::Text),
    FieldSpec::optional("createdAt", "Created", FieldKind::Timestamp),
];

const CRISIS_CONTACT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", "Name", FieldKind::Text),
    FieldSpec::required("phone", "Phone", FieldKind::Text),
    FieldSpec::optional("description", "Description", FieldKind::Text),
    FieldSpec::optional("availability", "Availability", FieldKind::Text),
    FieldSpec::optional("country", "Country", FieldKind::Text),
];

const CRISIS_MESSAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", "Title", FieldKind::Text),
    FieldSpec::required("message", "Message", FieldKind::Text),
    FieldSpec::optional("priority", "Priority", FieldKind::Number),
    FieldSpec::optional("active", "Active", FieldKind::Bool),
];

const EMERGENCY_ACTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", "Title", FieldKind::Text),
    FieldSpec::required("description", "Description", FieldKind::Text),
    FieldSpec::optional("steps", "Steps", FieldKind::TextList),
    FieldSpec::optional("order", "Order", FieldKind::Number),
];

const PANIC_TIP_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", "Title", FieldKind::Text),
    FieldSpec::required("description", "Description", FieldKind::Text),
    FieldSpec::optional("steps", "Steps", FieldKind::TextList),
];

const COPING_STRATEGY_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", "Title", FieldKind::Text),
    FieldSpec::required("description", "Description", FieldKind::Text),
    FieldSpec::optional("category", "Category", FieldKind::Text),
];

const TESTIMONIAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("userId", "User ID", FieldKind::Text),
    FieldSpec::required("content", "Testimonial", FieldKind::Text),
    FieldSpec::optional("rating", "Rating", FieldKind::Number),
    FieldSpec::optional("approved", "Approved", FieldKind::Bool),
    FieldSpec::optional("createdAt", "Created", FieldKind::Timestamp),
];

const TESTIMONIAL_VIDEO_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", "Title", FieldKind::Text),
    FieldSpec::required("videoUrl", "Video URL", FieldKind::Text),
    FieldSpec::optional("description", "Description", FieldKind::Text),
    FieldSpec::optional("userId", "User ID", FieldKind::Text),
    FieldSpec::optional("createdAt", "Created", FieldKind::Timestamp),
];

const BOOKING_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("userId", "User ID", FieldKind::Text),
    FieldSpec::required("therapistName", "Therapist", FieldKind::Text),
    FieldSpec::required("date", "Date", FieldKind::Timestamp),
    FieldSpec::required("status", "Status", FieldKind::Text),
    FieldSpec::optional("notes", "Notes", FieldKind::Text),
];

const ACTIVITY_LOG_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("userId", "User ID", FieldKind::Text),
    FieldSpec::required("action", "Action", FieldKind::Text),
    FieldSpec::required("timestamp", "Time", FieldKind::Timestamp),
    FieldSpec::optional("details", "Details", FieldKind::Text),
];

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("email", "Email", FieldKind::Text),
    FieldSpec::optional("name", "Name", FieldKind::Text),
    FieldSpec::optional("role", "Role", FieldKind::Text),
    FieldSpec::optional("createdAt", "Joined", FieldKind::Timestamp),
];

/// Derived fields attached by the users join
pub const USER_NAME_FIELD: &str = "userName";
pub const USER_EMAIL_FIELD: &str = "userEmail";

/// Logical collections managed by the admin client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Tips,
    CrisisContacts,
    CrisisMessages,
    EmergencyActions,
    PanicAttackTips,
    SelfHarmStrategies,
    Testimonials,
    TestimonialVideos,
    TherapyBookings,
    ActivityLogs,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 11] = [
        Collection::Tips,
        Collection::CrisisContacts,
        Collection::CrisisMessages,
        Collection::EmergencyActions,
        Collection::PanicAttackTips,
        Collection::SelfHarmStrategies,
        Collection::Testimonials,
        Collection::TestimonialVideos,
        Collection::TherapyBookings,
        Collection::ActivityLogs,
        Collection::Users,
    ];

    /// Collection name in the document store
    pub fn store_name(&self) -> &'static str {
        match self {
            Collection::Tips => "tips",
            Collection::CrisisContacts => "crisis_contacts",
            Collection::CrisisMessages => "crisis_messages",
            Collection::EmergencyActions => "emergency_actions",
            Collection::PanicAttackTips => "panic_attack_tips",
            Collection::SelfHarmStrategies => "self_harm_strategies",
            Collection::Testimonials => "testimonials",
            Collection::TestimonialVideos => "testimonial_videos",
            Collection::TherapyBookings => "therapy_bookings",
            Collection::ActivityLogs => "user_logs",
            Collection::Users => "users",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Collection::Tips => "Tips",
            Collection::CrisisContacts => "Crisis contacts",
            Collection::CrisisMessages => "Crisis messages",
            Collection::EmergencyActions => "Emergency actions",
            Collection::PanicAttackTips => "Panic attack tips",
            Collection::SelfHarmStrategies => "Coping strategies",
            Collection::Testimonials => "Testimonials",
            Collection::TestimonialVideos => "Testimonial videos",
            Collection::TherapyBookings => "Therapy bookings",
            Collection::ActivityLogs => "Activity logs",
            Collection::Users => "Users",
        }
    }

    pub fn schema(&self) -> Schema {
        let fields = match self {
            Collection::Tips => TIP_FIELDS,
            Collection::CrisisContacts => CRISIS_CONTACT_FIELDS,
            Collection::CrisisMessages => CRISIS_MESSAGE_FIELDS,
            Collection::EmergencyActions => EMERGENCY_ACTION_FIELDS,
            Collection::PanicAttackTips => PANIC_TIP_FIELDS,
            Collection::SelfHarmStrategies => COPING_STRATEGY_FIELDS,
            Collection::Testimonials => TESTIMONIAL_FIELDS,
            Collection::TestimonialVideos => TESTIMONIAL_VIDEO_FIELDS,
            Collection::TherapyBookings => BOOKING_FIELDS,
            Collection::ActivityLogs => ACTIVITY_LOG_FIELDS,
            Collection::Users => USER_FIELDS,
        };
        Schema::new(fields)
    }

    pub fn searchable_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::Tips => &["title", "content", "category"],
            Collection::CrisisContacts => &["name", "phone", "description", "country"],
            Collection::CrisisMessages => &["title", "message"],
            Collection::EmergencyActions => &["title", "description", "steps"],
            Collection::PanicAttackTips => &["title", "description"],
            Collection::SelfHarmStrategies => &["title", "description", "category"],
            Collection::Testimonials => &["content", USER_NAME_FIELD, USER_EMAIL_FIELD],
            Collection::TestimonialVideos => &["title", "description", USER_NAME_FIELD],
            Collection::TherapyBookings => {
                &["therapistName", "status", USER_NAME_FIELD, USER_EMAIL_FIELD]
            }
            Collection::ActivityLogs => &["action", "details", USER_NAME_FIELD, USER_EMAIL_FIELD],
            Collection::Users => &["name", "email", "role"],
        }
    }

    pub fn page_size(&self) -> usize {
        match self {
            Collection::Tips | Collection::PanicAttackTips | Collection::TestimonialVideos => 6,
            _ => 5,
        }
    }

    /// Ordering applied after every fetch, in `field dir, field dir` form
    pub fn default_order(&self) -> &'static str {
        match self {
            Collection::Tips | Collection::Testimonials | Collection::TestimonialVideos => "createdAt desc",
            Collection::Users => "createdAt desc, email asc",
            Collection::CrisisContacts => "name asc",
            Collection::CrisisMessages => "priority asc, title asc",
            Collection::EmergencyActions => "order asc, title asc",
            Collection::PanicAttackTips | Collection::SelfHarmStrategies => "title asc",
            Collection::TherapyBookings => "date desc",
            Collection::ActivityLogs => "timestamp desc",
        }
    }

    /// Foreign key into `users`, when the collection is joined client-side
    pub fn user_ref(&self) -> Option<&'static str> {
        match self {
            Collection::Testimonials
            | Collection::TestimonialVideos
            | Collection::TherapyBookings
            | Collection::ActivityLogs => Some("userId"),
            _ => None,
        }
    }

    /// Columns shown by the table layout
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Tips => &["title", "category", "content", "createdAt"],
            Collection::CrisisContacts => &["name", "phone", "availability", "country"],
            Collection::CrisisMessages => &["title", "message", "priority", "active"],
            Collection::EmergencyActions => &["title", "description", "steps"],
            Collection::PanicAttackTips => &["title", "description", "steps"],
            Collection::SelfHarmStrategies => &["title", "category", "description"],
            Collection::Testimonials => &[USER_NAME_FIELD, "content", "rating", "approved"],
            Collection::TestimonialVideos => &["title", "videoUrl", USER_NAME_FIELD],
            Collection::TherapyBookings => &[USER_NAME_FIELD, "therapistName", "date", "status"],
            Collection::ActivityLogs => &[USER_NAME_FIELD, "action", "timestamp", "details"],
            Collection::Users => &["name", "email", "role", "createdAt"],
        }
    }

    /// Fields tried in order for a card heading
    pub fn title_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::CrisisContacts => &["name"],
            Collection::Testimonials => &[USER_NAME_FIELD, "userId"],
            Collection::TherapyBookings => &["therapistName"],
            Collection::ActivityLogs => &["action"],
            Collection::Users => &["name", "email"],
            _ => &["title"],
        }
    }

    pub fn column_label(&self, field: &str) -> &'static str {
        if let Some(spec) = self.schema().field(field) {
            return spec.label;
        }
        match field {
            USER_NAME_FIELD => "User",
            USER_EMAIL_FIELD => "User email",
            "id" => "ID",
            _ => "Field",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.store_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown collection '{0}'")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.store_name() == normalized)
            .or(match normalized.as_str() {
                "contacts" => Some(Collection::CrisisContacts),
                "messages" => Some(Collection::CrisisMessages),
                "bookings" => Some(Collection::TherapyBookings),
                "logs" | "activity_logs" => Some(Collection::ActivityLogs),
                "videos" => Some(Collection::TestimonialVideos),
                "coping_strategies" => Some(Collection::SelfHarmStrategies),
                _ => None,
            })
            .ok_or_else(|| UnknownCollection(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection_names() {
        assert_eq!("tips".parse::<Collection>(), Ok(Collection::Tips));
        assert_eq!("crisis-contacts".parse::<Collection>(), Ok(Collection::CrisisContacts));
        assert_eq!("logs".parse::<Collection>(), Ok(Collection::ActivityLogs));
        assert!("recipes".parse::<Collection>().is_err());
    }

    #[test]
    fn test_searchable_and_columns_are_known_fields() {
        for collection in Collection::ALL {
            let schema = collection.schema();
            for field in collection.searchable_fields().iter().chain(collection.columns()) {
                let derived = *field == USER_NAME_FIELD || *field == USER_EMAIL_FIELD;
                assert!(
                    schema.field(field).is_some() || (derived && collection.user_ref().is_some()),
                    "{} references unknown field {}",
                    collection,
                    field
                );
            }
        }
    }

    #[test]
    fn test_page_sizes() {
        assert_eq!(Collection::Tips.page_size(), 6);
        assert_eq!(Collection::TherapyBookings.page_size(), 5);
    }
}
