use std::collections::HashMap;

use super::collection::{USER_EMAIL_FIELD, USER_NAME_FIELD};
use super::record::{FieldValue, Record};

/// Resolve `foreign_key` against the users collection, attaching the user's
/// display name and email as derived fields. Records pointing at unknown
/// users are left untouched.
pub fn attach_users(records: &mut [Record], users: &[Record], foreign_key: &str) {
    let by_id: HashMap<&str, &Record> = users.iter().map(|u| (u.id(), u)).collect();
    let mut unresolved = 0usize;

    for record in records.iter_mut() {
        let Some(user) = record.text(foreign_key).and_then(|id| by_id.get(id)).copied() else {
            if record.get(foreign_key).is_some() {
                unresolved += 1;
            }
            continue;
        };

        let email = user.text("email").map(str::to_string);
        let name = user
            .text("name")
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string)
            .or_else(|| email.clone());

        if let Some(name) = name {
            record.insert_derived(USER_NAME_FIELD, FieldValue::Text(name));
        }
        if let Some(email) = email {
            record.insert_derived(USER_EMAIL_FIELD, FieldValue::Text(email));
        }
    }

    if unresolved > 0 {
        tracing::debug!("{} records reference users that were not found", unresolved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(id: &str, fields: &[(&str, &str)]) -> Record {
        let fields: BTreeMap<String, FieldValue> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::Text(v.to_string())))
            .collect();
        Record::new(id, fields)
    }

    #[test]
    fn test_attach_users_by_foreign_key() {
        let users = vec![
            record("u1", &[("email", "ada@example.com"), ("name", "Ada")]),
            record("u2", &[("email", "bo@example.com")]),
        ];
        let mut testimonials = vec![
            record("t1", &[("userId", "u1"), ("content", "Helped a lot")]),
            record("t2", &[("userId", "u2"), ("content", "Kind people")]),
            record("t3", &[("userId", "gone"), ("content", "Orphaned")]),
        ];

        attach_users(&mut testimonials, &users, "userId");

        assert_eq!(testimonials[0].text(USER_NAME_FIELD), Some("Ada"));
        assert_eq!(testimonials[0].text(USER_EMAIL_FIELD), Some("ada@example.com"));
        // Falls back to the email when the user has no name
        assert_eq!(testimonials[1].text(USER_NAME_FIELD), Some("bo@example.com"));
        assert_eq!(testimonials[2].text(USER_NAME_FIELD), None);
    }
}
