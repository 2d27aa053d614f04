use serde::{Deserialize, Serialize};
use uuid::Uuid;

time::serde::format_description!(birth_date_format, Date, "[year]-[month]-[day]");

/// The two roles a signed-in principal can hold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Student];

    /// Landing page for the role.
    pub fn dashboard(self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Student => "/student/dashboard",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::Student => "student",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationSettings {
    pub email: bool,
    pub sms: bool,
}

/// The signed-in principal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>, // data URL or reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "birth_date_format::option"
    )]
    pub birth_date: Option<time::Date>,
    #[serde(default)]
    pub notification_settings: NotificationSettings,
}

/// Partial update of an [`Identity`]. There is no `id` or `role`: both are
/// fixed for the life of a session.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_photo: Option<String>,
    pub student_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default, with = "birth_date_format::option")]
    pub birth_date: Option<time::Date>,
    pub notification_settings: Option<NotificationSettings>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &ProfileUpdate::default()
    }
}

impl Identity {
    /// Shallow merge: supplied fields replace, the rest stay.
    pub fn apply(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            name,
            email,
            profile_photo,
            student_id,
            phone,
            address,
            birth_date,
            notification_settings,
        } = update;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = email {
            self.email = v;
        }
        if let Some(v) = profile_photo {
            self.profile_photo = Some(v);
        }
        if let Some(v) = student_id {
            self.student_id = Some(v);
        }
        if let Some(v) = phone {
            self.phone = Some(v);
        }
        if let Some(v) = address {
            self.address = Some(v);
        }
        if let Some(v) = birth_date {
            self.birth_date = Some(v);
        }
        if let Some(v) = notification_settings {
            self.notification_settings = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn sample() -> Identity {
        Identity {
            id: Uuid::from_u128(7),
            name: "A".into(),
            email: "a@x.com".into(),
            role: Role::Student,
            profile_photo: None,
            student_id: Some("ST009".into()),
            phone: None,
            address: None,
            birth_date: None,
            notification_settings: NotificationSettings { email: true, sms: false },
        }
    }

    #[test]
    fn partial_update_only_touches_supplied_fields() {
        let mut identity = sample();
        identity.apply(ProfileUpdate {
            name: Some("B".into()),
            ..Default::default()
        });
        assert_eq!(identity.name, "B");
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.student_id.as_deref(), Some("ST009"));
        assert_eq!(identity.role, Role::Student);
    }

    #[test]
    fn notification_settings_are_replaced_whole() {
        let mut identity = sample();
        identity.apply(ProfileUpdate {
            notification_settings: Some(NotificationSettings { email: false, sms: true }),
            ..Default::default()
        });
        assert_eq!(
            identity.notification_settings,
            NotificationSettings { email: false, sms: true }
        );
    }

    #[test]
    fn role_cannot_be_sent_in_update() {
        let err = serde_json::from_str::<ProfileUpdate>(r#"{"role":"admin"}"#).unwrap_err();
        assert!(err.to_string().contains("role"));
    }

    #[test]
    fn birth_date_uses_calendar_format() {
        let mut identity = sample();
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"birth_date":"2004-03-09","phone":"0771234567"}"#).unwrap();
        identity.apply(update);
        assert_eq!(identity.birth_date, Some(date!(2004 - 03 - 09)));

        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["birth_date"], "2004-03-09");
        assert_eq!(json["role"], "student");
        assert!(json.get("address").is_none());
    }

    #[test]
    fn dashboards_per_role() {
        assert_eq!(Role::Admin.dashboard(), "/admin/dashboard");
        assert_eq!(Role::Student.dashboard(), "/student/dashboard");
    }
}
