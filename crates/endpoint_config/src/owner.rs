//! Owner-specific options.
//!
//! Every concrete endpoint belongs to exactly one owner: a line, a trunk or a
//! meeting guest. The owner contributes options that are not stored on the
//! endpoint itself (user identifiers, mailboxes, pickup groups, meeting
//! identifiers, ...). These options are injected into the endpoint's own
//! sections before ancestor accumulation and are never inherited.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::options::ConfigOption;
use crate::tenant::TenantSettings;

#[cfg(test)]
#[path = "owner_tests.rs"]
mod tests;

/// The domain entity that owns an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Owner {
    Line(LineOwner),
    Trunk(TrunkOwner),
    MeetingGuest(MeetingGuestOwner),
}

impl Owner {
    pub fn kind(&self) -> &'static str {
        match self {
            Owner::Line(_) => "line",
            Owner::Trunk(_) => "trunk",
            Owner::MeetingGuest(_) => "meeting guest",
        }
    }

    /// Options this owner adds to the endpoint it owns.
    pub fn injected_options(&self, tenant: &TenantSettings) -> InjectedOptions {
        let mut injected = match self {
            Owner::Line(line) => line.injected_options(),
            Owner::Trunk(trunk) => trunk.injected_options(),
            Owner::MeetingGuest(guest) => guest.injected_options(),
        };
        injected
            .endpoint
            .push(tenant.recording_announcement_option());
        injected
    }
}

/// Options contributed by an owner, per target section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectedOptions {
    pub endpoint: Vec<ConfigOption>,
    pub aor: Vec<ConfigOption>,
}

fn set_var(name: &str, value: impl std::fmt::Display) -> ConfigOption {
    ConfigOption::new("set_var", format!("{name}={value}"))
}

/// A user associated with a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineUser {
    pub id: u64,
    pub uuid: String,

    #[serde(default = "LineUser::default_simultaneous_calls")]
    pub simultaneous_calls: u32,

    #[serde(default)]
    pub voicemail: Option<Voicemail>,
}

impl LineUser {
    fn default_simultaneous_calls() -> u32 {
        5
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voicemail {
    pub number: String,
    pub context: String,
}

impl Voicemail {
    pub fn mailbox(&self) -> String {
        format!("{}@{}", self.number, self.context)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub exten: String,
    pub context: String,
}

/// How a line takes part in a call pickup group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupRole {
    /// The line may pick up calls ringing in the group.
    Pickup,
    /// Calls ringing on the line may be picked up by the group.
    Call,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupMembership {
    pub group_id: u64,
    pub role: PickupRole,
}

/// Line payload, already joined with its users, extensions and pickup groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOwner {
    pub id: u64,

    #[serde(default)]
    pub context: Option<String>,

    /// Stasis application the line is bound to, if any.
    #[serde(default)]
    pub application_uuid: Option<String>,

    #[serde(default)]
    pub users: Vec<LineUser>,

    #[serde(default)]
    pub extensions: Vec<Extension>,

    #[serde(default)]
    pub pickup_groups: Vec<PickupMembership>,
}

impl LineOwner {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            context: None,
            application_uuid: None,
            users: Vec::new(),
            extensions: Vec::new(),
            pickup_groups: Vec::new(),
        }
    }

    /// Context outgoing calls are placed in.
    ///
    /// A line bound to an application always uses the application's context.
    pub fn outgoing_context(&self) -> Option<String> {
        match (&self.application_uuid, &self.context) {
            (Some(application_uuid), _) => Some(format!("stasis-wazo-app-{application_uuid}")),
            (None, Some(context)) => Some(context.clone()),
            (None, None) => None,
        }
    }

    /// Comma separated `number@context` of every user voicemail.
    pub fn mailboxes(&self) -> Option<String> {
        let mailboxes: Vec<String> = self
            .users
            .iter()
            .filter_map(|user| user.voicemail.as_ref().map(Voicemail::mailbox))
            .collect();
        if mailboxes.is_empty() {
            None
        } else {
            Some(mailboxes.join(","))
        }
    }

    fn pickup_group_ids(&self, role: PickupRole) -> Option<String> {
        let ids: BTreeSet<u64> = self
            .pickup_groups
            .iter()
            .filter(|membership| membership.role == role)
            .map(|membership| membership.group_id)
            .collect();
        if ids.is_empty() {
            None
        } else {
            Some(
                ids.iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            )
        }
    }

    fn injected_options(&self) -> InjectedOptions {
        let mut endpoint = vec![
            set_var("WAZO_CHANNEL_DIRECTION", "from-wazo"),
            set_var("WAZO_LINE_ID", self.id),
        ];

        for user in &self.users {
            endpoint.push(set_var("XIVO_USERID", user.id));
            endpoint.push(set_var("XIVO_USERUUID", &user.uuid));
            endpoint.push(set_var("WAZO_USER_SIMULTCALLS", user.simultaneous_calls));
        }

        if let Some(context) = self.outgoing_context() {
            endpoint.push(set_var("TRANSFER_CONTEXT", &context));
            endpoint.push(ConfigOption::new("context", context));
        }

        if let Some(extension) = self.extensions.first() {
            endpoint.push(set_var(
                "PICKUPMARK",
                format!("{}%{}", extension.exten, extension.context),
            ));
        }

        if let Some(groups) = self.pickup_group_ids(PickupRole::Pickup) {
            endpoint.push(ConfigOption::new("named_pickup_group", groups));
        }
        if let Some(groups) = self.pickup_group_ids(PickupRole::Call) {
            endpoint.push(ConfigOption::new("named_call_group", groups));
        }

        let aor = self
            .mailboxes()
            .map(|mailboxes| vec![ConfigOption::new("mailboxes", mailboxes)])
            .unwrap_or_default();

        InjectedOptions { endpoint, aor }
    }
}

/// Trunk payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrunkOwner {
    #[serde(default)]
    pub context: Option<String>,
}

impl TrunkOwner {
    fn injected_options(&self) -> InjectedOptions {
        let mut endpoint = vec![set_var("WAZO_CHANNEL_DIRECTION", "to-wazo")];
        if let Some(context) = &self.context {
            endpoint.push(ConfigOption::new("context", context.as_str()));
        }
        InjectedOptions {
            endpoint,
            aor: Vec::new(),
        }
    }
}

/// Meeting guest payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingGuestOwner {
    pub meeting_uuid: String,
    pub meeting_name: String,
}

impl MeetingGuestOwner {
    fn injected_options(&self) -> InjectedOptions {
        InjectedOptions {
            endpoint: vec![
                set_var("WAZO_CHANNEL_DIRECTION", "from-wazo"),
                set_var("WAZO_MEETING_UUID", &self.meeting_uuid),
                set_var("WAZO_MEETING_NAME", &self.meeting_name),
            ],
            aor: Vec::new(),
        }
    }
}
