use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientGroup {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientGroupMembership {
    pub client_group_id: Uuid,
    pub client_id: Uuid,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupWithMembers {
    #[serde(flatten)]
    pub group: ClientGroup,
    pub members: Vec<ClientGroupMembership>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub client_ids: Vec<Uuid>,
}

/// Full replacement: the member list is the complete desired set.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub client_ids: Vec<Uuid>,
}

/// Reported outcome of a membership reconciliation, id-set semantics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MembershipDiff {
    pub added: Vec<Uuid>,
    pub removed: Vec<Uuid>,
    pub kept: Vec<Uuid>,
}
