use crate::application_port::CommunityError;
use crate::domain_model::*;
use crate::domain_port::*;
use serde::Serialize;

pub const GROUPS: &str = "groups";
pub const INVITE_CODES: &str = "inviteCodes";
pub const USERS: &str = "users";

pub fn messages_of(group_id: &GroupId) -> String {
    format!("{GROUPS}/{group_id}/messages")
}

pub fn following_of(uid: &UserId) -> String {
    format!("{USERS}/{uid}/following")
}

pub fn followers_of(uid: &UserId) -> String {
    format!("{USERS}/{uid}/followers")
}

pub fn patch_of<T: Serialize>(value: &T) -> Result<FieldPatch, CommunityError> {
    FieldPatch::from_serializable(value).map_err(|e| CommunityError::Internal(e.to_string()))
}

/// Decodes a snapshot, skipping documents that no longer fit the schema.
pub fn decode_all<T>(
    documents: Vec<Document>,
    decode: impl Fn(&Document) -> Result<T, GatewayError>,
) -> Vec<T> {
    documents
        .iter()
        .filter_map(|doc| match decode(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(id = %doc.id, error = %e, "skipping undecodable document");
                None
            }
        })
        .collect()
}

pub fn is_failed_on(err: &GatewayError, target: &str) -> bool {
    matches!(err, GatewayError::PreconditionFailed { collection, .. } if collection == target)
}

pub fn is_missing_in(err: &GatewayError, target: &str) -> bool {
    matches!(err, GatewayError::NotFound { collection, .. } if collection == target)
}
