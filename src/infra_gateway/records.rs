//! Stored shapes of the community documents.

use crate::domain_model::*;
use crate::domain_port::{Document, GatewayError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stored instants use fixed nanosecond precision so string order is time order.
mod fixed_nanos {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Absent on records written before group types existed.
    #[serde(rename = "type", default)]
    pub group_type: Option<GroupType>,
    #[serde(default)]
    pub is_private: bool,
    pub owner_uid: UserId,
    #[serde(default)]
    pub password_hash: Option<String>,
    pub invite_code: InviteCode,
    #[serde(default)]
    pub members: Vec<GroupMember>,
    #[serde(default)]
    pub members_uid_list: Vec<UserId>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(with = "fixed_nanos")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_message: Option<LastMessage>,
}

impl GroupRecord {
    pub fn from_group(group: &Group) -> Self {
        Self {
            name: group.name.clone(),
            description: group.description.clone(),
            group_type: Some(group.group_type),
            is_private: group.is_private(),
            owner_uid: group.owner_uid.clone(),
            password_hash: group.password_hash.clone(),
            invite_code: group.invite_code.clone(),
            members: group.members.clone(),
            members_uid_list: group.member_uids(),
            avatar_url: group.avatar_url.clone(),
            banner_url: group.banner_url.clone(),
            created_at: group.created_at,
            last_message: group.last_message.clone(),
        }
    }

    /// `type` wins when present; legacy records fall back to `isPrivate`.
    pub fn resolved_type(&self) -> GroupType {
        match self.group_type {
            Some(group_type) => group_type,
            None if self.is_private => GroupType::Private,
            None => GroupType::Public,
        }
    }

    pub fn into_group(self, id: &str) -> Group {
        let group_type = self.resolved_type();
        Group {
            id: GroupId(id.to_owned()),
            name: self.name,
            description: self.description,
            group_type,
            owner_uid: self.owner_uid,
            password_hash: self.password_hash,
            invite_code: self.invite_code,
            members: self.members,
            avatar_url: self.avatar_url,
            banner_url: self.banner_url,
            created_at: self.created_at,
            last_message: self.last_message,
        }
    }
}

pub fn decode_group(doc: &Document) -> Result<Group, GatewayError> {
    Ok(doc.decode::<GroupRecord>()?.into_group(&doc.id))
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub author_id: UserId,
    pub author_name: String,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    /// Assigned by the store on write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub reactions: BTreeMap<String, Vec<UserId>>,
}

impl MessageRecord {
    pub fn outgoing(message: &OutgoingMessage) -> Self {
        let (text, kind, media_url) = match &message.content {
            MessageContent::Text { text } => (text.clone(), MessageKind::Text, None),
            MessageContent::Image { url, caption } => {
                (caption.clone(), MessageKind::Image, Some(url.clone()))
            }
        };
        Self {
            author_id: message.author.id.clone(),
            author_name: message.author.name.clone(),
            author_avatar: message.author.avatar.clone(),
            text,
            kind,
            media_url,
            timestamp: None,
            is_pinned: false,
            reactions: BTreeMap::new(),
        }
    }

    pub fn into_message(self, id: &str) -> Result<GroupMessage, GatewayError> {
        let timestamp = self
            .timestamp
            .ok_or_else(|| GatewayError::Codec(format!("message {id} has no timestamp")))?;
        let content = match (self.kind, self.media_url) {
            (MessageKind::Text, _) => MessageContent::Text { text: self.text },
            (MessageKind::Image, Some(url)) => MessageContent::Image {
                url,
                caption: self.text,
            },
            (MessageKind::Image, None) => {
                return Err(GatewayError::Codec(format!("image message {id} has no mediaUrl")));
            }
        };
        Ok(GroupMessage {
            id: MessageId(id.to_owned()),
            author: MessageAuthor {
                id: self.author_id,
                name: self.author_name,
                avatar: self.author_avatar,
            },
            content,
            timestamp,
            is_pinned: self.is_pinned,
            reactions: self.reactions,
        })
    }
}

pub fn decode_message(doc: &Document) -> Result<GroupMessage, GatewayError> {
    doc.decode::<MessageRecord>()?.into_message(&doc.id)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub uid: UserId,
    #[serde(with = "fixed_nanos")]
    pub since: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(id: &str, value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(fields) => Document {
                id: id.to_owned(),
                fields,
            },
            _ => panic!("not an object"),
        }
    }

    fn legacy_group(is_private: bool) -> serde_json::Value {
        json!({
            "name": "old",
            "isPrivate": is_private,
            "ownerUid": "u1",
            "inviteCode": "GRP-ABCDEF",
            "createdAt": "2024-01-01T00:00:00Z",
        })
    }

    #[test]
    fn test_legacy_record_reads_type_from_is_private() {
        let private = decode_group(&document("g1", legacy_group(true))).unwrap();
        assert_eq!(private.group_type, GroupType::Private);

        let public = decode_group(&document("g2", legacy_group(false))).unwrap();
        assert_eq!(public.group_type, GroupType::Public);
    }

    #[test]
    fn test_type_field_is_authoritative() {
        let mut value = legacy_group(true);
        value["type"] = json!("public");
        let group = decode_group(&document("g1", value)).unwrap();
        assert_eq!(group.group_type, GroupType::Public);
    }

    #[test]
    fn test_record_writes_both_type_fields() {
        let group = decode_group(&document("g1", legacy_group(true))).unwrap();
        let value = serde_json::to_value(GroupRecord::from_group(&group)).unwrap();
        assert_eq!(value["type"], json!("private"));
        assert_eq!(value["isPrivate"], json!(true));
        assert_eq!(value["membersUidList"], json!([]));
    }

    #[test]
    fn test_created_at_sorts_as_a_string() {
        let mut earlier = legacy_group(false);
        earlier["createdAt"] = json!("2024-01-01T00:00:40.123Z");
        let mut later = legacy_group(false);
        later["createdAt"] = json!("2024-01-01T00:00:40.123456789Z");

        let encode = |value| {
            let group = decode_group(&document("g", value)).unwrap();
            let record = serde_json::to_value(GroupRecord::from_group(&group)).unwrap();
            record["createdAt"].as_str().unwrap().to_owned()
        };
        let earlier = encode(earlier);
        let later = encode(later);
        assert_eq!(earlier, "2024-01-01T00:00:40.123000000Z");
        assert!(earlier < later);
    }

    #[test]
    fn test_image_message_keeps_caption_and_url() {
        let doc = document(
            "m1",
            json!({
                "authorId": "u1",
                "authorName": "alice",
                "text": "chart",
                "type": "image",
                "mediaUrl": "https://cdn/x.png",
                "timestamp": "2024-01-01T00:00:00.000000001Z",
            }),
        );
        let message = decode_message(&doc).unwrap();
        assert_eq!(
            message.content,
            MessageContent::Image {
                url: "https://cdn/x.png".into(),
                caption: "chart".into()
            }
        );
        assert!(!message.is_pinned);
    }

    #[test]
    fn test_message_without_timestamp_is_rejected() {
        let doc = document("m1", json!({ "authorId": "u1", "authorName": "a", "text": "x" }));
        assert!(decode_message(&doc).is_err());
    }
}
