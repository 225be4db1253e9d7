//! Pub/sub event names.
//!
//! The namespace is open: servers may publish names not listed here, and
//! subscribers can use any string key. These are the names the gateway is
//! known to emit.

pub const FRIEND_REQUEST_RECEIVED: &str = "friend_request_received";
pub const FRIEND_REQUEST_ACCEPTED: &str = "friend_request_accepted";
pub const FRIEND_REQUEST_DECLINED: &str = "friend_request_declined";
pub const FRIEND_REMOVED: &str = "friend_removed";

pub const MESSAGE_CREATE: &str = "message_create";
pub const MESSAGE_UPDATE: &str = "message_update";
pub const MESSAGE_DELETE: &str = "message_delete";
pub const DIRECT_MESSAGE_CREATE: &str = "direct_message_create";

pub const GUILD_MEMBER_JOINED: &str = "guild_member_joined";
pub const GUILD_MEMBER_LEFT: &str = "guild_member_left";
pub const CHANNEL_CREATED: &str = "channel_created";
pub const CHANNEL_DELETED: &str = "channel_deleted";

pub const VOICE_STATE_UPDATED: &str = "voice_state_updated";
pub const PRESENCE_UPDATED: &str = "presence_updated";
pub const TYPING_STARTED: &str = "typing_started";
pub const NOTIFICATION_CREATED: &str = "notification_created";

/// Names the gateway is known to emit.
pub const KNOWN_EVENTS: [&str; 16] = [
    FRIEND_REQUEST_RECEIVED,
    FRIEND_REQUEST_ACCEPTED,
    FRIEND_REQUEST_DECLINED,
    FRIEND_REMOVED,
    MESSAGE_CREATE,
    MESSAGE_UPDATE,
    MESSAGE_DELETE,
    DIRECT_MESSAGE_CREATE,
    GUILD_MEMBER_JOINED,
    GUILD_MEMBER_LEFT,
    CHANNEL_CREATED,
    CHANNEL_DELETED,
    VOICE_STATE_UPDATED,
    PRESENCE_UPDATED,
    TYPING_STARTED,
    NOTIFICATION_CREATED,
];

#[must_use]
pub fn is_known_event(name: &str) -> bool {
    KNOWN_EVENTS.contains(&name)
}
