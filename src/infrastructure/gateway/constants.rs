use std::ops::RangeInclusive;
use std::time::Duration;

pub const DEFAULT_GATEWAY_URL: &str = "ws://127.0.0.1:8080/gateway";

/// Wire token of the pub/sub sentinel opcode.
pub const PUBSUB_OPCODE: &str = "pubsub_event";

/// Payload field carrying the pub/sub event name.
pub const PUBSUB_EVENT_TYPE_FIELD: &str = "event_type";

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

pub const RECONNECT_DELAY_BASE: Duration = Duration::from_millis(1000);
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for an inflated binary frame.
pub const MAX_DECOMPRESSED_SIZE: usize = 16 * 1024 * 1024;

/// Entity family an opcode belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeFamily {
    Control,
    Guild,
    Channel,
    Message,
    Relationship,
    Voice,
    User,
    Presence,
    Thread,
}

impl OpcodeFamily {
    pub const ALL: [Self; 9] = [
        Self::Control,
        Self::Guild,
        Self::Channel,
        Self::Message,
        Self::Relationship,
        Self::Voice,
        Self::User,
        Self::Presence,
        Self::Thread,
    ];

    /// Opcode block reserved for the family.
    #[must_use]
    pub const fn range(self) -> RangeInclusive<u16> {
        match self {
            Self::Control => 0..=11,
            Self::Guild => 15..=29,
            Self::Channel => 30..=39,
            Self::Message => 40..=49,
            Self::Relationship => 50..=59,
            Self::Voice => 60..=69,
            Self::User => 70..=79,
            Self::Presence => 80..=89,
            Self::Thread => 90..=99,
        }
    }

    #[must_use]
    pub fn of(value: u16) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.range().contains(&value))
    }
}

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOpcode {
    Dispatch = 0,
    Heartbeat = 1,
    Identify = 2,
    Presence = 3,
    Ready = 4,
    Resume = 6,
    Reconnect = 7,
    RequestGuildMembers = 8,
    InvalidSession = 9,
    Hello = 10,
    HeartbeatAck = 11,

    GuildCreate = 15,
    GuildUpdate = 16,
    GuildDelete = 17,
    GuildMemberAdd = 18,
    GuildMemberUpdate = 19,
    GuildMemberRemove = 20,
    GuildRoleCreate = 21,
    GuildRoleUpdate = 22,
    GuildRoleDelete = 23,
    GuildBanAdd = 24,
    GuildBanRemove = 25,

    ChannelCreate = 30,
    ChannelUpdate = 31,
    ChannelDelete = 32,
    ChannelPinsUpdate = 33,

    MessageCreate = 40,
    MessageUpdate = 41,
    MessageDelete = 42,
    MessageDeleteBulk = 43,
    MessageReactionAdd = 44,
    MessageReactionRemove = 45,
    TypingStart = 46,

    FriendRequestSent = 50,
    FriendRequestReceived = 51,
    FriendRequestAccepted = 52,
    FriendRemoved = 53,
    UserBlocked = 54,

    VoiceStateUpdate = 60,
    VoiceServerUpdate = 61,
    VoiceChannelJoin = 62,
    VoiceChannelLeave = 63,

    UserUpdate = 70,
    UserSettingsUpdate = 71,
    UserNoteUpdate = 72,

    PresenceUpdate = 80,
    SessionsReplace = 81,

    ThreadCreate = 90,
    ThreadUpdate = 91,
    ThreadDelete = 92,
    ThreadMembersUpdate = 93,
}

impl GatewayOpcode {
    pub const ALL: [Self; 51] = [
        Self::Dispatch,
        Self::Heartbeat,
        Self::Identify,
        Self::Presence,
        Self::Ready,
        Self::Resume,
        Self::Reconnect,
        Self::RequestGuildMembers,
        Self::InvalidSession,
        Self::Hello,
        Self::HeartbeatAck,
        Self::GuildCreate,
        Self::GuildUpdate,
        Self::GuildDelete,
        Self::GuildMemberAdd,
        Self::GuildMemberUpdate,
        Self::GuildMemberRemove,
        Self::GuildRoleCreate,
        Self::GuildRoleUpdate,
        Self::GuildRoleDelete,
        Self::GuildBanAdd,
        Self::GuildBanRemove,
        Self::ChannelCreate,
        Self::ChannelUpdate,
        Self::ChannelDelete,
        Self::ChannelPinsUpdate,
        Self::MessageCreate,
        Self::MessageUpdate,
        Self::MessageDelete,
        Self::MessageDeleteBulk,
        Self::MessageReactionAdd,
        Self::MessageReactionRemove,
        Self::TypingStart,
        Self::FriendRequestSent,
        Self::FriendRequestReceived,
        Self::FriendRequestAccepted,
        Self::FriendRemoved,
        Self::UserBlocked,
        Self::VoiceStateUpdate,
        Self::VoiceServerUpdate,
        Self::VoiceChannelJoin,
        Self::VoiceChannelLeave,
        Self::UserUpdate,
        Self::UserSettingsUpdate,
        Self::UserNoteUpdate,
        Self::PresenceUpdate,
        Self::SessionsReplace,
        Self::ThreadCreate,
        Self::ThreadUpdate,
        Self::ThreadDelete,
        Self::ThreadMembersUpdate,
    ];

    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|opcode| opcode.as_u16() == value)
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub const fn is_control(self) -> bool {
        self.as_u16() <= 11
    }

    /// Family block containing this opcode.
    #[must_use]
    pub fn family(self) -> OpcodeFamily {
        OpcodeFamily::of(self.as_u16()).unwrap_or(OpcodeFamily::Control)
    }
}

impl From<GatewayOpcode> for u16 {
    fn from(opcode: GatewayOpcode) -> Self {
        opcode.as_u16()
    }
}
