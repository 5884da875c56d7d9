use serde::{Deserialize, Serialize};

/// A user was banned or timed out on the specified channel.
///
/// Delivered for the `channel.ban` subscription type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelBanEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub moderator_user_id: String,
    pub moderator_user_login: String,
    pub moderator_user_name: String,
    /// The reason behind the ban.
    pub reason: String,
    /// When the user was banned or put in a timeout (RFC3339).
    pub banned_at: String,
    /// When the timeout ends. Absent for permanent bans.
    pub ends_at: Option<String>,
    pub is_permanent: bool,
}

/// A user was unbanned on the specified channel (`channel.unban`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelUnbanEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub moderator_user_id: String,
    pub moderator_user_login: String,
    pub moderator_user_name: String,
}

/// A broadcaster updated the category, title, content classification
/// labels, or broadcast language for their channel (`channel.update`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelUpdateEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub title: String,
    pub language: String,
    pub category_id: String,
    pub category_name: String,
    pub content_classification_labels: Vec<String>,
}

/// A specified channel received a follow (`channel.follow`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelFollowEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    /// When the follow occurred (RFC3339).
    pub followed_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelCheerEvent {
    /// Whether the user cheered anonymously.
    pub is_anonymous: bool,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    /// The message sent with the cheer.
    pub message: String,
    /// The number of bits cheered.
    pub bits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSubscriptionGiftEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    /// The number of subscriptions in the gift.
    pub total: u64,
    pub tier: String,
    /// The number of subscriptions gifted by this user in the channel.
    pub cumulative_total: u64,
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelModeratorAddEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelModeratorRemoveEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
}

/// One selectable choice inside a poll.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollChoice {
    pub id: String,
    pub title: String,
    /// Not populated on `channel.poll.begin`.
    pub bits_votes: u64,
    pub channel_points_votes: u64,
    pub votes: u64,
}

/// Bits or Channel Points voting settings for a poll.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollVotingSettings {
    pub is_enabled: bool,
    pub amount_per_vote: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPollBeginEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    /// Question displayed for the poll.
    pub title: String,
    pub choices: Vec<PollChoice>,
    /// Not supported by Twitch; always disabled.
    pub bits_voting: PollVotingSettings,
    pub channel_points_voting: PollVotingSettings,
    pub started_at: String,
    pub ends_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPollProgressEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub title: String,
    pub choices: Vec<PollChoice>,
    pub bits_voting: PollVotingSettings,
    pub channel_points_voting: PollVotingSettings,
    pub started_at: String,
    pub ends_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPollEndEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub title: String,
    pub choices: Vec<PollChoice>,
    pub bits_voting: PollVotingSettings,
    pub channel_points_voting: PollVotingSettings,
    /// The status of the poll: `completed`, `archived` or `terminated`.
    pub status: String,
    pub started_at: String,
    pub ended_at: String,
}

/// One possible outcome of a Channel Points Prediction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionOutcome {
    pub id: String,
    pub title: String,
    pub color: String,
    pub users: u64,
    pub channel_points: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPredictionLockEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub title: String,
    pub outcomes: Vec<PredictionOutcome>,
    pub started_at: String,
    pub locked_at: String,
}

/// A creator goal began, made progress, or ended.
///
/// Shared by `channel.goal.begin`, `channel.goal.progress` and
/// `channel.goal.end`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalsEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_name: String,
    pub broadcaster_user_login: String,
    /// The type of goal, e.g. `follower` or `subscription`.
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub is_achieved: bool,
    pub current_amount: i64,
    pub target_amount: i64,
    pub started_at: String,
    /// Only set once the broadcaster ended the goal.
    pub ended_at: Option<String>,
}

/// The specified broadcaster started a stream (`stream.online`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOnlineEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    /// The stream type: `live`, `playlist`, `watch_party`, `premiere` or `rerun`.
    #[serde(rename = "type")]
    pub kind: String,
    pub started_at: String,
}

/// The specified broadcaster stopped a stream (`stream.offline`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOfflineEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
}

/// A user revoked authorization for the client id (`user.authorization.revoke`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAuthorizationRevokeEvent {
    pub client_id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
}
