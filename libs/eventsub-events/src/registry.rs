//! The event type registry.
//!
//! Maps a wire-level `(subscription type, version)` pair to the decoder
//! producing the matching [`Event`] variant. Entries registered without a
//! decoder mark event types Twitch ships but this library does not decode
//! yet; looking them up succeeds, decoding them is reported as unsupported
//! by the caller.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::events::*;

/// A decoded notification payload, one variant per supported schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ChannelBan(ChannelBanEvent),
    ChannelUnban(ChannelUnbanEvent),
    ChannelUpdate(ChannelUpdateEvent),
    ChannelFollow(ChannelFollowEvent),
    ChannelCheer(ChannelCheerEvent),
    ChannelSubscriptionGift(ChannelSubscriptionGiftEvent),
    ChannelModeratorAdd(ChannelModeratorAddEvent),
    ChannelModeratorRemove(ChannelModeratorRemoveEvent),
    ChannelPollBegin(ChannelPollBeginEvent),
    ChannelPollProgress(ChannelPollProgressEvent),
    ChannelPollEnd(ChannelPollEndEvent),
    ChannelPredictionLock(ChannelPredictionLockEvent),
    Goal(GoalsEvent),
    StreamOnline(StreamOnlineEvent),
    StreamOffline(StreamOfflineEvent),
    UserAuthorizationRevoke(UserAuthorizationRevokeEvent),
}

macro_rules! impl_event_from {
    ($($ty:ident => $variant:ident),+ $(,)?) => {
        $(impl From<$ty> for Event {
            fn from(event: $ty) -> Self {
                Event::$variant(event)
            }
        })+
    };
}

impl_event_from! {
    ChannelBanEvent => ChannelBan,
    ChannelUnbanEvent => ChannelUnban,
    ChannelUpdateEvent => ChannelUpdate,
    ChannelFollowEvent => ChannelFollow,
    ChannelCheerEvent => ChannelCheer,
    ChannelSubscriptionGiftEvent => ChannelSubscriptionGift,
    ChannelModeratorAddEvent => ChannelModeratorAdd,
    ChannelModeratorRemoveEvent => ChannelModeratorRemove,
    ChannelPollBeginEvent => ChannelPollBegin,
    ChannelPollProgressEvent => ChannelPollProgress,
    ChannelPollEndEvent => ChannelPollEnd,
    ChannelPredictionLockEvent => ChannelPredictionLock,
    GoalsEvent => Goal,
    StreamOnlineEvent => StreamOnline,
    StreamOfflineEvent => StreamOffline,
    UserAuthorizationRevokeEvent => UserAuthorizationRevoke,
}

/// Decodes one raw `event` body into an [`Event`] variant.
pub type DecodeEventFn = fn(&RawValue) -> Result<Event, serde_json::Error>;

/// One registered version of an event type.
pub struct EventScope {
    pub version: &'static str,
    /// `None` marks a known event type with no decoder yet.
    pub decode: Option<DecodeEventFn>,
}

fn decode<T>(raw: &RawValue) -> Result<Event, serde_json::Error>
where
    T: DeserializeOwned,
    Event: From<T>,
{
    Ok(Event::from(serde_json::from_str::<T>(raw.get())?))
}

static EVENT_REGISTRY: LazyLock<HashMap<&'static str, Vec<EventScope>>> = LazyLock::new(|| {
    HashMap::from([
        (
            "automod.message.hold",
            vec![
                EventScope { version: "1", decode: None },
                EventScope { version: "2", decode: None },
            ],
        ),
        (
            "channel.ban",
            vec![EventScope { version: "1", decode: Some(decode::<ChannelBanEvent>) }],
        ),
        (
            "channel.chat.message",
            vec![EventScope { version: "1", decode: None }],
        ),
        (
            "channel.cheer",
            vec![EventScope { version: "1", decode: Some(decode::<ChannelCheerEvent>) }],
        ),
        (
            "channel.follow",
            vec![EventScope { version: "2", decode: Some(decode::<ChannelFollowEvent>) }],
        ),
        (
            "channel.goal.begin",
            vec![EventScope { version: "1", decode: Some(decode::<GoalsEvent>) }],
        ),
        (
            "channel.goal.end",
            vec![EventScope { version: "1", decode: Some(decode::<GoalsEvent>) }],
        ),
        (
            "channel.goal.progress",
            vec![EventScope { version: "1", decode: Some(decode::<GoalsEvent>) }],
        ),
        (
            "channel.moderator.add",
            vec![EventScope { version: "1", decode: Some(decode::<ChannelModeratorAddEvent>) }],
        ),
        (
            "channel.moderator.remove",
            vec![EventScope { version: "1", decode: Some(decode::<ChannelModeratorRemoveEvent>) }],
        ),
        (
            "channel.poll.begin",
            vec![EventScope { version: "1", decode: Some(decode::<ChannelPollBeginEvent>) }],
        ),
        (
            "channel.poll.end",
            vec![EventScope { version: "1", decode: Some(decode::<ChannelPollEndEvent>) }],
        ),
        (
            "channel.poll.progress",
            vec![EventScope { version: "1", decode: Some(decode::<ChannelPollProgressEvent>) }],
        ),
        (
            "channel.prediction.lock",
            vec![EventScope { version: "1", decode: Some(decode::<ChannelPredictionLockEvent>) }],
        ),
        (
            "channel.subscription.gift",
            vec![EventScope { version: "1", decode: Some(decode::<ChannelSubscriptionGiftEvent>) }],
        ),
        (
            "channel.unban",
            vec![EventScope { version: "1", decode: Some(decode::<ChannelUnbanEvent>) }],
        ),
        (
            "channel.update",
            vec![EventScope { version: "2", decode: Some(decode::<ChannelUpdateEvent>) }],
        ),
        (
            "stream.offline",
            vec![EventScope { version: "1", decode: Some(decode::<StreamOfflineEvent>) }],
        ),
        (
            "stream.online",
            vec![EventScope { version: "1", decode: Some(decode::<StreamOnlineEvent>) }],
        ),
        (
            "user.authorization.revoke",
            vec![EventScope { version: "1", decode: Some(decode::<UserAuthorizationRevokeEvent>) }],
        ),
    ])
});

/// Looks up every registered version of an event type.
///
/// Returns `None` when the type is not registered at all.
pub fn scopes(kind: &str) -> Option<&'static [EventScope]> {
    EVENT_REGISTRY.get(kind).map(Vec::as_slice)
}
