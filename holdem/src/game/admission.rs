//! Who may sit down at a table.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, net::IpAddr};

use super::entities::{Chips, PlayerId, Username};

/// Everything the host knows about a player asking for a seat.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct JoinRequest {
    pub player_id: PlayerId,
    pub name: Username,
    pub address: IpAddr,
    /// Administrative override for the duplicate address check.
    pub privileged: bool,
    pub last_combat: Option<DateTime<Utc>>,
    pub in_group: bool,
    /// Distance from the table, in the host's units.
    pub distance: u32,
    pub buy_in: Chips,
}

impl JoinRequest {
    pub fn new(player_id: PlayerId, name: impl Into<Username>, address: IpAddr, buy_in: Chips) -> Self {
        Self {
            player_id,
            name: name.into(),
            address,
            privileged: false,
            last_combat: None,
            in_group: false,
            distance: 0,
            buy_in,
        }
    }

    /// Whether the player was in combat within `lockout_secs` of `now`.
    #[must_use]
    pub fn in_combat(&self, now: DateTime<Utc>, lockout_secs: i64) -> bool {
        self.last_combat
            .is_some_and(|at| now - at < Duration::seconds(lockout_secs))
    }
}

/// Per-player time before which they may not sit down again.
#[derive(Clone, Debug, Default)]
pub struct RejoinCooldowns {
    until: HashMap<PlayerId, DateTime<Utc>>,
}

impl RejoinCooldowns {
    pub fn start(&mut self, player: PlayerId, now: DateTime<Utc>, secs: i64) {
        self.until.insert(player, now + Duration::seconds(secs));
    }

    /// Whole seconds left on the player's cooldown, rounded up.
    #[must_use]
    pub fn remaining(&self, player: PlayerId, now: DateTime<Utc>) -> Option<i64> {
        let until = self.until.get(&player)?;
        let left = (*until - now).num_milliseconds();
        (left > 0).then(|| (left + 999) / 1000)
    }

    /// Forgets cooldowns that already ran out.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.until.retain(|_, until| *until > now);
    }
}
