// src/models/friendship.rs

use serde::Serialize;
use sqlx::FromRow;

/// One directed row of the 'friends' table.
/// Every relationship is stored as two rows, one per direction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Friendship {
    pub user_id: i64,
    pub friend_id: i64,
    pub is_accepted: bool,
}

/// Position of a pair of users in the friendship state machine.
///
/// `None -> Pending -> Accepted`; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipState {
    None,
    Pending,
    Accepted,
}

impl FriendshipState {
    /// Derives the pair state from the rows stored for it.
    pub fn from_rows(rows: &[Friendship]) -> Self {
        if rows.is_empty() {
            FriendshipState::None
        } else if rows.iter().all(|r| r.is_accepted) {
            FriendshipState::Accepted
        } else {
            FriendshipState::Pending
        }
    }
}
