use serde::Serialize;

use crate::models::resource::ResourceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn delta(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct VoteRow {
    pub id: ResourceId,
    pub vote: i32,
}
