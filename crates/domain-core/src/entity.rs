//! 实体基础 trait

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 操作者 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

/// 审计信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditInfo {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<ActorId>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<ActorId>,
}

impl AuditInfo {
    pub fn new(actor: Option<ActorId>) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            created_by: actor.clone(),
            updated_at: now,
            updated_by: actor,
        }
    }

    pub fn update(&mut self, actor: Option<ActorId>) {
        self.updated_at = Utc::now();
        self.updated_by = actor;
    }
}

impl Default for AuditInfo {
    fn default() -> Self {
        Self::new(None)
    }
}

/// 实体 trait
pub trait Entity {
    type Id;

    fn id(&self) -> &Self::Id;
}

/// 聚合根 trait
pub trait AggregateRoot: Entity {
    fn audit_info(&self) -> &AuditInfo;
    fn audit_info_mut(&mut self) -> &mut AuditInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_info_update() {
        let mut audit = AuditInfo::new(None);
        let created_at = audit.created_at;
        let actor = ActorId::new();

        std::thread::sleep(std::time::Duration::from_millis(10));
        audit.update(Some(actor.clone()));

        assert_eq!(audit.created_at, created_at);
        assert!(audit.updated_at > created_at);
        assert_eq!(audit.updated_by, Some(actor));
    }
}
