use std::sync::Arc;

use campus_core::{
    CampusResult, Dashboard, Filter, Role, Session, StatCard, Table, TableBackend,
};
use serde::Serialize;
use tracing::debug;

/// Counts for dashboards. A failed count reads as zero; dashboards never
/// fail because a tile could not be filled.
pub struct StatsService {
    backend: Arc<dyn TableBackend>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlatformCounts {
    pub schools: u64,
    pub active_schools: u64,
    pub users: u64,
    pub classes: u64,
    pub students: u64,
}

fn or_zero(what: &str, res: CampusResult<u64>) -> u64 {
    res.unwrap_or_else(|e| {
        debug!(what, error = %e, "stats: count failed");
        0
    })
}

impl StatsService {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    pub async fn platform(&self) -> PlatformCounts {
        let b = &self.backend;
        let active = [Filter::eq("is_active", true)];
        let (schools, active_schools, users, classes, students) = tokio::join!(
            b.count(Table::Schools, &[]),
            b.count(Table::Schools, &active),
            b.count(Table::UserRoles, &[]),
            b.count(Table::Classes, &[]),
            b.count(Table::Students, &[]),
        );
        PlatformCounts {
            schools: or_zero("schools", schools),
            active_schools: or_zero("active_schools", active_schools),
            users: or_zero("users", users),
            classes: or_zero("classes", classes),
            students: or_zero("students", students),
        }
    }

    async fn school(&self, school_id: &str) -> (u64, u64, u64) {
        let b = &self.backend;
        let scoped = [Filter::eq("school_id", school_id)];
        let teachers = [
            Filter::eq("school_id", school_id),
            Filter::eq("role", Role::Teacher.as_str()),
        ];
        let (teachers, classes, students) = tokio::join!(
            b.count(Table::UserRoles, &teachers),
            b.count(Table::Classes, &scoped),
            b.count(Table::Students, &scoped),
        );
        (
            or_zero("teachers", teachers),
            or_zero("classes", classes),
            or_zero("students", students),
        )
    }

    /// Tiles for `dashboard`, filled from the session's scope.
    pub async fn cards(&self, dashboard: Dashboard, session: &Session) -> Vec<StatCard> {
        match dashboard {
            Dashboard::SuperAdmin => {
                let c = self.platform().await;
                vec![
                    StatCard::new("Total Schools", Some(c.schools)),
                    StatCard::new("Active Schools", Some(c.active_schools)),
                    StatCard::new("Total Users", Some(c.users)),
                    StatCard::new("Reports", None),
                ]
            }
            Dashboard::SchoolAdmin => {
                let (teachers, classes, students) = match session.school_id.as_deref() {
                    Some(id) => self.school(id).await,
                    None => (0, 0, 0),
                };
                vec![
                    StatCard::new("Teachers", Some(teachers)),
                    StatCard::new("Classes", Some(classes)),
                    StatCard::new("Students", Some(students)),
                    StatCard::new("Attendance Rate", None),
                ]
            }
            Dashboard::Teacher => vec![
                StatCard::new("My Classes", Some(0)),
                StatCard::new("Total Students", Some(0)),
                StatCard::new("Attendance Today", None),
                StatCard::new("Avg. Performance", None),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use campus_core::{CampusError, MemoryBackend, Query};
    use serde_json::{json, Value};

    use super::*;

    struct Offline;

    #[async_trait]
    impl TableBackend for Offline {
        async fn select(&self, _: Table, _: &Query) -> CampusResult<Vec<Value>> {
            Err(CampusError::Network("offline".into()))
        }
        async fn insert(&self, _: Table, _: Value) -> CampusResult<Value> {
            Err(CampusError::Network("offline".into()))
        }
        async fn update(&self, _: Table, _: &[Filter], _: Value) -> CampusResult<Vec<Value>> {
            Err(CampusError::Network("offline".into()))
        }
        async fn count(&self, _: Table, _: &[Filter]) -> CampusResult<u64> {
            Err(CampusError::Network("offline".into()))
        }
    }

    fn session(role: Role, school_id: Option<&str>) -> Session {
        Session {
            user_id: "u".into(),
            email: "u@campus.dev".into(),
            role,
            school_id: school_id.map(str::to_string),
            full_name: None,
        }
    }

    #[tokio::test]
    async fn super_admin_counts_schools() {
        let backend = Arc::new(MemoryBackend::new());
        for (name, code) in [("Oak", "OAK111"), ("Elm", "ELM222")] {
            backend
                .insert(Table::Schools, json!({"name": name, "slug": name, "school_code": code}))
                .await
                .unwrap();
        }
        backend
            .update(Table::Schools, &[Filter::eq("name", "Elm")], json!({"is_active": false}))
            .await
            .unwrap();

        let cards = StatsService::new(backend)
            .cards(Dashboard::SuperAdmin, &session(Role::SuperAdmin, None))
            .await;
        assert_eq!(cards[0], StatCard::new("Total Schools", Some(2)));
        assert_eq!(cards[1], StatCard::new("Active Schools", Some(1)));
        assert_eq!(cards[3].value, None);
    }

    #[tokio::test]
    async fn failed_counts_read_as_zero() {
        let cards = StatsService::new(Arc::new(Offline))
            .cards(Dashboard::SchoolAdmin, &session(Role::SchoolAdmin, Some("s1")))
            .await;
        let values: Vec<Option<u64>> = cards.iter().map(|c| c.value).collect();
        assert_eq!(values, [Some(0), Some(0), Some(0), None]);
    }

    #[tokio::test]
    async fn teacher_tiles_are_static() {
        let cards = StatsService::new(Arc::new(Offline))
            .cards(Dashboard::Teacher, &session(Role::Teacher, Some("s1")))
            .await;
        let titles: Vec<&str> = cards.iter().map(|c| c.title).collect();
        assert_eq!(
            titles,
            ["My Classes", "Total Students", "Attendance Today", "Avg. Performance"]
        );
    }
}
