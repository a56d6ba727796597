/*!
 * Task Container
 * Bookkeeping container hosting applications as tracked tasks
 *
 * Assigns monotonically increasing application ids and enforces the
 * paused/active distinction. Start is synchronous: the id is assigned
 * before the call returns and stays stable until the application is
 * destroyed.
 */

use super::types::{ContainerError, ContainerResult};
use super::AppContainer;
use crate::core::types::AppId;
use crate::message::command::{AppDescriptor, AppModel};
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info};
use std::sync::atomic::{AtomicI32, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppStatus {
    Active,
    Paused,
}

#[derive(Debug)]
struct AppEntry {
    descriptor: AppDescriptor,
    #[allow(dead_code)]
    args: Vec<String>,
    status: AppStatus,
}

/// Task-based application container
pub struct TaskContainer {
    model: AppModel,
    apps: DashMap<AppId, AppEntry, RandomState>,
    next_app_id: AtomicI32,
}

impl TaskContainer {
    #[must_use]
    pub fn new(model: AppModel) -> Self {
        Self {
            model,
            apps: DashMap::with_hasher(RandomState::new()),
            next_app_id: AtomicI32::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub const fn model(&self) -> AppModel {
        self.model
    }
}

impl AppContainer for TaskContainer {
    fn start_app(&self, app: &AppDescriptor, args: &[String]) -> ContainerResult<AppId> {
        if app.model != self.model {
            return Err(ContainerError::StartFailed(format!(
                "container hosts {} applications, got {}",
                self.model, app.model
            )));
        }
        if app.main_class.is_empty() {
            return Err(ContainerError::StartFailed(
                "application has no main class".to_string(),
            ));
        }

        let app_id = self.next_app_id.fetch_add(1, Ordering::SeqCst);
        self.apps.insert(
            app_id,
            AppEntry {
                descriptor: app.clone(),
                args: args.to_vec(),
                status: AppStatus::Active,
            },
        );
        info!(
            "Started {} application {} ({})",
            self.model, app_id, app.main_class
        );
        Ok(app_id)
    }

    fn pause_app(&self, app_id: AppId) -> ContainerResult<()> {
        let mut entry = self
            .apps
            .get_mut(&app_id)
            .ok_or(ContainerError::UnknownApp(app_id))?;
        entry.status = AppStatus::Paused;
        debug!("Paused application {}", app_id);
        Ok(())
    }

    fn resume_app(&self, app_id: AppId) -> ContainerResult<()> {
        let mut entry = self
            .apps
            .get_mut(&app_id)
            .ok_or(ContainerError::UnknownApp(app_id))?;
        entry.status = AppStatus::Active;
        debug!("Resumed application {}", app_id);
        Ok(())
    }

    fn destroy_app(&self, app_id: AppId, unconditional: bool) -> ContainerResult<()> {
        {
            let entry = self
                .apps
                .get(&app_id)
                .ok_or(ContainerError::UnknownApp(app_id))?;
            // An active application may veto a conditional destroy; a paused
            // one goes quietly.
            if !unconditional && entry.status == AppStatus::Active {
                return Err(ContainerError::DestroyRefused(app_id));
            }
        }
        let removed = self.apps.remove(&app_id);
        if let Some((_, entry)) = removed {
            info!(
                "Destroyed application {} ({})",
                app_id, entry.descriptor.main_class
            );
        }
        Ok(())
    }

    fn app_count(&self) -> usize {
        self.apps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn descriptor() -> AppDescriptor {
        AppDescriptor::new(AppModel::Midlet, "demo", "com.example.Foo")
    }

    #[test]
    fn test_start_assigns_stable_ids() {
        let container = TaskContainer::new(AppModel::Midlet);
        let first = container.start_app(&descriptor(), &[]).unwrap();
        let second = container.start_app(&descriptor(), &[]).unwrap();

        assert!(first >= 0);
        assert_eq!(second, first + 1);
        assert_eq!(container.app_count(), 2);
    }

    #[test]
    fn test_model_mismatch_refused() {
        let container = TaskContainer::new(AppModel::Xlet);
        let result = container.start_app(&descriptor(), &[]);
        assert!(matches!(result, Err(ContainerError::StartFailed(_))));
    }

    #[test]
    fn test_pause_resume_destroy_round_trip() {
        let container = TaskContainer::new(AppModel::Midlet);
        let app_id = container.start_app(&descriptor(), &[]).unwrap();

        container.pause_app(app_id).unwrap();
        container.resume_app(app_id).unwrap();
        container.destroy_app(app_id, true).unwrap();
        assert_eq!(container.app_count(), 0);
    }

    #[test]
    fn test_unknown_id_is_failure_not_panic() {
        let container = TaskContainer::new(AppModel::Midlet);
        assert!(matches!(
            container.pause_app(42),
            Err(ContainerError::UnknownApp(42))
        ));
        assert!(matches!(
            container.resume_app(42),
            Err(ContainerError::UnknownApp(42))
        ));
        assert!(matches!(
            container.destroy_app(42, true),
            Err(ContainerError::UnknownApp(42))
        ));
    }

    #[test]
    fn test_conditional_destroy_vetoed_while_active() {
        let container = TaskContainer::new(AppModel::Midlet);
        let app_id = container.start_app(&descriptor(), &[]).unwrap();

        assert!(matches!(
            container.destroy_app(app_id, false),
            Err(ContainerError::DestroyRefused(_))
        ));

        // Paused applications go quietly
        container.pause_app(app_id).unwrap();
        container.destroy_app(app_id, false).unwrap();
        assert_eq!(container.app_count(), 0);
    }

    #[test]
    fn test_destroyed_id_stays_invalid() {
        let container = TaskContainer::new(AppModel::Midlet);
        let app_id = container.start_app(&descriptor(), &[]).unwrap();
        container.destroy_app(app_id, true).unwrap();

        assert!(matches!(
            container.pause_app(app_id),
            Err(ContainerError::UnknownApp(_))
        ));
    }
}
