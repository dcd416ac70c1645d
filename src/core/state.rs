use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::config::Settings;
use crate::repositories::desks::{practice_desks, upload_desks, PracticeDesks, UploadDesks};
use crate::repositories::users::UserStore;
use crate::services::question_bank::PracticeCatalog;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    catalog: PracticeCatalog,
    users: UserStore,
    practice: PracticeDesks,
    uploads: UploadDesks,
    shutdown: CancellationToken,
}

impl AppState {
    pub(crate) fn new(settings: Settings, catalog: PracticeCatalog, shutdown: CancellationToken) -> Self {
        let practice = practice_desks(settings.practice().clone());
        let uploads = upload_desks(settings.upload().clone());
        Self {
            inner: Arc::new(InnerState {
                settings,
                catalog,
                users: UserStore::new(),
                practice,
                uploads,
                shutdown,
            }),
        }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn catalog(&self) -> &PracticeCatalog {
        &self.inner.catalog
    }

    pub(crate) fn users(&self) -> &UserStore {
        &self.inner.users
    }

    pub(crate) fn practice(&self) -> &PracticeDesks {
        &self.inner.practice
    }

    pub(crate) fn uploads(&self) -> &UploadDesks {
        &self.inner.uploads
    }

    /// Parent of every staged continuation; cancelled on shutdown.
    pub(crate) fn shutdown(&self) -> &CancellationToken {
        &self.inner.shutdown
    }
}
