use super::*;

impl TuiApp {
    /// Fetches `kind` in the background. Only the most recent request per
    /// kind, issued under the current generation, may land.
    pub(in crate::tui) fn dispatch_load(&mut self, kind: LoadKind) {
        self.request_seq += 1;
        let seq = self.request_seq;
        let generation = self.generation;
        self.latest_requests.insert(kind, seq);
        self.begin_load(kind);
        debug!(kind = ?kind, seq, generation, "Dispatching load");

        let backend = Arc::clone(&self.backend);
        let wrap = move |result| AppEvent::Loaded {
            generation,
            seq,
            kind,
            result,
        };
        match kind {
            LoadKind::Users => self.spawn_job(
                async move { backend.list_users().await.map(Loaded::Users) },
                wrap,
            ),
            LoadKind::Records => {
                let fid = self.detail_key.clone().unwrap_or_default();
                self.spawn_job(
                    async move { backend.user_records(&fid).await.map(Loaded::Records) },
                    wrap,
                )
            }
            LoadKind::Tasks => self.spawn_job(
                async move { backend.list_tasks().await.map(Loaded::Tasks) },
                wrap,
            ),
            LoadKind::Completed => self.spawn_job(
                async move {
                    backend
                        .completed_tasks(DEFAULT_PAGE_LIMIT)
                        .await
                        .map(Loaded::Completed)
                },
                wrap,
            ),
            LoadKind::Notifications => self.spawn_job(
                async move {
                    backend
                        .list_notifications(DEFAULT_PAGE_LIMIT)
                        .await
                        .map(Loaded::Notifications)
                },
                wrap,
            ),
        }
    }

    fn begin_load(&mut self, kind: LoadKind) {
        match kind {
            LoadKind::Users => self.users.begin(),
            LoadKind::Records => self.records.begin(),
            LoadKind::Tasks => self.tasks.begin(),
            LoadKind::Completed => self.completed.begin(),
            LoadKind::Notifications => self.notifications.begin(),
        }
    }

    fn fail_load(&mut self, kind: LoadKind) {
        match kind {
            LoadKind::Users => self.users.fail(),
            LoadKind::Records => self.records.fail(),
            LoadKind::Tasks => self.tasks.fail(),
            LoadKind::Completed => self.completed.fail(),
            LoadKind::Notifications => self.notifications.fail(),
        }
    }

    pub(in crate::tui) fn is_current_load(&self, generation: u64, seq: u64, kind: LoadKind) -> bool {
        generation == self.generation && self.latest_requests.get(&kind) == Some(&seq)
    }

    pub(in crate::tui) fn apply_loaded(
        &mut self,
        generation: u64,
        seq: u64,
        kind: LoadKind,
        result: Result<Loaded, JobError>,
    ) {
        if !self.is_current_load(generation, seq, kind) {
            debug!(kind = ?kind, seq, generation, "Dropping stale load result");
            return;
        }
        self.latest_requests.remove(&kind);
        match result {
            Ok(Loaded::Users(rows)) => self.users.fill(rows),
            Ok(Loaded::Records(rows)) => self.records.fill(rows),
            Ok(Loaded::Tasks(rows)) => self.tasks.fill(rows),
            Ok(Loaded::Completed(rows)) => self.completed.fill(rows),
            Ok(Loaded::Notifications(rows)) => self.notifications.fill(rows),
            Err(err) => {
                if let Some(reason) = err.auth_failure() {
                    self.deauthenticate(reason);
                    return;
                }
                warn!(kind = ?kind, error = %err, "Load failed");
                self.fail_load(kind);
                let view = self.view;
                self.toast(view, ToastKind::Error, format!("Load failed: {}", describe(&err)));
            }
        }
    }
}

/// Operator-facing text for a failed job.
pub(in crate::tui) fn describe(err: &JobError) -> String {
    match err {
        JobError::Api(ApiError::Network(_)) => {
            "Connection failed, check the network and retry".to_string()
        }
        JobError::Api(api) => api
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| api.to_string()),
        JobError::Crashed(_) => "An unexpected error occurred".to_string(),
    }
}
