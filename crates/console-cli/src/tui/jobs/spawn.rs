use super::*;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

impl TuiApp {
    /// Runs `job` on the runtime and posts its outcome back through the
    /// event channel. A panic inside the job is reported as
    /// [`JobError::Crashed`] instead of tearing down the console.
    ///
    /// The handle is kept so [`abort_jobs`](Self::abort_jobs) can stop the
    /// job when the session ends.
    pub(in crate::tui) fn spawn_job<T, F, W>(&mut self, job: F, wrap: W)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        W: FnOnce(Result<T, JobError>) -> AppEvent + Send + 'static,
    {
        let events = self.events.clone();
        self.jobs.retain(|handle| !handle.is_finished());
        let handle = tokio::spawn(async move {
            let result = match AssertUnwindSafe(job).catch_unwind().await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(JobError::Api(err)),
                Err(panic) => Err(JobError::Crashed(panic_reason(panic.as_ref()))),
            };
            if events.send(wrap(result)).is_err() {
                debug!("Console closed before job finished");
            }
        });
        self.jobs.push(handle);
    }

    pub(in crate::tui) fn abort_jobs(&mut self) {
        let mut aborted = 0;
        for handle in self.jobs.drain(..) {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        if aborted > 0 {
            debug!(aborted, "Aborted in-flight jobs");
        }
    }
}

fn panic_reason(panic: &(dyn Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
